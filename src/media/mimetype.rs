pub const FALLBACK_MIMETYPE: &str = "application/octet-stream";

/// Sniffs the mime type of image bytes from their magic number.
pub fn detect_mimetype(bytes: &[u8]) -> String {
    match infer::get(bytes) {
        Some(kind) => kind.mime_type().to_string(),
        None => FALLBACK_MIMETYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mimetype_detection() {
        let jpeg: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(detect_mimetype(&jpeg), "image/jpeg");

        let png: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_mimetype(&png), "image/png");
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        assert_eq!(detect_mimetype(b"not an image"), FALLBACK_MIMETYPE);
        assert_eq!(detect_mimetype(&[]), FALLBACK_MIMETYPE);
    }
}
