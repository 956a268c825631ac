use sha2::{Digest, Sha256};

/// Extension every stored image is labelled with, whatever the upload was.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Derives the stored file name for an upload.
///
/// Everything from the first `.` of `original_name` on is dropped and the
/// SHA-256 of the remaining base name is hex encoded. The file bytes are not
/// hashed, so `cat.jpg` and `cat.png` map to the same stored name.
pub fn derive_image_name(original_name: &str) -> String {
    let base = original_name.split('.').next().unwrap_or_default();
    let digest = Sha256::digest(base.as_bytes());
    format!("{}.{}", hex::encode(digest), IMAGE_EXTENSION)
}
