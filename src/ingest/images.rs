use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::ingest::hasher::{derive_image_name, IMAGE_EXTENSION};
use crate::media::mimetype::detect_mimetype;

/// Served in place of any requested image that is not on disk.
pub const DEFAULT_IMAGE: &str = "default.jpg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to create image directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to create image file {path:?}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to write image file {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read image file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid image name {0:?}")]
    InvalidName(String),
}

/// A file received with a submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct StoredImage {
    pub path: PathBuf,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Directory of uploaded images, named by [`derive_image_name`].
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the upload under its derived name and returns that name.
    ///
    /// No upload is not an error. An existing file with the same derived name
    /// is overwritten.
    pub fn ingest(&self, upload: Option<&ImageUpload>) -> Result<Option<String>, ImageError> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        fs::create_dir_all(&self.root).map_err(|source| ImageError::CreateDir {
            path: self.root.clone(),
            source,
        })?;

        let stored_name = derive_image_name(&upload.file_name);
        let path = self.root.join(&stored_name);

        let mut dst = File::create(&path).map_err(|source| ImageError::Create {
            path: path.clone(),
            source,
        })?;
        io::copy(&mut upload.bytes.as_slice(), &mut dst)
            .map_err(|source| ImageError::Write { path: path.clone(), source })?;

        info!("Stored image {:?} as {}", upload.file_name, stored_name);
        Ok(Some(stored_name))
    }

    /// Maps a requested image name to the file that should be served.
    ///
    /// The name must be a bare file name ending in the image extension.
    /// Missing files resolve to [`DEFAULT_IMAGE`].
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ImageError> {
        if !requested.ends_with(&format!(".{IMAGE_EXTENSION}")) || !is_bare_file_name(requested) {
            return Err(ImageError::InvalidName(requested.to_string()));
        }

        let path = self.root.join(requested);
        if path.exists() {
            Ok(path)
        } else {
            debug!("Image not found: {:?}", path);
            Ok(self.root.join(DEFAULT_IMAGE))
        }
    }

    pub fn fetch(&self, requested: &str) -> Result<StoredImage, ImageError> {
        let path = self.resolve(requested)?;
        let bytes = fs::read(&path).map_err(|source| ImageError::Read {
            path: path.clone(),
            source,
        })?;
        let mime_type = detect_mimetype(&bytes);
        Ok(StoredImage {
            path,
            mime_type,
            bytes,
        })
    }
}

fn is_bare_file_name(name: &str) -> bool {
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn upload(file_name: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_no_upload_is_no_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path().join("images"));

        assert_eq!(store.ingest(None)?, None);
        // Nothing is created when there is nothing to store.
        assert!(!store.root().exists());
        Ok(())
    }

    #[test]
    fn test_ingest_creates_dir_and_writes_bytes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path().join("images"));

        let name = store.ingest(Some(&upload("cat.jpg", b"first")))?;
        assert_eq!(name.as_deref(), Some(derive_image_name("cat.jpg").as_str()));

        let written = fs::read(store.root().join(name.unwrap()))?;
        assert_eq!(written, b"first");
        Ok(())
    }

    #[test]
    fn test_same_base_name_overwrites() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path().join("images"));

        let first = store.ingest(Some(&upload("cat.jpg", b"jpeg bytes")))?;
        let second = store.ingest(Some(&upload("cat.png", b"png bytes")))?;
        assert_eq!(first, second);

        let stored = fs::read(store.root().join(second.unwrap()))?;
        assert_eq!(stored, b"png bytes");
        assert_eq!(fs::read_dir(store.root())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_resolve_requires_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());

        assert!(matches!(store.resolve("cat.png"), Err(ImageError::InvalidName(_))));
        assert!(matches!(store.resolve("cat"), Err(ImageError::InvalidName(_))));
        Ok(())
    }

    #[test]
    fn test_resolve_rejects_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());

        for name in ["../secret.jpg", "nested/cat.jpg", "..\\cat.jpg", "/etc/cat.jpg"] {
            assert!(
                matches!(store.resolve(name), Err(ImageError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
        Ok(())
    }

    #[test]
    fn test_missing_image_falls_back_to_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());
        fs::write(dir.path().join(DEFAULT_IMAGE), b"default bytes")?;

        assert_eq!(store.resolve("missing.jpg")?, dir.path().join(DEFAULT_IMAGE));

        let fetched = store.fetch("missing.jpg")?;
        assert_eq!(fetched.bytes, b"default bytes");
        assert_eq!(fetched.mime_type, "application/octet-stream");
        Ok(())
    }

    #[test]
    fn test_fetch_stored_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());
        let jpeg: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

        let name = store.ingest(Some(&upload("photo.jpeg", &jpeg)))?.unwrap();
        let fetched = store.fetch(&name)?;
        assert_eq!(fetched.path, dir.path().join(&name));
        assert_eq!(fetched.bytes, jpeg);
        assert_eq!(fetched.mime_type, "image/jpeg");
        Ok(())
    }

    #[test]
    fn test_fetch_without_default_is_read_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ImageStore::new(dir.path());

        assert!(matches!(store.fetch("missing.jpg"), Err(ImageError::Read { .. })));
        Ok(())
    }
}
