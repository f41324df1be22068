//! Local intake for image uploads.
//!
//! Files land in one flat directory that the server also exposes at
//! `/uploads`. Names are regenerated on save, so a hostile original
//! filename never reaches the filesystem.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::errors::AppError;

/// Upload ceiling, matching the authoring UI's limit.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A file accepted into the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub path: PathBuf,
    pub size: u64,
}

pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates and persists one uploaded file.
    ///
    /// Non-image MIME types and payloads over [`MAX_UPLOAD_BYTES`] are
    /// rejected before anything touches disk.
    pub async fn save(
        &self,
        field: &str,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredFile, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::InvalidFileType(content_type.to_string()));
        }

        let size = data.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Err(AppError::FileTooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let filename = unique_filename(field, original_name);
        let path = self.root.join(&filename);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        tracing::debug!(%filename, size, "upload stored");
        Ok(StoredFile {
            filename,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            path,
            size,
        })
    }
}

/// `{field}-{random}{.ext}` — collision-resistant, extension carried over
/// from the original name when it is plain alphanumeric.
fn unique_filename(field: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}-{}{}", field, uuid::Uuid::new_v4().simple(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, UploadStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn accepts_png_and_writes_it() {
        let (_dir, store) = store();
        let stored = store
            .save("image", "photo.PNG", "image/png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        assert_eq!(stored.size, 9);
        assert_eq!(stored.original_name, "photo.PNG");
        assert!(stored.filename.starts_with("image-"));
        assert!(stored.filename.ends_with(".png"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn rejects_non_image_mime() {
        let (_dir, store) = store();
        let err = store
            .save("image", "notes.txt", "text/plain", Bytes::from_static(b"hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFileType(ref t) if t == "text/plain"));
        // nothing written
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn rejects_oversize_payload() {
        let (_dir, store) = store();
        let big = Bytes::from(vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize]);
        let err = store.save("image", "big.png", "image/png", big).await.unwrap_err();

        assert!(matches!(err, AppError::FileTooLarge { .. }));
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let (_dir, store) = store();
        let a = store
            .save("image", "a.png", "image/png", Bytes::from_static(b"a"))
            .await
            .unwrap();
        let b = store
            .save("image", "a.png", "image/png", Bytes::from_static(b"b"))
            .await
            .unwrap();

        assert_ne!(a.filename, b.filename);
    }

    #[test]
    fn filename_drops_suspicious_extensions() {
        let name = unique_filename("media", "../../../etc/pass wd.sh$");
        assert!(!name.contains('/'));
        assert!(!name.contains("$"));
        // extension with non-alphanumerics is dropped entirely
        assert!(!name.contains('.'));
    }
}
