//! Image upload storage.
//!
//! Images are written under the upload directory as `<uuid>.<ext>` and served
//! back from `/uploads/`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

/// URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Errors from storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no image data received")]
    Empty,

    #[error("image is {size} bytes, the limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the upload directory.
    pub filename: String,
    /// Server-relative URL, e.g. `/uploads/<file>`.
    pub url: String,
}

/// Writes uploaded images to disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate and store an image.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for a content type that is not a supported
    /// image, `Empty`/`TooLarge` for a bad payload size, and `Io` if writing
    /// fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()), err(level = "warn"))]
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        info!(filename = %filename, "Image stored");
        Ok(StoredUpload {
            url: format!("{UPLOADS_URL_PREFIX}/{filename}"),
            filename,
        })
    }
}

/// File extension for a supported image content type.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/heif" => Some("heif"),
        _ => None,
    }
}
