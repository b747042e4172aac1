use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// Subdirectory of the media root that holds issue photos
const ISSUES_PREFIX: &str = "issues";

/// Map an image content type to a file extension
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    }
}

/// Stores uploaded images on the local filesystem.
///
/// Keys are relative paths like `issues/<uuid>.jpg`; the absolute location is
/// `<media_root>/<key>` and the public URL is `<public_base_path>/<key>`.
pub struct LocalImageStore {
    media_root: PathBuf,
    public_base_path: String,
}

impl LocalImageStore {
    /// Create the store, ensuring the issues directory exists
    pub fn new(config: &StorageConfig) -> Result<Self, AppError> {
        let media_root = PathBuf::from(&config.media_root);

        std::fs::create_dir_all(media_root.join(ISSUES_PREFIX)).map_err(|e| {
            AppError::Internal(format!(
                "Failed to create media directory {}: {}",
                media_root.display(),
                e
            ))
        })?;

        info!("Image store initialized at {}", media_root.display());

        Ok(Self {
            media_root,
            public_base_path: config.public_base_path.trim_end_matches('/').to_string(),
        })
    }

    /// Write image bytes and return the storage key
    pub fn save(&self, data: &[u8], content_type: &str) -> Result<String, AppError> {
        let extension = extension_for_content_type(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type '{}'", content_type))
        })?;

        let key = format!("{}/{}.{}", ISSUES_PREFIX, Uuid::new_v4(), extension);
        let path = self.absolute_path(&key);

        std::fs::write(&path, data).map_err(|e| {
            AppError::Internal(format!("Failed to write image {}: {}", path.display(), e))
        })?;

        debug!("Stored image {} ({} bytes)", key, data.len());
        Ok(key)
    }

    /// Absolute filesystem path for a storage key
    pub fn absolute_path(&self, key: &str) -> PathBuf {
        self.media_root.join(key)
    }

    /// Public URL for a storage key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_path, key)
    }

    /// Remove a stored image. Used to undo an orphaned write when record
    /// creation fails after the image hit disk.
    pub fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.absolute_path(key);
        std::fs::remove_file(&path).map_err(|e| {
            AppError::Internal(format!("Failed to delete image {}: {}", path.display(), e))
        })
    }

    /// Directory the static-file route serves from
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }
}
