// src/services/media_services.rs - post images on local disk

use std::path::{Component, Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::post_dtos::ImageUpload;

const POST_IMAGES_DIR: &str = "post_images";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("invalid base64 image data: {0}")]
    InvalidData(#[from] base64::DecodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps an upload content type to the stored file extension.
fn image_extension(content_type: &str) -> Result<&'static str, MediaError> {
    let unsupported = || MediaError::UnsupportedType(content_type.to_string());
    let parsed: mime::Mime = content_type.trim().parse().map_err(|_| unsupported())?;
    if parsed.type_() != mime::IMAGE {
        return Err(unsupported());
    }
    match parsed.subtype().as_str() {
        "jpeg" | "jpg" => Ok("jpg"),
        "png" => Ok("png"),
        "gif" => Ok("gif"),
        "webp" => Ok("webp"),
        _ => Err(unsupported()),
    }
}

/// Content type served for a stored file.
pub fn content_type_for(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Decodes and writes an uploaded image, returning its path relative to the media root.
    pub async fn save_post_image(&self, upload: &ImageUpload) -> Result<String, MediaError> {
        let extension = image_extension(&upload.content_type)?;

        // Drop a data URL prefix if present (data:image/jpeg;base64,)
        let data = match upload.data.split_once(',') {
            Some((_, payload)) => payload,
            None => upload.data.as_str(),
        };
        let bytes = general_purpose::STANDARD.decode(data.trim())?;

        let relative = format!("{}/{}.{}", POST_IMAGES_DIR, Uuid::new_v4(), extension);
        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        debug!("stored image {} ({} bytes)", relative, bytes.len());
        Ok(relative)
    }

    /// Reads a stored file. Paths escaping the media root are treated as missing.
    pub async fn read(&self, relative: &str) -> Result<Option<Vec<u8>>, MediaError> {
        let Some(path) = self.resolve(relative) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, relative: &str) {
        if let Some(path) = self.resolve(relative) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("failed to remove media file {}: {}", relative, e);
            }
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let candidate = Path::new(relative);
        if relative.is_empty()
            || !candidate.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(candidate))
    }
}
