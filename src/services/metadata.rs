use crate::error::MetadataError;
use crate::models::GalleryMetadata;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Counts image files directly inside `dir`. A missing directory holds zero images.
pub fn count_images(dir: &Path) -> std::io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_image_filename(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}

#[derive(Debug, Clone)]
pub struct MetadataRecorder {
    images_dir: PathBuf,
    metadata_path: PathBuf,
}

impl MetadataRecorder {
    pub fn new(images_dir: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            metadata_path: metadata_path.into(),
        }
    }

    pub fn record_upload(
        &self,
        filename: &str,
        uploaded_by: &str,
        now: NaiveDateTime,
    ) -> Result<GalleryMetadata, MetadataError> {
        let total_images = count_images(&self.images_dir).map_err(|source| MetadataError::Io {
            path: self.images_dir.clone(),
            source,
        })?;

        let metadata = GalleryMetadata {
            last_image: filename.to_string(),
            last_updated: now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            uploaded_by: uploaded_by.to_string(),
            total_images,
        };

        self.write(&metadata)?;
        tracing::info!(
            "Metadata updated: last_image={}, total_images={}",
            metadata.last_image,
            metadata.total_images
        );
        Ok(metadata)
    }

    pub fn read(&self) -> Result<Option<GalleryMetadata>, MetadataError> {
        match std::fs::read_to_string(&self.metadata_path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(MetadataError::Io {
                path: self.metadata_path.clone(),
                source,
            }),
        }
    }

    /// Writes a sibling temp file and renames it over the record.
    fn write(&self, metadata: &GalleryMetadata) -> Result<(), MetadataError> {
        let io_err = |source| MetadataError::Io {
            path: self.metadata_path.clone(),
            source,
        };

        if let Some(parent) = self.metadata_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut json = serde_json::to_string_pretty(metadata)?;
        json.push('\n');

        let tmp_path = self.metadata_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(io_err)?;
        std::fs::rename(&tmp_path, &self.metadata_path).map_err(io_err)?;
        Ok(())
    }
}
