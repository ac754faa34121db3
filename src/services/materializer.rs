use crate::error::MaterializeError;
use crate::models::{ImageAsset, RemoteFile};
use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Upper bound on `_N` suffixes tried for one timestamp.
const MAX_COLLISION_SUFFIX: u32 = 10_000;

/// Maps the service's suggested path to one of the stored extensions.
/// Unknown or missing suffixes fall back to `.jpg`.
pub fn extension_for(suggested_path: Option<&str>) -> &'static str {
    let Some(path) = suggested_path else {
        return DEFAULT_EXTENSION;
    };
    let path = path.to_ascii_lowercase();
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        ".jpg"
    } else if path.ends_with(".png") {
        ".png"
    } else if path.ends_with(".gif") {
        ".gif"
    } else if path.ends_with(".webp") {
        ".webp"
    } else {
        DEFAULT_EXTENSION
    }
}

pub fn base_name(now: NaiveDateTime) -> String {
    format!("image_{}", now.format("%Y%m%d_%H%M%S"))
}

/// `image_<ts><ext>` for the first attempt, `image_<ts>_<n><ext>` afterwards.
pub fn candidate_name(now: NaiveDateTime, ext: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{}{}", base_name(now), ext)
    } else {
        format!("{}_{}{}", base_name(now), attempt, ext)
    }
}

#[derive(Debug, Clone)]
pub struct FileMaterializer {
    images_dir: PathBuf,
}

impl FileMaterializer {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
        }
    }

    pub fn materialize(
        &self,
        remote: &RemoteFile,
        source_event_id: i64,
        uploaded_by: &str,
        now: NaiveDateTime,
    ) -> Result<ImageAsset, MaterializeError> {
        std::fs::create_dir_all(&self.images_dir).map_err(|source| MaterializeError::Io {
            path: self.images_dir.clone(),
            source,
        })?;

        let ext = extension_for(remote.suggested_path.as_deref());

        for attempt in 0..MAX_COLLISION_SUFFIX {
            let filename = candidate_name(now, ext, attempt);
            let path = self.images_dir.join(&filename);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("{} already exists, trying next suffix", filename);
                    continue;
                }
                Err(source) => return Err(MaterializeError::Io { path, source }),
            };

            let written = file.write_all(&remote.bytes).and_then(|_| file.sync_all());
            if let Err(source) = written {
                drop(file);
                let _ = std::fs::remove_file(&path);
                return Err(MaterializeError::Io { path, source });
            }

            tracing::info!("Saved {} ({} bytes)", path.display(), remote.bytes.len());

            return Ok(ImageAsset {
                filename,
                path,
                size_bytes: remote.bytes.len() as u64,
                source_event_id,
                uploaded_by: uploaded_by.to_string(),
                created_at: now,
            });
        }

        Err(MaterializeError::Io {
            path: self.images_dir.join(candidate_name(now, ext, MAX_COLLISION_SUFFIX)),
            source: std::io::Error::new(
                ErrorKind::AlreadyExists,
                "no free file name for this timestamp",
            ),
        })
    }
}
