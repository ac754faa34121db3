use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ImageAsset {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub source_event_id: i64,
    pub uploaded_by: String,
    pub created_at: NaiveDateTime,
}

/// A file fetched from the messaging service.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub bytes: Vec<u8>,
    /// Path the service stores the file under, e.g. `photos/file_12.jpg`.
    pub suggested_path: Option<String>,
}
