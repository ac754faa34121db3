use serde::Serialize;

pub type ChatId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRef {
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Photo {
        file: FileRef,
    },
    Document {
        file: FileRef,
        mime_type: Option<String>,
        file_name: Option<String>,
    },
    /// Bot command without the leading slash or `@botname` suffix.
    Command(String),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundEvent {
    pub update_id: i64,
    pub chat_id: ChatId,
    pub sender: String,
    pub kind: EventKind,
}

/// Identifies a reply so it can be edited later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat_id: ChatId,
    pub message_id: i64,
}

pub fn is_image_mime(mime_type: Option<&str>) -> bool {
    mime_type.is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("image/"))
}
