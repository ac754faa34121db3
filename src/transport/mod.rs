mod poller;
pub mod telegram;

pub use poller::{run_polling, RetryPolicy};
pub use telegram::TelegramClient;

use crate::error::TransportError;
use crate::models::{ChatId, FileRef, InboundEvent, MessageHandle, RemoteFile};
use async_trait::async_trait;

/// The messaging service the bot talks to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Drops any webhook and pending updates so polling starts clean.
    async fn clear_webhook(&self) -> Result<(), TransportError>;

    /// Next batch of inbound events; may be empty when the poll times out.
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError>;

    async fn download_file(&self, file: &FileRef) -> Result<RemoteFile, TransportError>;

    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle, TransportError>;

    async fn edit_reply(&self, handle: &MessageHandle, text: &str) -> Result<(), TransportError>;
}
