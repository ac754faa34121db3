//! Telegram Bot API client over plain HTTPS.

use super::Transport;
use crate::config::TelegramConfig;
use crate::error::TransportError;
use crate::models::{ChatId, EventKind, FileRef, InboundEvent, MessageHandle, RemoteFile};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use url::Url;

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct GetFile<'a> {
    file_id: &'a str,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: ChatId,
    message_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct DeleteWebhook {
    drop_pending_updates: bool,
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.trim().is_empty())
}

pub fn display_name(user: Option<&User>) -> String {
    user.and_then(|u| non_empty(&u.username).or_else(|| non_empty(&u.first_name)))
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// `/help@my_bot extra` -> `help`.
pub fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    let command = command.split('@').next().unwrap_or(command);
    if command.is_empty() {
        None
    } else {
        Some(command.to_ascii_lowercase())
    }
}

impl Update {
    pub fn into_event(self) -> Option<InboundEvent> {
        let message = self.message?;
        let sender = display_name(message.from.as_ref());

        // Photos arrive in several sizes, the last one is the largest.
        let kind = if let Some(largest) = message.photo.as_ref().and_then(|sizes| sizes.last()) {
            EventKind::Photo {
                file: FileRef {
                    file_id: largest.file_id.clone(),
                },
            }
        } else if let Some(document) = message.document {
            EventKind::Document {
                file: FileRef {
                    file_id: document.file_id,
                },
                mime_type: document.mime_type,
                file_name: document.file_name,
            }
        } else if let Some(command) = message.text.as_deref().and_then(parse_command) {
            EventKind::Command(command)
        } else {
            EventKind::Unsupported
        };

        Some(InboundEvent {
            update_id: self.update_id,
            chat_id: message.chat.id,
            sender,
            kind,
        })
    }
}

pub struct TelegramClient {
    http: reqwest::Client,
    api_base: Url,
    token: String,
    poll_timeout: Duration,
    next_offset: AtomicI64,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        let mut base = config.api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let poll_timeout = Duration::from_secs(config.poll_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(15))
            .user_agent(concat!("gallery-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(e.without_url()))?;

        Ok(Self {
            http,
            api_base: Url::parse(&base)?,
            token: config.bot_token.clone(),
            poll_timeout,
            next_offset: AtomicI64::new(0),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, TransportError> {
        Ok(self.api_base.join(&format!("bot{}/{}", self.token, method))?)
    }

    fn file_url(&self, file_path: &str) -> Result<Url, TransportError> {
        Ok(self
            .api_base
            .join(&format!("file/bot{}/{}", self.token, file_path))?)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method)?)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url()))?;

        let status = response.status();
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Http(e.without_url()))?;

        let description = parsed
            .description
            .unwrap_or_else(|| format!("{} failed with status {}", method, status));

        if status == StatusCode::CONFLICT || parsed.error_code == Some(409) {
            return Err(TransportError::Conflict(description));
        }

        match parsed.result {
            Some(result) if parsed.ok => Ok(result),
            _ => Err(TransportError::Api {
                code: parsed.error_code,
                description,
            }),
        }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn clear_webhook(&self) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &DeleteWebhook {
                    drop_pending_updates: true,
                },
            )
            .await?;
        tracing::info!("Webhook cleared, pending updates dropped");
        Ok(())
    }

    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let request = GetUpdates {
            offset: self.next_offset.load(Ordering::SeqCst),
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.next_offset.store(last + 1, Ordering::SeqCst);
        }

        Ok(updates.into_iter().filter_map(Update::into_event).collect())
    }

    async fn download_file(&self, file: &FileRef) -> Result<RemoteFile, TransportError> {
        let info: File = self
            .call(
                "getFile",
                &GetFile {
                    file_id: &file.file_id,
                },
            )
            .await?;
        let file_path = info
            .file_path
            .ok_or_else(|| TransportError::MissingFilePath(info.file_id.clone()))?;

        let bytes = self
            .http
            .get(self.file_url(&file_path)?)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TransportError::Http(e.without_url()))?
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.without_url()))?;

        tracing::debug!("Downloaded {} ({} bytes)", file_path, bytes.len());

        Ok(RemoteFile {
            bytes: bytes.to_vec(),
            suggested_path: Some(file_path),
        })
    }

    async fn send_reply(&self, chat_id: ChatId, text: &str) -> Result<MessageHandle, TransportError> {
        let message: Message = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(MessageHandle {
            chat_id: message.chat.id,
            message_id: message.message_id,
        })
    }

    async fn edit_reply(&self, handle: &MessageHandle, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &EditMessageText {
                    chat_id: handle.chat_id,
                    message_id: handle.message_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}
