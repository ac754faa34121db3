use crate::context::AppContext;
use crate::error::IngestError;
use crate::models::{is_image_mime, ChatId, EventKind, FileRef, ImageAsset, InboundEvent};

pub const WELCOME_MESSAGE: &str = "🖼️ Welcome to the Image Gallery Bot!

Send me a picture and I will add it to the gallery.

Commands:
/help - show usage";

pub const HELP_MESSAGE: &str = "📖 How to use:

1. Send a picture as a photo or as a file
2. The bot saves it to the gallery repository
3. The picture shows up on the site a few moments later

Supported formats: JPG, PNG, GIF, WebP";

pub const PROCESSING_MESSAGE: &str = "⏳ Processing your image...";

pub const REJECTION_MESSAGE: &str = "❌ Please send an image!";

pub fn success_message(filename: &str, gallery_url: &str) -> String {
    format!(
        "✅ Image added to the gallery!\n\n📁 File: {}\n🌐 Gallery: {}",
        filename, gallery_url
    )
}

pub fn failure_message(error: &IngestError) -> String {
    format!("❌ Could not process the image: {}", error.user_message())
}

pub async fn handle_event(ctx: &AppContext, event: InboundEvent) {
    match &event.kind {
        EventKind::Command(command) => handle_command(ctx, event.chat_id, command).await,
        EventKind::Photo { file } => ingest(ctx, &event, file).await,
        EventKind::Document {
            file, mime_type, ..
        } => {
            if is_image_mime(mime_type.as_deref()) {
                ingest(ctx, &event, file).await;
            } else {
                tracing::info!(
                    "Rejected document from {} with type {:?}",
                    event.sender,
                    mime_type
                );
                reply(ctx, event.chat_id, REJECTION_MESSAGE).await;
            }
        }
        EventKind::Unsupported => {
            tracing::debug!("Ignoring update {}", event.update_id);
        }
    }
}

async fn handle_command(ctx: &AppContext, chat_id: ChatId, command: &str) {
    match command {
        "start" => reply(ctx, chat_id, WELCOME_MESSAGE).await,
        "help" => {
            let text = format!("{}\n\nGallery: {}", HELP_MESSAGE, ctx.config.gallery_url());
            reply(ctx, chat_id, &text).await;
        }
        other => tracing::debug!("Ignoring unknown command /{}", other),
    }
}

async fn ingest(ctx: &AppContext, event: &InboundEvent, file: &FileRef) {
    match process_image(ctx, event, file).await {
        Ok(asset) => {
            tracing::info!("Ingested {} from {}", asset.filename, asset.uploaded_by);
        }
        Err(e) => {
            tracing::error!("Failed to ingest image from {}: {}", event.sender, e);
            reply(ctx, event.chat_id, &failure_message(&e)).await;
        }
    }
}

/// Placeholder reply, download, write, record, publish, then confirm.
pub async fn process_image(
    ctx: &AppContext,
    event: &InboundEvent,
    file: &FileRef,
) -> Result<ImageAsset, IngestError> {
    let placeholder = ctx
        .transport
        .send_reply(event.chat_id, PROCESSING_MESSAGE)
        .await?;

    let remote = ctx.transport.download_file(file).await?;
    let now = ctx.clock.now();

    let asset = ctx
        .materializer
        .materialize(&remote, event.update_id, &event.sender, now)?;
    ctx.recorder
        .record_upload(&asset.filename, &event.sender, now)?;
    ctx.publisher.publish(&asset.filename).await?;

    let text = success_message(&asset.filename, &ctx.config.gallery_url());
    // The image is already published here; a failed edit must not read as a failure.
    if let Err(e) = ctx.transport.edit_reply(&placeholder, &text).await {
        tracing::warn!("Could not edit reply in chat {}: {}", event.chat_id, e);
        reply(ctx, event.chat_id, &text).await;
    }
    Ok(asset)
}

async fn reply(ctx: &AppContext, chat_id: ChatId, text: &str) {
    if let Err(e) = ctx.transport.send_reply(chat_id, text).await {
        tracing::error!("Failed to send reply to chat {}: {}", chat_id, e);
    }
}
