use crate::transport::{run_polling, RetryPolicy, TelegramClient, Transport};
use crate::{web, AppContext, Config};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    let host = config.server.host.clone();
    let port = config.server.port;
    tokio::spawn(async move {
        if let Err(e) = web::serve(&host, port).await {
            tracing::error!("Health endpoint stopped: {}", e);
        }
    });

    let client = TelegramClient::new(&config.telegram).context("Failed to build Telegram client")?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    if let Err(e) = transport.clear_webhook().await {
        tracing::warn!("Could not clear webhook: {}", e);
    }

    if config.github.force_push_fallback {
        tracing::warn!("Forced push fallback is enabled; rejected pushes will overwrite the remote branch");
    }

    let ctx = AppContext::with_system_git(config, transport);
    tracing::info!(
        "Bot started, publishing to {} ({})",
        ctx.config.github.repo,
        ctx.config.gallery_url()
    );

    run_polling(&ctx, RetryPolicy::default())
        .await
        .context("Lost connection to Telegram")?;

    Ok(())
}
