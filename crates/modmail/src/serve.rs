// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modmail serve` command implementation.
//!
//! Opens the SQLite conversation store, builds the paste client and the
//! Discord gateway client, wires the mail router between them, and runs
//! until SIGINT or SIGTERM. Queued history appends are drained before exit.

use std::sync::Arc;
use std::time::Duration;

use modmail_config::ModmailConfig;
use modmail_core::{ConversationStore, ModmailError};
use modmail_discord::{DiscordPlatform, ModmailHandler};
use modmail_paste::PasteClient;
use modmail_relay::{MailRouter, RelaySettings, TemplateCustomizer, WriteQueue};
use modmail_storage::SqliteStorage;
use modmail_transcript::TranscriptRenderer;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `modmail serve` command.
pub async fn run_serve(config: ModmailConfig) -> Result<(), ModmailError> {
    init_tracing(&config.log.level);
    info!("starting modmail serve");

    let cancel = shutdown::install_signal_handler();

    let storage = Arc::new(SqliteStorage::new(config.storage.clone())?);
    storage.initialize().await?;

    let paste = Arc::new(PasteClient::new(&config.paste)?);
    let settings = RelaySettings::from_config(&config)?;
    let renderer = TranscriptRenderer::new(&config.transcript);
    let (writer, writer_handle) = WriteQueue::spawn(storage.clone(), &config.relay, cancel.clone());

    let router_cell = Arc::new(OnceCell::new());
    let mut client =
        modmail_discord::build_client(&config.discord, ModmailHandler::new(router_cell.clone()))
            .await?;
    let platform = Arc::new(DiscordPlatform::new(client.http.clone(), &config.discord)?);

    let router = MailRouter::new(platform, storage.clone(), paste, writer, renderer, settings)
        .with_customizer(Arc::new(TemplateCustomizer::new(&config.messages)));
    router.ready().await?;

    let reconcile_handle = match config.relay.reconcile_interval_secs {
        0 => None,
        secs => Some(
            router
                .reconciler()
                .spawn_periodic(Duration::from_secs(secs), cancel.clone()),
        ),
    };

    router_cell
        .set(Arc::new(router))
        .map_err(|_| ModmailError::Internal("mail router installed twice".into()))?;

    let shard_manager = client.shard_manager.clone();
    let gateway_result = tokio::select! {
        result = client.start() => result
            .map_err(|e| ModmailError::channel("Discord gateway stopped", e)),
        _ = cancel.cancelled() => {
            info!("shutting down Discord gateway");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };
    if let Err(e) = &gateway_result {
        error!(error = %e, "gateway client failed");
    }

    cancel.cancel();
    if let Some(handle) = reconcile_handle {
        if let Err(e) = handle.await {
            warn!(error = %e, "reconciliation task panicked");
        }
    }
    if let Err(e) = writer_handle.await {
        warn!(error = %e, "write queue task panicked");
    }
    storage.close().await?;

    info!("modmail stopped");
    gateway_result
}

/// Initializes the tracing subscriber with an environment filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("modmail={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
