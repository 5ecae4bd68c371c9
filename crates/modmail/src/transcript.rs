// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `modmail transcript` command implementation.
//!
//! Renders an HTML transcript offline from a JSON dump of the form
//! `{"channel": {...}, "messages": [...]}`.

use std::path::Path;

use modmail_config::ModmailConfig;
use modmail_core::types::{ChannelMeta, HistoryMessage};
use modmail_core::ModmailError;
use modmail_transcript::TranscriptRenderer;
use serde::Deserialize;

/// A channel's metadata and ordered messages.
#[derive(Debug, Deserialize)]
pub struct TranscriptDump {
    pub channel: ChannelMeta,
    pub messages: Vec<HistoryMessage>,
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> ModmailError {
    ModmailError::Transcript {
        message: format!("failed to {action} {}: {e}", path.display()),
        source: Some(Box::new(e)),
    }
}

/// Runs the `modmail transcript` command.
pub async fn run_transcript(
    config: &ModmailConfig,
    input: &Path,
    output: &Path,
) -> Result<(), ModmailError> {
    let raw = tokio::fs::read(input)
        .await
        .map_err(|e| io_error("read", input, e))?;
    let dump: TranscriptDump =
        serde_json::from_slice(&raw).map_err(|e| ModmailError::Transcript {
            message: format!("invalid transcript dump {}: {e}", input.display()),
            source: Some(Box::new(e)),
        })?;

    let html = TranscriptRenderer::new(&config.transcript)
        .render(&dump.channel, &dump.messages)
        .await?;
    tokio::fs::write(output, &html)
        .await
        .map_err(|e| io_error("write", output, e))?;

    println!(
        "modmail: rendered {} messages to {}",
        dump.messages.len(),
        output.display()
    );
    Ok(())
}
