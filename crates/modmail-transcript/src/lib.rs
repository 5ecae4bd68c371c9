// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML transcript renderer.
//!
//! Turns a channel's display metadata and ordered message history into a
//! static HTML page. The page is assembled in a working file: the template
//! head, a header block, one entry per message, then the template tail.

pub mod document;
pub mod html;

use std::path::PathBuf;

use modmail_config::model::TranscriptConfig;
use modmail_core::types::{ChannelMeta, HistoryMessage};
use modmail_core::ModmailError;
use tracing::{debug, info};

pub use document::DocumentBuilder;

/// Marker in the template where the transcript body is inserted.
pub const TRANSCRIPT_MARKER: &str = "<!-- transcript -->";

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/template.html");

/// Renders transcripts using a template and a working directory.
#[derive(Debug, Clone)]
pub struct TranscriptRenderer {
    template_path: Option<PathBuf>,
    work_dir: PathBuf,
}

impl TranscriptRenderer {
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            template_path: config.template_path.as_ref().map(PathBuf::from),
            work_dir: config
                .work_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Renders `messages` (in the given order) into an HTML document.
    pub async fn render(
        &self,
        meta: &ChannelMeta,
        messages: &[HistoryMessage],
    ) -> Result<Vec<u8>, ModmailError> {
        let template = self.load_template().await?;
        let (head, tail) = split_template(&template);

        let path = self
            .work_dir
            .join(format!("transcript-{}.html", uuid::Uuid::new_v4()));
        let mut builder = DocumentBuilder::create(path, head).await?;

        if let Err(e) = write_body(&mut builder, meta, messages).await {
            builder.discard().await;
            return Err(e);
        }

        let bytes = builder.finish(tail).await?;
        info!(
            channel = %meta.channel_name,
            messages = messages.len(),
            bytes = bytes.len(),
            "transcript rendered"
        );
        Ok(bytes)
    }

    async fn load_template(&self) -> Result<String, ModmailError> {
        let Some(path) = &self.template_path else {
            return Ok(DEFAULT_TEMPLATE.to_string());
        };
        debug!(path = %path.display(), "loading transcript template");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ModmailError::Transcript {
                message: format!("failed to read template {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })
    }
}

async fn write_body(
    builder: &mut DocumentBuilder,
    meta: &ChannelMeta,
    messages: &[HistoryMessage],
) -> Result<(), ModmailError> {
    builder
        .append(&html::info_block(meta, messages.len()))
        .await?;
    for message in messages {
        builder.append(&html::message_entry(message)).await?;
    }
    Ok(())
}

/// Splits a template at [`TRANSCRIPT_MARKER`]. Without a marker the body is
/// appended after the whole template.
fn split_template(template: &str) -> (&str, &str) {
    match template.split_once(TRANSCRIPT_MARKER) {
        Some((head, tail)) => (head, tail),
        None => (template, ""),
    }
}
