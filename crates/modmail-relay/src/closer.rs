// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation close: archive, summarize, tear down.

use std::sync::Arc;

use chrono::Utc;
use modmail_core::types::{Notice, NoticeLink, PasteRequest};
use modmail_core::{ChannelId, ChatPlatform, ConversationStore, ModmailError, PasteService};
use tracing::{info, warn};

use crate::index::ConversationIndex;
use crate::writer::WriteQueue;
use crate::RelaySettings;

/// Result of a close request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The channel is not a relay channel of an open conversation.
    NotFound,
    /// No archive channel is configured; nothing was changed.
    ArchiveNotConfigured,
    Closed {
        message_count: usize,
        transcript_url: String,
    },
}

/// Closes conversations into an archived transcript and a summary notice.
#[derive(Clone)]
pub struct SessionCloser {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ConversationStore>,
    paste: Arc<dyn PasteService>,
    index: Arc<ConversationIndex>,
    writer: WriteQueue,
    settings: Arc<RelaySettings>,
}

impl SessionCloser {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ConversationStore>,
        paste: Arc<dyn PasteService>,
        index: Arc<ConversationIndex>,
        writer: WriteQueue,
        settings: Arc<RelaySettings>,
    ) -> Self {
        Self {
            platform,
            store,
            paste,
            index,
            writer,
            settings,
        }
    }

    /// Closes the conversation relayed through `channel`.
    ///
    /// Queued history lines are flushed before the history is read. The
    /// transcript is uploaded before anything is removed, so a failed upload
    /// leaves the conversation open.
    pub async fn close(
        &self,
        channel: &ChannelId,
        reason: Option<&str>,
    ) -> Result<CloseOutcome, ModmailError> {
        let Some(conversation) = self.index.by_channel(channel) else {
            return Ok(CloseOutcome::NotFound);
        };
        let Some(archive) = &self.settings.archive_channel else {
            warn!(
                channel = %channel,
                "no archive channel configured, conversation left open"
            );
            return Ok(CloseOutcome::ArchiveNotConfigured);
        };

        self.writer.flush().await;
        let messages = self
            .store
            .find_by_user(&conversation.user)
            .await?
            .map(|stored| stored.messages)
            .unwrap_or_default();
        let user = self.platform.fetch_user(&conversation.user).await?;

        let transcript_url = self
            .paste
            .upload(&PasteRequest {
                name: format!(
                    "Transcript [{}] {}",
                    user.tag,
                    Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                ),
                content: messages.join("\n"),
                language: self.settings.syntax_label.clone(),
            })
            .await?;

        let notice = Notice {
            author_name: user.tag.clone(),
            author_icon: user.avatar_url.clone(),
            color: self.settings.embed_color.unwrap_or_else(random_color),
            description: format!(
                "Message Count: {}\nClose Reason: {}",
                messages.len(),
                reason.unwrap_or("No reason provided")
            ),
            link: Some(NoticeLink {
                label: "Transcript".to_string(),
                url: transcript_url.clone(),
            }),
        };

        if let Err(e) = self.platform.delete_channel(channel).await {
            warn!(channel = %channel, error = %e, "failed to delete relay channel");
        }
        if let Err(e) = self.platform.send_notice(archive, &notice).await {
            warn!(channel = %archive, error = %e, "failed to post close summary");
        }
        self.index.remove(&conversation.user);
        self.store.delete_by_user(&conversation.user).await?;

        info!(
            user = %conversation.user,
            channel = %channel,
            message_count = messages.len(),
            "conversation closed"
        );
        Ok(CloseOutcome::Closed {
            message_count: messages.len(),
            transcript_url,
        })
    }
}

fn random_color() -> u32 {
    rand::random::<u32>() & 0x00ff_ffff
}
