// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modmail relay.
//!
//! Routes direct messages between users and per-user staff relay channels,
//! persists each conversation's history, and closes conversations into an
//! archived transcript.
//!
//! # Components
//!
//! - [`MailRouter`] - classifies inbound messages and relays them
//! - [`SessionCloser`] - archives and tears down a conversation
//! - [`Reconciler`] - removes conversations whose relay channel is gone
//! - [`WriteQueue`] - bounded, retried background history appends
//! - [`Customizer`] - greeting, intro and saved-line formatting

pub mod closer;
pub mod commands;
pub mod format;
pub mod index;
pub mod reconcile;
pub mod router;
pub mod writer;

use modmail_config::model::ModmailConfig;
use modmail_core::{ChannelId, ModmailError};

pub use closer::{CloseOutcome, SessionCloser};
pub use commands::StaffCommand;
pub use format::{Customizer, TemplateCustomizer, TemplateVars};
pub use index::ConversationIndex;
pub use reconcile::Reconciler;
pub use router::MailRouter;
pub use writer::WriteQueue;

/// Guild layout and behavior settings the relay runs with.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Category relay channels are created under.
    pub category: ChannelId,
    /// Role granted access to relay channels.
    pub staff_role: Option<String>,
    /// Channel receiving close summaries.
    pub archive_channel: Option<ChannelId>,
    /// Staff command prefix.
    pub prefix: String,
    /// Syntax label for uploaded transcripts.
    pub syntax_label: String,
    /// Summary color; random per close when unset.
    pub embed_color: Option<u32>,
    /// Maximum messages rendered by the `transcript` command.
    pub history_limit: usize,
}

impl RelaySettings {
    /// Builds settings from configuration. The relay category is required.
    pub fn from_config(config: &ModmailConfig) -> Result<Self, ModmailError> {
        let category = config
            .discord
            .category_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ModmailError::Config("discord.category_id is required".into()))?;

        Ok(Self {
            category: ChannelId::from(category),
            staff_role: config.discord.staff_role_id.clone(),
            archive_channel: config.discord.archive_channel_id.as_deref().map(ChannelId::from),
            prefix: config.commands.prefix.clone(),
            syntax_label: config.transcript.syntax_label.clone(),
            embed_color: config.transcript.embed_color_value(),
            history_limit: config.transcript.history_limit,
        })
    }
}
