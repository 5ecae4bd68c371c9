// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable conversation store trait.

use async_trait::async_trait;

use crate::error::ModmailError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelId, Conversation, UserId};

/// Persistence for open conversations, keyed by user and by relay channel.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Initializes the backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ModmailError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), ModmailError>;

    /// Persists a new conversation together with its initial messages.
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), ModmailError>;

    async fn find_by_user(&self, user: &UserId) -> Result<Option<Conversation>, ModmailError>;

    async fn find_by_channel(
        &self,
        channel: &ChannelId,
    ) -> Result<Option<Conversation>, ModmailError>;

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ModmailError>;

    /// Appends one line to the user's history.
    ///
    /// Returns `Ok(false)` when the user has no stored conversation.
    async fn append_message(&self, user: &UserId, line: &str) -> Result<bool, ModmailError>;

    /// Deletes the user's conversation. Returns the number of records removed.
    async fn delete_by_user(&self, user: &UserId) -> Result<u64, ModmailError>;

    /// Deletes every conversation mapped to `channel`. Returns the number removed.
    async fn delete_by_channel(&self, channel: &ChannelId) -> Result<u64, ModmailError>;
}
