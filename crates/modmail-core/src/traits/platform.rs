// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat platform trait (Discord and test doubles).

use async_trait::async_trait;

use crate::error::ModmailError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChannelId, ChannelMeta, HistoryMessage, MessageId, Notice, RelayChannelSpec, UserId,
    UserProfile,
};

/// Lookup, creation and delivery operations the relay needs from the chat platform.
///
/// Event delivery is not part of this trait: adapters push [`InboundMessage`]s
/// into the router themselves.
///
/// [`InboundMessage`]: crate::types::InboundMessage
#[async_trait]
pub trait ChatPlatform: PluginAdapter {
    /// Name of the guild the relay operates in.
    async fn guild_name(&self) -> Result<String, ModmailError>;

    /// Sends plain text to a user's direct message channel.
    async fn send_dm(&self, user: &UserId, content: &str) -> Result<MessageId, ModmailError>;

    /// Sends plain text to a guild channel.
    async fn send_to_channel(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<MessageId, ModmailError>;

    /// Creates a text channel restricted to the staff role.
    async fn create_relay_channel(
        &self,
        spec: &RelayChannelSpec,
    ) -> Result<ChannelId, ModmailError>;

    async fn pin_message(&self, channel: &ChannelId, message: &MessageId)
    -> Result<(), ModmailError>;

    /// Returns `Ok(false)` only when the platform reports the channel as unknown.
    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, ModmailError>;

    async fn delete_channel(&self, channel: &ChannelId) -> Result<(), ModmailError>;

    async fn fetch_user(&self, user: &UserId) -> Result<UserProfile, ModmailError>;

    /// Posts a rich summary message.
    async fn send_notice(
        &self,
        channel: &ChannelId,
        notice: &Notice,
    ) -> Result<MessageId, ModmailError>;

    /// Fetches up to `limit` of the most recent messages, oldest first.
    async fn fetch_history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, ModmailError>;

    async fn channel_meta(&self, channel: &ChannelId) -> Result<ChannelMeta, ModmailError>;

    /// Uploads a file to a channel.
    async fn send_file(
        &self,
        channel: &ChannelId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<MessageId, ModmailError>;
}
