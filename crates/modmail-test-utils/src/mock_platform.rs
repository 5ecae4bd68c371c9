// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat platform for deterministic testing.
//!
//! `MockPlatform` implements `ChatPlatform` by capturing every outbound call
//! for assertion in tests. Channel creation can be held open to exercise
//! concurrent first messages.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use modmail_core::traits::adapter::PluginAdapter;
use modmail_core::traits::platform::ChatPlatform;
use modmail_core::types::{
    AdapterType, ChannelId, ChannelMeta, HealthStatus, HistoryMessage, MessageId, Notice,
    RelayChannelSpec, UserId, UserProfile,
};
use modmail_core::ModmailError;

/// A text message captured by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub target: String,
    pub content: String,
}

#[derive(Default)]
struct Recorded {
    dms: Vec<SentMessage>,
    channel_messages: Vec<SentMessage>,
    created: Vec<RelayChannelSpec>,
    pinned: Vec<(ChannelId, MessageId)>,
    deleted: Vec<ChannelId>,
    notices: Vec<(ChannelId, Notice)>,
    files: Vec<(ChannelId, String, Vec<u8>)>,
}

/// A mock chat platform for testing.
pub struct MockPlatform {
    guild_name: String,
    recorded: Arc<Mutex<Recorded>>,
    live_channels: Arc<Mutex<HashSet<ChannelId>>>,
    history: Arc<Mutex<HashMap<ChannelId, Vec<HistoryMessage>>>>,
    next_id: AtomicU64,
    hold_creation: AtomicBool,
    creation_started: Arc<Notify>,
    creation_released: Arc<Notify>,
    fail_dms: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            guild_name: "Mock Guild".to_string(),
            recorded: Arc::new(Mutex::new(Recorded::default())),
            live_channels: Arc::new(Mutex::new(HashSet::new())),
            history: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            hold_creation: AtomicBool::new(false),
            creation_started: Arc::new(Notify::new()),
            creation_released: Arc::new(Notify::new()),
            fail_dms: AtomicBool::new(false),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Marks a channel as existing without going through creation.
    pub async fn add_channel(&self, channel: &ChannelId) {
        self.live_channels.lock().await.insert(channel.clone());
    }

    /// Makes a channel unknown to the platform, as if staff deleted it by hand.
    pub async fn remove_channel(&self, channel: &ChannelId) {
        self.live_channels.lock().await.remove(channel);
    }

    /// Sets the history returned by `fetch_history` for a channel.
    pub async fn set_history(&self, channel: &ChannelId, messages: Vec<HistoryMessage>) {
        self.history.lock().await.insert(channel.clone(), messages);
    }

    /// Makes `create_relay_channel` block until [`release_creation`] is called.
    ///
    /// [`release_creation`]: MockPlatform::release_creation
    pub fn hold_creation(&self) {
        self.hold_creation.store(true, Ordering::SeqCst);
    }

    /// Waits until a held `create_relay_channel` call has started.
    pub async fn creation_started(&self) {
        self.creation_started.notified().await;
    }

    /// Lets one held `create_relay_channel` call finish.
    pub fn release_creation(&self) {
        self.hold_creation.store(false, Ordering::SeqCst);
        self.creation_released.notify_one();
    }

    /// Makes every `send_dm` call fail.
    pub fn fail_dms(&self) {
        self.fail_dms.store(true, Ordering::SeqCst);
    }

    pub async fn dms(&self) -> Vec<SentMessage> {
        self.recorded.lock().await.dms.clone()
    }

    pub async fn channel_messages(&self) -> Vec<SentMessage> {
        self.recorded.lock().await.channel_messages.clone()
    }

    pub async fn created_channels(&self) -> Vec<RelayChannelSpec> {
        self.recorded.lock().await.created.clone()
    }

    pub async fn pinned(&self) -> Vec<(ChannelId, MessageId)> {
        self.recorded.lock().await.pinned.clone()
    }

    pub async fn deleted_channels(&self) -> Vec<ChannelId> {
        self.recorded.lock().await.deleted.clone()
    }

    pub async fn notices(&self) -> Vec<(ChannelId, Notice)> {
        self.recorded.lock().await.notices.clone()
    }

    pub async fn files(&self) -> Vec<(ChannelId, String, Vec<u8>)> {
        self.recorded.lock().await.files.clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn guild_name(&self) -> Result<String, ModmailError> {
        Ok(self.guild_name.clone())
    }

    async fn send_dm(&self, user: &UserId, content: &str) -> Result<MessageId, ModmailError> {
        if self.fail_dms.load(Ordering::SeqCst) {
            return Err(ModmailError::Channel {
                message: format!("cannot send messages to user {user}"),
                source: None,
            });
        }
        self.recorded.lock().await.dms.push(SentMessage {
            target: user.to_string(),
            content: content.to_string(),
        });
        Ok(MessageId(self.next_id("dm")))
    }

    async fn send_to_channel(
        &self,
        channel: &ChannelId,
        content: &str,
    ) -> Result<MessageId, ModmailError> {
        self.recorded.lock().await.channel_messages.push(SentMessage {
            target: channel.to_string(),
            content: content.to_string(),
        });
        Ok(MessageId(self.next_id("msg")))
    }

    async fn create_relay_channel(
        &self,
        spec: &RelayChannelSpec,
    ) -> Result<ChannelId, ModmailError> {
        if self.hold_creation.load(Ordering::SeqCst) {
            self.creation_started.notify_one();
            self.creation_released.notified().await;
        }
        let channel = ChannelId(self.next_id("channel"));
        self.recorded.lock().await.created.push(spec.clone());
        self.live_channels.lock().await.insert(channel.clone());
        Ok(channel)
    }

    async fn pin_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), ModmailError> {
        self.recorded
            .lock()
            .await
            .pinned
            .push((channel.clone(), message.clone()));
        Ok(())
    }

    async fn channel_exists(&self, channel: &ChannelId) -> Result<bool, ModmailError> {
        Ok(self.live_channels.lock().await.contains(channel))
    }

    async fn delete_channel(&self, channel: &ChannelId) -> Result<(), ModmailError> {
        self.live_channels.lock().await.remove(channel);
        self.recorded.lock().await.deleted.push(channel.clone());
        Ok(())
    }

    async fn fetch_user(&self, user: &UserId) -> Result<UserProfile, ModmailError> {
        Ok(UserProfile {
            id: user.clone(),
            name: format!("user{user}"),
            tag: format!("user{user}#0001"),
            avatar_url: Some(format!("https://cdn.example/avatars/{user}.png")),
        })
    }

    async fn send_notice(
        &self,
        channel: &ChannelId,
        notice: &Notice,
    ) -> Result<MessageId, ModmailError> {
        self.recorded
            .lock()
            .await
            .notices
            .push((channel.clone(), notice.clone()));
        Ok(MessageId(self.next_id("notice")))
    }

    async fn fetch_history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, ModmailError> {
        let history = self.history.lock().await;
        let messages = history.get(channel).cloned().unwrap_or_default();
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.into_iter().skip(skip).collect())
    }

    async fn channel_meta(&self, channel: &ChannelId) -> Result<ChannelMeta, ModmailError> {
        Ok(ChannelMeta {
            guild_name: self.guild_name.clone(),
            guild_icon_url: None,
            channel_name: format!("relay-{channel}"),
        })
    }

    async fn send_file(
        &self,
        channel: &ChannelId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<MessageId, ModmailError> {
        self.recorded
            .lock()
            .await
            .files
            .push((channel.clone(), file_name.to_string(), bytes));
        Ok(MessageId(self.next_id("file")))
    }
}
