// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use modmail_core::traits::adapter::PluginAdapter;
use modmail_core::traits::storage::ConversationStore;
use modmail_core::types::{AdapterType, ChannelId, Conversation, HealthStatus, UserId};
use modmail_core::ModmailError;

/// A `ConversationStore` backed by a map, keyed by user.
///
/// `fail_next_appends(n)` makes the next `n` appends return a storage error,
/// which is how the write queue's retry path is exercised.
pub struct MemoryStore {
    conversations: Arc<Mutex<HashMap<UserId, Conversation>>>,
    append_failures: AtomicU32,
    append_calls: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(Mutex::new(HashMap::new())),
            append_failures: AtomicU32::new(0),
            append_calls: AtomicU32::new(0),
        }
    }

    pub fn fail_next_appends(&self, count: u32) {
        self.append_failures.store(count, Ordering::SeqCst);
    }

    /// Number of `append_message` calls, failed ones included.
    pub fn append_calls(&self) -> u32 {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.lock().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), ModmailError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ModmailError> {
        Ok(())
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), ModmailError> {
        let mut conversations = self.conversations.lock().await;
        if conversations.contains_key(&conversation.user)
            || conversations
                .values()
                .any(|c| c.channel == conversation.channel)
        {
            return Err(ModmailError::Storage {
                source: format!("conversation for {} already exists", conversation.user).into(),
            });
        }
        conversations.insert(conversation.user.clone(), conversation.clone());
        Ok(())
    }

    async fn find_by_user(&self, user: &UserId) -> Result<Option<Conversation>, ModmailError> {
        Ok(self.conversations.lock().await.get(user).cloned())
    }

    async fn find_by_channel(
        &self,
        channel: &ChannelId,
    ) -> Result<Option<Conversation>, ModmailError> {
        Ok(self
            .conversations
            .lock()
            .await
            .values()
            .find(|c| &c.channel == channel)
            .cloned())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ModmailError> {
        let mut all: Vec<_> = self.conversations.lock().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn append_message(&self, user: &UserId, line: &str) -> Result<bool, ModmailError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .append_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ModmailError::Storage {
                source: "injected append failure".into(),
            });
        }

        match self.conversations.lock().await.get_mut(user) {
            Some(conversation) => {
                conversation.messages.push(line.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_user(&self, user: &UserId) -> Result<u64, ModmailError> {
        Ok(u64::from(self.conversations.lock().await.remove(user).is_some()))
    }

    async fn delete_by_channel(&self, channel: &ChannelId) -> Result<u64, ModmailError> {
        let mut conversations = self.conversations.lock().await;
        let before = conversations.len();
        conversations.retain(|_, c| &c.channel != channel);
        Ok((before - conversations.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryStore::new();
        let user = UserId::from("1");
        store
            .create_conversation(&Conversation::new(
                user.clone(),
                ChannelId::from("c"),
                "first".into(),
            ))
            .await
            .unwrap();

        store.fail_next_appends(1);
        assert!(store.append_message(&user, "x").await.is_err());
        assert!(store.append_message(&user, "x").await.unwrap());
        assert_eq!(store.append_calls(), 2);
    }

    #[tokio::test]
    async fn duplicate_user_is_rejected() {
        let store = MemoryStore::new();
        let first = Conversation::new(UserId::from("1"), ChannelId::from("a"), "l".into());
        let second = Conversation::new(UserId::from("1"), ChannelId::from("b"), "l".into());
        store.create_conversation(&first).await.unwrap();
        assert!(store.create_conversation(&second).await.is_err());
    }
}
