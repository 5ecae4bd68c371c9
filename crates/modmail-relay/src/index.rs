// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory index of open conversations.

use dashmap::{DashMap, DashSet};
use modmail_core::{ChannelId, Conversation, UserId};

/// Open conversations keyed by user, plus the set of users whose
/// conversation is being created.
///
/// The index answers routing lookups. History lines are read from the store,
/// not from the indexed records.
#[derive(Debug, Default)]
pub struct ConversationIndex {
    conversations: DashMap<UserId, Conversation>,
    in_flight: DashSet<UserId>,
}

impl ConversationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the index contents. Returns the number of conversations loaded.
    pub fn load(&self, conversations: Vec<Conversation>) -> usize {
        self.conversations.clear();
        for conversation in conversations {
            self.conversations
                .insert(conversation.user.clone(), conversation);
        }
        self.conversations.len()
    }

    pub fn insert(&self, conversation: Conversation) {
        self.conversations
            .insert(conversation.user.clone(), conversation);
    }

    pub fn by_user(&self, user: &UserId) -> Option<Conversation> {
        self.conversations.get(user).map(|entry| entry.value().clone())
    }

    pub fn by_channel(&self, channel: &ChannelId) -> Option<Conversation> {
        self.conversations
            .iter()
            .find(|entry| &entry.channel == channel)
            .map(|entry| entry.value().clone())
    }

    pub fn remove(&self, user: &UserId) -> Option<Conversation> {
        self.conversations.remove(user).map(|(_, conversation)| conversation)
    }

    /// A copy of every indexed conversation.
    pub fn snapshot(&self) -> Vec<Conversation> {
        self.conversations
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Marks a creation for `user` as in flight.
    ///
    /// Returns `None` when one already is. The mark is cleared when the
    /// returned guard drops.
    pub fn begin_creation(&self, user: &UserId) -> Option<CreationGuard<'_>> {
        self.in_flight.insert(user.clone()).then(|| CreationGuard {
            in_flight: &self.in_flight,
            user: user.clone(),
        })
    }

    pub fn is_creating(&self, user: &UserId) -> bool {
        self.in_flight.contains(user)
    }
}

/// Clears a user's in-flight creation mark on drop.
#[derive(Debug)]
pub struct CreationGuard<'a> {
    in_flight: &'a DashSet<UserId>,
    user: UserId,
}

impl Drop for CreationGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.user);
    }
}
