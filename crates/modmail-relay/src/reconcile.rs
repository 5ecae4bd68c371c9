// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of indexed conversations against live relay channels.

use std::sync::Arc;
use std::time::Duration;

use modmail_core::{ChatPlatform, Conversation, ConversationStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::index::ConversationIndex;

/// Removes conversations whose relay channel no longer exists.
#[derive(Clone)]
pub struct Reconciler {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ConversationStore>,
    index: Arc<ConversationIndex>,
}

impl Reconciler {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ConversationStore>,
        index: Arc<ConversationIndex>,
    ) -> Self {
        Self {
            platform,
            store,
            index,
        }
    }

    /// Checks one conversation. Returns true while its relay channel exists.
    ///
    /// A failed lookup counts as existing; only a confirmed missing channel
    /// removes the conversation.
    pub async fn reconcile_one(&self, conversation: &Conversation) -> bool {
        match self.platform.channel_exists(&conversation.channel).await {
            Ok(true) => true,
            Ok(false) => {
                self.index.remove(&conversation.user);
                if let Err(e) = self.store.delete_by_user(&conversation.user).await {
                    warn!(user = %conversation.user, error = %e, "failed to delete orphaned conversation");
                }
                info!(
                    user = %conversation.user,
                    channel = %conversation.channel,
                    "relay channel is gone, conversation removed"
                );
                false
            }
            Err(e) => {
                warn!(
                    channel = %conversation.channel,
                    error = %e,
                    "relay channel lookup failed, keeping conversation"
                );
                true
            }
        }
    }

    /// Checks every indexed conversation. Returns the number removed.
    pub async fn reconcile_all(&self) -> usize {
        let mut removed = 0;
        for conversation in self.index.snapshot() {
            if !self.reconcile_one(&conversation).await {
                removed += 1;
            }
        }
        debug!(removed, remaining = self.index.len(), "reconciliation pass complete");
        removed
    }

    /// Runs [`reconcile_all`](Self::reconcile_all) every `interval` until cancelled.
    pub fn spawn_periodic(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first immediate tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.reconcile_all().await;
                        if removed > 0 {
                            info!(removed, "periodic reconciliation removed orphaned conversations");
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("reconciliation task shutting down");
                        break;
                    }
                }
            }
        })
    }
}
