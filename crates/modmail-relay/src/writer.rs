// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background persistence of history lines.
//!
//! Appends are queued on a bounded channel and applied by a single task, in
//! arrival order, with retries. A full queue drops the append. A flush waits
//! until everything queued before it has been applied. On cancellation the
//! task stops accepting appends, applies what is already queued, and exits.

use std::sync::Arc;
use std::time::Duration;

use modmail_config::model::RelayConfig;
use modmail_core::{ConversationStore, UserId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
enum Job {
    Append { user: UserId, line: String },
    /// Acknowledged once every earlier job has been applied.
    Flush(oneshot::Sender<()>),
}

/// Retry policy for queued appends.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl From<&RelayConfig> for RetryPolicy {
    fn from(config: &RelayConfig) -> Self {
        Self {
            max_attempts: config.write_max_attempts.max(1),
            backoff: Duration::from_millis(config.write_retry_backoff_ms),
        }
    }
}

/// Sending half of the history write queue.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<Job>,
}

impl WriteQueue {
    /// Spawns the queue's worker task.
    pub fn spawn(
        store: Arc<dyn ConversationStore>,
        config: &RelayConfig,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.write_queue_capacity.max(1));
        let policy = RetryPolicy::from(config);
        let handle = tokio::spawn(run_worker(store, rx, policy, cancel));
        (Self { tx }, handle)
    }

    /// Queues a history line for `user`. Returns false when it was dropped.
    pub fn enqueue(&self, user: &UserId, line: String) -> bool {
        let job = Job::Append {
            user: user.clone(),
            line,
        };
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(user = %user, "write queue full, dropping history line");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(user = %user, "write queue closed, dropping history line");
                false
            }
        }
    }

    /// Waits until every append queued before this call has been applied.
    ///
    /// Waits for queue space rather than dropping. Returns immediately once
    /// the worker has stopped.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Job::Flush(ack)).await.is_err() {
            debug!("write queue stopped, nothing to flush");
            return;
        }
        if done.await.is_err() {
            debug!("write queue stopped before flush was acknowledged");
        }
    }
}

async fn run_worker(
    store: Arc<dyn ConversationStore>,
    mut rx: mpsc::Receiver<Job>,
    policy: RetryPolicy,
    cancel: CancellationToken,
) {
    debug!("write queue started");
    loop {
        tokio::select! {
            biased;
            job = rx.recv() => match job {
                Some(job) => handle(store.as_ref(), job, policy).await,
                None => break,
            },
            _ = cancel.cancelled() => {
                rx.close();
                let mut drained = 0usize;
                while let Some(job) = rx.recv().await {
                    handle(store.as_ref(), job, policy).await;
                    drained += 1;
                }
                info!(drained, "write queue drained");
                break;
            }
        }
    }
    debug!("write queue stopped");
}

async fn handle(store: &dyn ConversationStore, job: Job, policy: RetryPolicy) {
    match job {
        Job::Append { user, line } => apply(store, &user, &line, policy).await,
        Job::Flush(ack) => {
            // The flusher may have given up waiting.
            let _ = ack.send(());
        }
    }
}

async fn apply(store: &dyn ConversationStore, user: &UserId, line: &str, policy: RetryPolicy) {
    for attempt in 1..=policy.max_attempts {
        match store.append_message(user, line).await {
            Ok(true) => return,
            Ok(false) => {
                debug!(user = %user, "conversation closed before history line was saved");
                return;
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    user = %user,
                    attempt,
                    error = %e,
                    "history append failed, retrying"
                );
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            Err(e) => {
                error!(
                    user = %user,
                    attempts = policy.max_attempts,
                    error = %e,
                    "history append failed permanently"
                );
            }
        }
    }
}
