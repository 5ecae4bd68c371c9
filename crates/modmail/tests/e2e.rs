// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the relay over a real SQLite store.
//!
//! Each test uses its own temp database, a mock platform and a mock paste
//! service. Tests are independent and order-insensitive.

use std::sync::Arc;

use modmail_config::model::{RelayConfig, StorageConfig, TranscriptConfig};
use modmail_core::types::{Author, InboundMessage, MessageOrigin};
use modmail_core::{ChannelId, ConversationStore, MessageId, UserId};
use modmail_relay::{CloseOutcome, MailRouter, RelaySettings, WriteQueue};
use modmail_storage::SqliteStorage;
use modmail_test_utils::{MockPaste, MockPlatform};
use modmail_transcript::TranscriptRenderer;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Harness {
    platform: Arc<MockPlatform>,
    paste: Arc<MockPaste>,
    storage: Arc<SqliteStorage>,
    router: MailRouter,
    cancel: CancellationToken,
    writer: JoinHandle<()>,
}

impl Harness {
    async fn open(dir: &std::path::Path, platform: Arc<MockPlatform>) -> Self {
        let storage = Arc::new(
            SqliteStorage::new(StorageConfig {
                database_path: Some(dir.join("modmail.db").display().to_string()),
                wal_mode: true,
            })
            .unwrap(),
        );
        storage.initialize().await.unwrap();

        let paste = Arc::new(MockPaste::new());
        let cancel = CancellationToken::new();
        let (writer, handle) =
            WriteQueue::spawn(storage.clone(), &RelayConfig::default(), cancel.clone());
        let renderer = TranscriptRenderer::new(&TranscriptConfig {
            work_dir: Some(dir.display().to_string()),
            ..TranscriptConfig::default()
        });
        let settings = RelaySettings {
            category: ChannelId::from("category"),
            staff_role: None,
            archive_channel: Some(ChannelId::from("archive")),
            prefix: "!".into(),
            syntax_label: "AsciiDoc".into(),
            embed_color: None,
            history_limit: 50,
        };
        let router = MailRouter::new(
            platform.clone(),
            storage.clone(),
            paste.clone(),
            writer,
            renderer,
            settings,
        );

        Self {
            platform,
            paste,
            storage,
            router,
            cancel,
            writer: handle,
        }
    }

    /// Drains the write queue and closes the database.
    async fn shutdown(self) {
        self.cancel.cancel();
        self.writer.await.unwrap();
        self.storage.close().await.unwrap();
    }
}

fn dm(content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("dm-{content}")),
        author: Author {
            id: UserId::from("77"),
            tag: "carol#1234".into(),
            avatar_url: None,
        },
        channel: ChannelId::from("dm-77"),
        origin: MessageOrigin::Direct,
        content: content.into(),
        attachments: vec![],
    }
}

fn staff(channel: &ChannelId, content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("staff-{content}")),
        author: Author {
            id: UserId::from("5"),
            tag: "mod#0005".into(),
            avatar_url: None,
        },
        channel: channel.clone(),
        origin: MessageOrigin::Guild {
            parent: Some(ChannelId::from("category")),
        },
        content: content.into(),
        attachments: vec![],
    }
}

#[tokio::test]
async fn conversation_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(MockPlatform::new());

    let harness = Harness::open(dir.path(), platform.clone()).await;
    harness.router.handle(dm("hello")).await.unwrap();
    let channel = harness
        .router
        .index()
        .by_user(&UserId::from("77"))
        .unwrap()
        .channel;
    harness.router.handle(staff(&channel, "hi carol")).await.unwrap();
    harness.shutdown().await;

    let harness = Harness::open(dir.path(), platform.clone()).await;
    harness.router.ready().await.unwrap();
    assert_eq!(harness.router.index().len(), 1);

    harness.router.handle(dm("still there?")).await.unwrap();
    assert_eq!(platform.created_channels().await.len(), 1);
    harness.cancel.cancel();
    harness.writer.await.unwrap();

    let stored = harness
        .storage
        .find_by_user(&UserId::from("77"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.messages,
        vec![
            "carol#1234 :: hello",
            "mod#0005 :: hi carol",
            "carol#1234 :: still there?"
        ]
    );
}

#[tokio::test]
async fn close_archives_history_from_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(MockPlatform::new());
    let harness = Harness::open(dir.path(), platform.clone()).await;

    harness.router.handle(dm("my order is late")).await.unwrap();
    let channel = harness
        .router
        .index()
        .by_user(&UserId::from("77"))
        .unwrap()
        .channel;
    // Close straight away: only the awaited first line is guaranteed stored.
    let outcome = harness
        .router
        .closer()
        .close(&channel, Some("shipped"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CloseOutcome::Closed {
            message_count: 1,
            transcript_url: "https://paste.test/1".into()
        }
    );
    assert_eq!(
        harness.paste.uploads().await[0].content,
        "carol#1234 :: my order is late"
    );
    assert!(harness
        .storage
        .find_by_user(&UserId::from("77"))
        .await
        .unwrap()
        .is_none());
    assert_eq!(platform.notices().await.len(), 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn orphaned_conversation_is_dropped_on_ready() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(MockPlatform::new());

    let harness = Harness::open(dir.path(), platform.clone()).await;
    harness.router.handle(dm("hello")).await.unwrap();
    let channel = harness
        .router
        .index()
        .by_user(&UserId::from("77"))
        .unwrap()
        .channel;
    harness.shutdown().await;

    platform.remove_channel(&channel).await;

    let harness = Harness::open(dir.path(), platform).await;
    harness.router.ready().await.unwrap();
    assert!(harness.router.index().is_empty());
    assert!(harness.storage.list_conversations().await.unwrap().is_empty());
    harness.shutdown().await;
}
