// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixture for relay integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use modmail_config::model::{RelayConfig, TranscriptConfig};
use modmail_core::types::{Author, InboundMessage, MessageOrigin};
use modmail_core::{ChannelId, MessageId, UserId};
use modmail_relay::{MailRouter, RelaySettings, WriteQueue};
use modmail_test_utils::{MemoryStore, MockPaste, MockPlatform};
use modmail_transcript::TranscriptRenderer;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const CATEGORY: &str = "category-1";
pub const ARCHIVE: &str = "archive-1";
pub const STAFF_ROLE: &str = "role-1";

pub struct Fixture {
    pub platform: Arc<MockPlatform>,
    pub store: Arc<MemoryStore>,
    pub paste: Arc<MockPaste>,
    pub router: Arc<MailRouter>,
    cancel: CancellationToken,
    writer: JoinHandle<()>,
    _work_dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_archive(Some(ARCHIVE))
    }

    pub fn with_archive(archive: Option<&str>) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), archive)
    }

    pub fn with_store(store: Arc<MemoryStore>, archive: Option<&str>) -> Self {
        let platform = Arc::new(MockPlatform::new());
        let paste = Arc::new(MockPaste::new());
        let cancel = CancellationToken::new();
        let (writer, handle) = WriteQueue::spawn(store.clone(), &RelayConfig::default(), cancel.clone());

        let work_dir = tempfile::tempdir().unwrap();
        let renderer = TranscriptRenderer::new(&TranscriptConfig {
            work_dir: Some(work_dir.path().display().to_string()),
            ..TranscriptConfig::default()
        });

        let settings = RelaySettings {
            category: ChannelId::from(CATEGORY),
            staff_role: Some(STAFF_ROLE.to_string()),
            archive_channel: archive.map(ChannelId::from),
            prefix: "!".to_string(),
            syntax_label: "AsciiDoc".to_string(),
            embed_color: Some(0x123456),
            history_limit: 100,
        };

        let router = MailRouter::new(
            platform.clone(),
            store.clone(),
            paste.clone(),
            writer,
            renderer,
            settings,
        );

        Self {
            platform,
            store,
            paste,
            router: Arc::new(router),
            cancel,
            writer: handle,
            _work_dir: work_dir,
        }
    }

    /// Stops the write queue after it has applied every queued append.
    pub async fn drain(self) -> Arc<MemoryStore> {
        self.cancel.cancel();
        self.writer.await.unwrap();
        self.store
    }
}

pub fn user(id: &str) -> Author {
    Author {
        id: UserId::from(id),
        tag: format!("alice{id}#0001"),
        avatar_url: None,
    }
}

pub fn staff() -> Author {
    Author {
        id: UserId::from("900"),
        tag: "staff#0001".to_string(),
        avatar_url: None,
    }
}

pub fn dm(user_id: &str, content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("dm-msg-{content}")),
        author: user(user_id),
        channel: ChannelId(format!("dm-{user_id}")),
        origin: MessageOrigin::Direct,
        content: content.to_string(),
        attachments: vec![],
    }
}

pub fn staff_message(channel: &ChannelId, content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("staff-msg-{content}")),
        author: staff(),
        channel: channel.clone(),
        origin: MessageOrigin::Guild {
            parent: Some(ChannelId::from(CATEGORY)),
        },
        content: content.to_string(),
        attachments: vec![],
    }
}
