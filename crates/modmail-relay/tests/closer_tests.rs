// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session close integration tests.

mod common;

use common::{dm, staff_message, Fixture, ARCHIVE};
use modmail_core::{ChannelId, UserId};
use modmail_relay::CloseOutcome;

async fn open_with_reply(fixture: &Fixture) -> ChannelId {
    fixture.router.handle(dm("1", "hello")).await.unwrap();
    let channel = fixture
        .router
        .index()
        .by_user(&UserId::from("1"))
        .unwrap()
        .channel;
    fixture
        .router
        .handle(staff_message(&channel, "on it"))
        .await
        .unwrap();
    channel
}

#[tokio::test]
async fn close_archives_and_removes_conversation() {
    let fixture = Fixture::new();
    let channel = open_with_reply(&fixture).await;

    let outcome = fixture
        .router
        .closer()
        .close(&channel, Some("resolved"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CloseOutcome::Closed {
            message_count: 2,
            transcript_url: "https://paste.test/1".into()
        }
    );

    let uploads = fixture.paste.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].content, "alice1#0001 :: hello\nstaff#0001 :: on it");
    assert_eq!(uploads[0].language, "AsciiDoc");
    assert!(uploads[0].name.starts_with("Transcript [user1#0001] "));

    let notices = fixture.platform.notices().await;
    assert_eq!(notices.len(), 1);
    let (target, notice) = &notices[0];
    assert_eq!(target, &ChannelId::from(ARCHIVE));
    assert_eq!(notice.author_name, "user1#0001");
    assert_eq!(notice.color, 0x123456);
    assert_eq!(notice.description, "Message Count: 2\nClose Reason: resolved");
    let link = notice.link.as_ref().unwrap();
    assert_eq!(link.label, "Transcript");
    assert_eq!(link.url, "https://paste.test/1");

    assert_eq!(fixture.platform.deleted_channels().await, vec![channel]);
    assert!(fixture.router.index().is_empty());
    assert!(fixture.store.is_empty().await);
}

#[tokio::test]
async fn close_command_uses_default_reason() {
    let fixture = Fixture::new();
    let channel = open_with_reply(&fixture).await;

    fixture
        .router
        .handle(staff_message(&channel, "!close"))
        .await
        .unwrap();

    let notices = fixture.platform.notices().await;
    assert_eq!(notices.len(), 1);
    assert!(notices[0].1.description.ends_with("Close Reason: No reason provided"));
    assert!(fixture.store.is_empty().await);
    // The command itself is not relayed to the user.
    assert!(!fixture
        .platform
        .dms()
        .await
        .iter()
        .any(|m| m.content.contains("!close")));
}

#[tokio::test]
async fn close_right_after_replies_archives_every_line() {
    let fixture = Fixture::new();
    fixture.router.handle(dm("1", "hello")).await.unwrap();
    fixture.router.handle(dm("1", "one more thing")).await.unwrap();
    let channel = fixture
        .router
        .index()
        .by_user(&UserId::from("1"))
        .unwrap()
        .channel;
    fixture
        .router
        .handle(staff_message(&channel, "on it"))
        .await
        .unwrap();
    fixture
        .router
        .handle(staff_message(&channel, "!close done"))
        .await
        .unwrap();

    let uploads = fixture.paste.uploads().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0].content,
        "alice1#0001 :: hello\nalice1#0001 :: one more thing\nstaff#0001 :: on it"
    );
    let notices = fixture.platform.notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].1.description, "Message Count: 3\nClose Reason: done");
    assert!(fixture.store.is_empty().await);
}

#[tokio::test]
async fn close_without_archive_channel_changes_nothing() {
    let fixture = Fixture::with_archive(None);
    let channel = open_with_reply(&fixture).await;

    let outcome = fixture.router.closer().close(&channel, None).await.unwrap();

    assert_eq!(outcome, CloseOutcome::ArchiveNotConfigured);
    assert!(fixture.platform.notices().await.is_empty());
    assert!(fixture.platform.deleted_channels().await.is_empty());
    assert!(fixture.paste.uploads().await.is_empty());
    assert_eq!(fixture.router.index().len(), 1);
    assert_eq!(fixture.store.len().await, 1);
}

#[tokio::test]
async fn close_unknown_channel_is_not_found() {
    let fixture = Fixture::new();

    let outcome = fixture
        .router
        .closer()
        .close(&ChannelId::from("nope"), None)
        .await
        .unwrap();

    assert_eq!(outcome, CloseOutcome::NotFound);
    assert!(fixture.platform.notices().await.is_empty());
}
