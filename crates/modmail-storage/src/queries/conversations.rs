// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation record CRUD operations.

use std::collections::HashMap;

use modmail_core::{ChannelId, Conversation, ModmailError, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::queries::messages::load_lines;

/// Create a conversation and its initial history lines in one transaction.
pub async fn create_conversation(
    db: &Database,
    conversation: &Conversation,
) -> Result<(), ModmailError> {
    let conversation = conversation.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO conversations (user_id, channel_id, created_at) VALUES (?1, ?2, ?3)",
                params![
                    conversation.user.0,
                    conversation.channel.0,
                    conversation.created_at
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO conversation_messages (user_id, content) VALUES (?1, ?2)",
                )?;
                for line in &conversation.messages {
                    stmt.execute(params![conversation.user.0, line])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the conversation opened by `user`.
pub async fn get_by_user(db: &Database, user: &UserId) -> Result<Option<Conversation>, ModmailError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, channel_id, created_at FROM conversations WHERE user_id = ?1",
                    params![user],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;
            row.map(|(user_id, channel_id, created_at)| {
                hydrate(conn, user_id, channel_id, created_at)
            })
            .transpose()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the conversation relayed through `channel`.
pub async fn get_by_channel(
    db: &Database,
    channel: &ChannelId,
) -> Result<Option<Conversation>, ModmailError> {
    let channel = channel.0.clone();
    db.connection()
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT user_id, channel_id, created_at FROM conversations WHERE channel_id = ?1",
                    params![channel],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;
            row.map(|(user_id, channel_id, created_at)| {
                hydrate(conn, user_id, channel_id, created_at)
            })
            .transpose()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List every open conversation with its full history, oldest first.
pub async fn list_conversations(db: &Database) -> Result<Vec<Conversation>, ModmailError> {
    db.connection()
        .call(|conn| {
            let mut lines: HashMap<String, Vec<String>> = HashMap::new();
            {
                let mut stmt = conn.prepare(
                    "SELECT user_id, content FROM conversation_messages ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                for row in rows {
                    let (user_id, content) = row?;
                    lines.entry(user_id).or_default().push(content);
                }
            }

            let mut stmt = conn.prepare(
                "SELECT user_id, channel_id, created_at FROM conversations ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let user_id: String = row.get(0)?;
                Ok(Conversation {
                    messages: Vec::new(),
                    channel: ChannelId(row.get(1)?),
                    created_at: row.get(2)?,
                    user: UserId(user_id),
                })
            })?;

            let mut conversations = Vec::new();
            for row in rows {
                let mut conversation = row?;
                conversation.messages = lines.remove(&conversation.user.0).unwrap_or_default();
                conversations.push(conversation);
            }
            Ok(conversations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the conversation opened by `user`. History lines cascade.
pub async fn delete_by_user(db: &Database, user: &UserId) -> Result<u64, ModmailError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM conversations WHERE user_id = ?1",
                params![user],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete every conversation relayed through `channel`. History lines cascade.
pub async fn delete_by_channel(db: &Database, channel: &ChannelId) -> Result<u64, ModmailError> {
    let channel = channel.0.clone();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM conversations WHERE channel_id = ?1",
                params![channel],
            )?;
            Ok(removed as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn hydrate(
    conn: &rusqlite::Connection,
    user_id: String,
    channel_id: String,
    created_at: String,
) -> Result<Conversation, rusqlite::Error> {
    let messages = load_lines(conn, &user_id)?;
    Ok(Conversation {
        user: UserId(user_id),
        channel: ChannelId(channel_id),
        messages,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::messages::{append_message, count_messages};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_conversation(user: &str, channel: &str) -> Conversation {
        Conversation {
            user: UserId::from(user),
            channel: ChannelId::from(channel),
            messages: vec![format!("{user} :: hello")],
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_by_user_roundtrips() {
        let (db, _dir) = setup_db().await;
        let conversation = make_conversation("u1", "c1");

        create_conversation(&db, &conversation).await.unwrap();
        let retrieved = get_by_user(&db, &UserId::from("u1")).await.unwrap();
        assert_eq!(retrieved, Some(conversation));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_by_channel_resolves_owner() {
        let (db, _dir) = setup_db().await;
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();
        create_conversation(&db, &make_conversation("u2", "c2")).await.unwrap();

        let found = get_by_channel(&db, &ChannelId::from("c2")).await.unwrap().unwrap();
        assert_eq!(found.user, UserId::from("u2"));
        assert!(get_by_channel(&db, &ChannelId::from("c3")).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_by_user(&db, &UserId::from("nobody")).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_conversation_for_same_user_is_rejected() {
        let (db, _dir) = setup_db().await;
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();

        let duplicate = create_conversation(&db, &make_conversation("u1", "c9")).await;
        assert!(duplicate.is_err(), "user_id is the primary key");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn channel_cannot_map_to_two_users() {
        let (db, _dir) = setup_db().await;
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();

        let clash = create_conversation(&db, &make_conversation("u2", "c1")).await;
        assert!(clash.is_err(), "channel_id is unique");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_groups_history_per_conversation() {
        let (db, _dir) = setup_db().await;
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();
        create_conversation(&db, &make_conversation("u2", "c2")).await.unwrap();
        append_message(&db, &UserId::from("u2"), "staff :: hi").await.unwrap();
        append_message(&db, &UserId::from("u1"), "staff :: yo").await.unwrap();

        let all = list_conversations(&db).await.unwrap();
        assert_eq!(all.len(), 2);
        let u2 = all.iter().find(|c| c.user.0 == "u2").unwrap();
        assert_eq!(u2.messages, vec!["u2 :: hello", "staff :: hi"]);
        let u1 = all.iter().find(|c| c.user.0 == "u1").unwrap();
        assert_eq!(u1.messages, vec!["u1 :: hello", "staff :: yo"]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_by_channel_cascades_history() {
        let (db, _dir) = setup_db().await;
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();
        append_message(&db, &UserId::from("u1"), "staff :: hi").await.unwrap();

        let removed = delete_by_channel(&db, &ChannelId::from("c1")).await.unwrap();
        assert_eq!(removed, 1);
        assert!(get_by_user(&db, &UserId::from("u1")).await.unwrap().is_none());
        assert_eq!(count_messages(&db, &UserId::from("u1")).await.unwrap(), 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_by_user_reports_zero_when_missing() {
        let (db, _dir) = setup_db().await;
        assert_eq!(delete_by_user(&db, &UserId::from("u1")).await.unwrap(), 0);
        create_conversation(&db, &make_conversation("u1", "c1")).await.unwrap();
        assert_eq!(delete_by_user(&db, &UserId::from("u1")).await.unwrap(), 1);
        db.close().await.unwrap();
    }
}
