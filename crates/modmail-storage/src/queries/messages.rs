// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History line operations.

use modmail_core::{ModmailError, UserId};
use rusqlite::params;

use crate::database::Database;

/// Append one history line to the user's conversation.
///
/// The insert is conditional on the conversation existing, so a line for a
/// closed conversation is dropped rather than orphaned. Returns whether a
/// line was written.
pub async fn append_message(db: &Database, user: &UserId, line: &str) -> Result<bool, ModmailError> {
    let user = user.0.clone();
    let line = line.to_string();
    db.connection()
        .call(move |conn| {
            let written = conn.execute(
                "INSERT INTO conversation_messages (user_id, content)
                 SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM conversations WHERE user_id = ?1)",
                params![user, line],
            )?;
            Ok(written == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of history lines stored for the user.
pub async fn count_messages(db: &Database, user: &UserId) -> Result<usize, ModmailError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM conversation_messages WHERE user_id = ?1",
                params![user],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Loads a user's history lines in insertion order.
///
/// Runs on the connection thread; callers compose it inside `call()`.
pub(crate) fn load_lines(
    conn: &rusqlite::Connection,
    user_id: &str,
) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(
        "SELECT content FROM conversation_messages WHERE user_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
    rows.collect()
}
