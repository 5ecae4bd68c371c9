// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ConversationStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use modmail_config::model::StorageConfig;
use modmail_core::{
    AdapterType, ChannelId, Conversation, ConversationStore, HealthStatus, ModmailError,
    PluginAdapter, UserId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed conversation store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`ConversationStore::initialize`].
pub struct SqliteStorage {
    database_path: String,
    wal_mode: bool,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// Fails immediately when no database path is configured. The connection
    /// itself is not opened until [`ConversationStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Result<Self, ModmailError> {
        let database_path = config.database_path.ok_or_else(|| {
            ModmailError::Config(
                "storage.database_path is required when no conversation store is supplied".into(),
            )
        })?;
        if database_path.trim().is_empty() {
            return Err(ModmailError::Config(
                "storage.database_path cannot be empty".into(),
            ));
        }

        Ok(Self {
            database_path,
            wal_mode: config.wal_mode,
            db: OnceCell::new(),
        })
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ModmailError> {
        self.db.get().ok_or_else(|| ModmailError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), ModmailError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), ModmailError> {
        let db = Database::open_with(&self.database_path, self.wal_mode).await?;
        self.db.set(db).map_err(|_| ModmailError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.database_path, "SQLite conversation store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ModmailError> {
        self.db()?;
        self.checkpoint().await
    }

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), ModmailError> {
        queries::conversations::create_conversation(self.db()?, conversation).await
    }

    async fn find_by_user(&self, user: &UserId) -> Result<Option<Conversation>, ModmailError> {
        queries::conversations::get_by_user(self.db()?, user).await
    }

    async fn find_by_channel(
        &self,
        channel: &ChannelId,
    ) -> Result<Option<Conversation>, ModmailError> {
        queries::conversations::get_by_channel(self.db()?, channel).await
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ModmailError> {
        queries::conversations::list_conversations(self.db()?).await
    }

    async fn append_message(&self, user: &UserId, line: &str) -> Result<bool, ModmailError> {
        queries::messages::append_message(self.db()?, user, line).await
    }

    async fn delete_by_user(&self, user: &UserId) -> Result<u64, ModmailError> {
        queries::conversations::delete_by_user(self.db()?, user).await
    }

    async fn delete_by_channel(&self, channel: &ChannelId) -> Result<u64, ModmailError> {
        queries::conversations::delete_by_channel(self.db()?, channel).await
    }
}
