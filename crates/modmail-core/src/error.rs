// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the modmail bot.

use thiserror::Error;

/// The primary error type used across all modmail collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum ModmailError {
    /// Configuration errors (missing token, missing database path, bad ids).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat platform errors (send failure, missing permissions, unknown channel).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Paste-hosting errors (upload rejected, malformed response).
    #[error("paste error: {message}")]
    Paste {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transcript rendering errors (template unreadable, working file I/O).
    #[error("transcript error: {message}")]
    Transcript {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ModmailError {
    /// Wraps a platform SDK error as a [`ModmailError::Channel`].
    pub fn channel<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ModmailError::Channel {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
