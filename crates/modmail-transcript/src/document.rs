// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental document construction over a working file.

use std::path::{Path, PathBuf};

use modmail_core::ModmailError;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Builds one document by appending fragments to a working file.
///
/// A builder belongs to a single render call. Every append is awaited before
/// the next one starts, so fragments land in call order.
#[derive(Debug)]
pub struct DocumentBuilder {
    path: PathBuf,
    file: File,
}

impl DocumentBuilder {
    /// Creates the working file at `path` and writes `head` to it.
    pub async fn create(path: PathBuf, head: &str) -> Result<Self, ModmailError> {
        let file = File::create(&path)
            .await
            .map_err(|e| io_error(&path, "create", e))?;
        let mut builder = Self { path, file };
        builder.append(head).await?;
        debug!(path = %builder.path.display(), "working file created");
        Ok(builder)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a fragment to the document.
    pub async fn append(&mut self, fragment: &str) -> Result<(), ModmailError> {
        self.file
            .write_all(fragment.as_bytes())
            .await
            .map_err(|e| io_error(&self.path, "append to", e))
    }

    /// Appends `tail`, reads the finished document back and removes the
    /// working file.
    pub async fn finish(mut self, tail: &str) -> Result<Vec<u8>, ModmailError> {
        self.append(tail).await?;
        self.file
            .flush()
            .await
            .map_err(|e| io_error(&self.path, "flush", e))?;

        let Self { path, file } = self;
        drop(file);

        let bytes = fs::read(&path).await;
        remove_quietly(&path).await;
        bytes.map_err(|e| io_error(&path, "read", e))
    }

    /// Removes the working file without producing a document.
    pub async fn discard(self) {
        let Self { path, file } = self;
        drop(file);
        remove_quietly(&path).await;
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "failed to remove working file");
    }
}

fn io_error(path: &Path, action: &str, e: std::io::Error) -> ModmailError {
    ModmailError::Transcript {
        message: format!("failed to {action} {}: {e}", path.display()),
        source: Some(Box::new(e)),
    }
}
