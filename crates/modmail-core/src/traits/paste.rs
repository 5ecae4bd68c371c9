// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paste-hosting trait used to archive transcripts.

use async_trait::async_trait;

use crate::error::ModmailError;
use crate::traits::adapter::PluginAdapter;
use crate::types::PasteRequest;

#[async_trait]
pub trait PasteService: PluginAdapter {
    /// Publishes the blob and returns a retrievable URL.
    async fn upload(&self, request: &PasteRequest) -> Result<String, ModmailError>;
}
