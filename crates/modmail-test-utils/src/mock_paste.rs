// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock paste service that records uploads.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use modmail_core::traits::adapter::PluginAdapter;
use modmail_core::traits::paste::PasteService;
use modmail_core::types::{AdapterType, HealthStatus, PasteRequest};
use modmail_core::ModmailError;

/// Paste service returning `https://paste.test/<n>` for the n-th upload.
pub struct MockPaste {
    uploads: Arc<Mutex<Vec<PasteRequest>>>,
}

impl MockPaste {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn uploads(&self) -> Vec<PasteRequest> {
        self.uploads.lock().await.clone()
    }
}

impl Default for MockPaste {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPaste {
    fn name(&self) -> &str {
        "mock-paste"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Paste
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        Ok(())
    }
}

#[async_trait]
impl PasteService for MockPaste {
    async fn upload(&self, request: &PasteRequest) -> Result<String, ModmailError> {
        let mut uploads = self.uploads.lock().await;
        uploads.push(request.clone());
        Ok(format!("https://paste.test/{}", uploads.len()))
    }
}
