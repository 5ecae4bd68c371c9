// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paste-hosting client for archived transcripts.
//!
//! Speaks the sourcebin bin-creation shape: `POST {base}/api/bins` with a
//! list of files, answered by `{"key": "..."}`; the bin is then readable at
//! `{base}/{key}`.

use std::time::Duration;

use async_trait::async_trait;
use modmail_config::model::PasteConfig;
use modmail_core::types::PasteRequest;
use modmail_core::{AdapterType, HealthStatus, ModmailError, PasteService, PluginAdapter};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body for bin creation.
#[derive(Debug, Serialize)]
struct CreateBin<'a> {
    title: &'a str,
    files: Vec<BinFile<'a>>,
}

#[derive(Debug, Serialize)]
struct BinFile<'a> {
    name: &'a str,
    content: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedBin {
    key: String,
}

/// HTTP client for a sourcebin-compatible paste service.
///
/// Transient failures (429, 500, 502, 503) are retried once after a short delay.
#[derive(Debug, Clone)]
pub struct PasteClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl PasteClient {
    /// Creates a client for the configured service.
    pub fn new(config: &PasteConfig) -> Result<Self, ModmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModmailError::Paste {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn bins_url(&self) -> String {
        format!("{}/api/bins", self.base_url)
    }

    fn bin_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }
}

fn is_transient_error(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[async_trait]
impl PluginAdapter for PasteClient {
    fn name(&self) -> &str {
        "sourcebin"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Paste
    }

    async fn health_check(&self) -> Result<HealthStatus, ModmailError> {
        match self.client.get(&self.base_url).send().await {
            Ok(resp) if resp.status().is_server_error() => Ok(HealthStatus::Degraded(format!(
                "paste service returned {}",
                resp.status()
            ))),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "paste service unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ModmailError> {
        Ok(())
    }
}

#[async_trait]
impl PasteService for PasteClient {
    async fn upload(&self, request: &PasteRequest) -> Result<String, ModmailError> {
        let body = CreateBin {
            title: &request.name,
            files: vec![BinFile {
                name: &request.name,
                content: &request.content,
                language: &request.language,
            }],
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying paste upload after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(self.bins_url())
                .json(&body)
                .send()
                .await
                .map_err(|e| ModmailError::Paste {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "paste response received");

            if status.is_success() {
                let created: CreatedBin =
                    response.json().await.map_err(|e| ModmailError::Paste {
                        message: format!("failed to parse paste response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(self.bin_url(&created.key));
            }

            let text = response.text().await.unwrap_or_default();
            let err = ModmailError::Paste {
                message: format!("paste service returned {status}: {text}"),
                source: None,
            };
            if is_transient_error(status) && attempt < self.max_retries {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(last_error.unwrap_or_else(|| ModmailError::Paste {
            message: "paste upload failed after retries".into(),
            source: None,
        }))
    }
}
