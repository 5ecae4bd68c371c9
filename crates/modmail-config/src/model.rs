// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the modmail bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level modmail configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional; settings that `serve` cannot run without are
/// enforced by [`crate::validation::validate_for_serve`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModmailConfig {
    /// Discord connection and guild layout.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Conversation store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Paste-hosting service used for archived transcripts.
    #[serde(default)]
    pub paste: PasteConfig,

    /// Transcript archiving and HTML rendering.
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Custom greeting, intro notice and history line templates.
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Background persistence and reconciliation tuning.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Staff command settings.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Discord bot and guild layout configuration.
///
/// Ids are kept as strings so they survive environment overrides unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordConfig {
    /// Bot token. Required to serve.
    #[serde(default)]
    pub token: Option<String>,

    /// Guild that hosts the relay channels. Required to serve.
    #[serde(default)]
    pub guild_id: Option<String>,

    /// Category relay channels are created under. Required to serve.
    #[serde(default)]
    pub category_id: Option<String>,

    /// Role allowed to see relay channels. Without it only administrators can.
    #[serde(default)]
    pub staff_role_id: Option<String>,

    /// Channel that receives close summaries. Without it closing is a no-op.
    #[serde(default)]
    pub archive_channel_id: Option<String>,
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file. Required unless a store is supplied.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_wal_mode() -> bool {
    true
}

/// Paste-hosting service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PasteConfig {
    /// Base URL of a sourcebin-compatible service.
    #[serde(default = "default_paste_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_paste_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            base_url: default_paste_base_url(),
            timeout_secs: default_paste_timeout_secs(),
        }
    }
}

fn default_paste_base_url() -> String {
    "https://sourceb.in".to_string()
}

fn default_paste_timeout_secs() -> u64 {
    30
}

/// Transcript archiving and rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptConfig {
    /// Syntax label attached to uploaded transcripts.
    #[serde(default = "default_syntax_label")]
    pub syntax_label: String,

    /// Summary embed color as `#rrggbb`. Unset picks a random color per close.
    #[serde(default)]
    pub embed_color: Option<String>,

    /// HTML template for rendered transcripts. Unset uses the built-in template.
    #[serde(default)]
    pub template_path: Option<String>,

    /// Directory for working files. Unset uses the system temp directory.
    #[serde(default)]
    pub work_dir: Option<String>,

    /// Maximum number of messages fetched by the `transcript` command.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            syntax_label: default_syntax_label(),
            embed_color: None,
            template_path: None,
            work_dir: None,
            history_limit: default_history_limit(),
        }
    }
}

impl TranscriptConfig {
    /// Parses `embed_color` (`#rrggbb`, `0xrrggbb` or `rrggbb`) into an RGB value.
    pub fn embed_color_value(&self) -> Option<u32> {
        self.embed_color.as_deref().and_then(parse_color)
    }
}

/// Parses a hex RGB color string.
pub fn parse_color(raw: &str) -> Option<u32> {
    let hex = raw
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x");
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn default_syntax_label() -> String {
    "AsciiDoc".to_string()
}

fn default_history_limit() -> usize {
    100
}

/// Message templates.
///
/// Placeholders: `{guild}`, `{user}`, `{user_tag}`, `{user_id}`, `{role}`, `{content}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Sent to a user when their conversation opens.
    #[serde(default)]
    pub greeting: Option<String>,

    /// Posted and pinned in a new relay channel.
    #[serde(default)]
    pub intro: Option<String>,

    /// Format of the first history line saved for a conversation.
    #[serde(default)]
    pub save_format: Option<String>,
}

/// Background persistence and reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Maximum number of queued history appends before new ones are dropped.
    #[serde(default = "default_write_queue_capacity")]
    pub write_queue_capacity: usize,

    /// Attempts per append before it is given up.
    #[serde(default = "default_write_max_attempts")]
    pub write_max_attempts: u32,

    /// Delay between attempts, multiplied by the attempt number.
    #[serde(default = "default_write_retry_backoff_ms")]
    pub write_retry_backoff_ms: u64,

    /// Interval of the orphaned-channel reconciliation pass. `0` disables it.
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            write_queue_capacity: default_write_queue_capacity(),
            write_max_attempts: default_write_max_attempts(),
            write_retry_backoff_ms: default_write_retry_backoff_ms(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
        }
    }
}

fn default_write_queue_capacity() -> usize {
    256
}

fn default_write_max_attempts() -> u32 {
    3
}

fn default_write_retry_backoff_ms() -> u64 {
    250
}

fn default_reconcile_interval_secs() -> u64 {
    300
}

/// Staff command configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_accepts_common_forms() {
        assert_eq!(parse_color("#ff0000"), Some(0xff0000));
        assert_eq!(parse_color("0x00ff00"), Some(0x00ff00));
        assert_eq!(parse_color("0000ff"), Some(0x0000ff));
    }

    #[test]
    fn parse_color_rejects_garbage() {
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#gggggg"), None);
    }

    #[test]
    fn embed_color_unset_is_none() {
        assert_eq!(TranscriptConfig::default().embed_color_value(), None);
    }
}
