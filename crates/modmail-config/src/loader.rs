// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./modmail.toml` > `~/.config/modmail/modmail.toml` > `/etc/modmail/modmail.toml`
//! with environment variable overrides via `MODMAIL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ModmailConfig;

/// Sections recognized in `MODMAIL_<SECTION>_<KEY>` environment variables.
const ENV_SECTIONS: &[&str] = &[
    "discord",
    "storage",
    "paste",
    "transcript",
    "messages",
    "relay",
    "commands",
    "log",
];

/// System-wide config file path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/modmail/modmail.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "modmail.toml";

/// Per-user config file path under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("modmail").join("modmail.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/modmail/modmail.toml` (system-wide)
/// 3. `~/.config/modmail/modmail.toml` (user XDG config)
/// 4. `./modmail.toml` (local directory)
/// 5. `MODMAIL_*` environment variables
pub fn load_config() -> Result<ModmailConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ModmailConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ModmailConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ModmailConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider, mapping the first `_` after a
/// known section name to a dot.
///
/// `Env::split("_")` would turn `MODMAIL_DISCORD_GUILD_ID` into
/// `discord.guild.id`; the explicit map yields `discord.guild_id`.
fn env_provider() -> Env {
    Env::prefixed("MODMAIL_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("discord_guild_id"), "discord.guild_id");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(
            map_env_key("relay_write_retry_backoff_ms"),
            "relay.write_retry_backoff_ms"
        );
        assert_eq!(map_env_key("log_level"), "log.level");
    }

    #[test]
    fn unknown_env_section_is_left_alone() {
        assert_eq!(map_env_key("agent_name"), "agent_name");
    }
}
