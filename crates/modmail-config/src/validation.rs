// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes:
//! snowflake-shaped ids, parseable colors, and non-zero queue sizes.

use crate::diagnostic::ConfigError;
use crate::model::{parse_color, ModmailConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ModmailConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let ids = [
        ("discord.guild_id", &config.discord.guild_id),
        ("discord.category_id", &config.discord.category_id),
        ("discord.staff_role_id", &config.discord.staff_role_id),
        ("discord.archive_channel_id", &config.discord.archive_channel_id),
    ];
    for (key, value) in ids {
        if let Some(raw) = value
            && !is_snowflake(raw)
        {
            errors.push(ConfigError::Validation {
                key: key.to_string(),
                message: format!("{key} `{raw}` is not a numeric Discord id"),
            });
        }
    }

    if let Some(token) = &config.discord.token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            key: "discord.token".to_string(),
            message: "discord.token cannot be empty".to_string(),
        });
    }

    if let Some(path) = &config.storage.database_path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            key: "storage.database_path".to_string(),
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(color) = &config.transcript.embed_color
        && parse_color(color).is_none()
    {
        errors.push(ConfigError::Validation {
            key: "transcript.embed_color".to_string(),
            message: format!("transcript.embed_color `{color}` is not a #rrggbb color"),
        });
    }

    if config.transcript.syntax_label.trim().is_empty() {
        errors.push(ConfigError::Validation {
            key: "transcript.syntax_label".to_string(),
            message: "transcript.syntax_label must not be empty".to_string(),
        });
    }

    if config.transcript.history_limit == 0 {
        errors.push(ConfigError::Validation {
            key: "transcript.history_limit".to_string(),
            message: "transcript.history_limit must be at least 1".to_string(),
        });
    }

    if !config.paste.base_url.starts_with("http://") && !config.paste.base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            key: "paste.base_url".to_string(),
            message: format!("paste.base_url `{}` must be an http(s) URL", config.paste.base_url),
        });
    }

    if config.relay.write_queue_capacity == 0 {
        errors.push(ConfigError::Validation {
            key: "relay.write_queue_capacity".to_string(),
            message: "relay.write_queue_capacity must be at least 1".to_string(),
        });
    }

    if config.relay.write_max_attempts == 0 {
        errors.push(ConfigError::Validation {
            key: "relay.write_max_attempts".to_string(),
            message: "relay.write_max_attempts must be at least 1".to_string(),
        });
    }

    if config.commands.prefix.trim().is_empty() {
        errors.push(ConfigError::Validation {
            key: "commands.prefix".to_string(),
            message: "commands.prefix must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks the settings `modmail serve` cannot start without.
///
/// Kept apart from [`validate_config`] so offline commands (config check,
/// transcript rendering) work with a partial configuration.
pub fn validate_for_serve(config: &ModmailConfig) -> Result<(), Vec<ConfigError>> {
    let required = [
        ("discord.token", config.discord.token.is_some()),
        ("discord.guild_id", config.discord.guild_id.is_some()),
        ("discord.category_id", config.discord.category_id.is_some()),
        ("storage.database_path", config.storage.database_path.is_some()),
    ];

    let errors: Vec<ConfigError> = required
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(key, _)| ConfigError::MissingKey {
            key: key.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_snowflake(raw: &str) -> bool {
    matches!(raw.parse::<u64>(), Ok(id) if id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_ready() -> ModmailConfig {
        let mut config = ModmailConfig::default();
        config.discord.token = Some("token".to_string());
        config.discord.guild_id = Some("100".to_string());
        config.discord.category_id = Some("200".to_string());
        config.storage.database_path = Some("/tmp/modmail.db".to_string());
        config
    }

    fn has_error_for(errors: &[ConfigError], wanted: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { key, .. } if key == wanted))
    }

    #[test]
    fn default_config_validates() {
        let config = ModmailConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_numeric_guild_id_fails_validation() {
        let mut config = ModmailConfig::default();
        config.discord.guild_id = Some("my-guild".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "discord.guild_id"));
    }

    #[test]
    fn zero_id_fails_validation() {
        let mut config = ModmailConfig::default();
        config.discord.archive_channel_id = Some("0".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "discord.archive_channel_id"));
    }

    #[test]
    fn bad_embed_color_fails_validation() {
        let mut config = ModmailConfig::default();
        config.transcript.embed_color = Some("blurple".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "transcript.embed_color"));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ModmailConfig::default();
        config.storage.database_path = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "storage.database_path"));
    }

    #[test]
    fn zero_queue_capacity_and_attempts_are_both_reported() {
        let mut config = ModmailConfig::default();
        config.relay.write_queue_capacity = 0;
        config.relay.write_max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "relay.write_queue_capacity"));
        assert!(has_error_for(&errors, "relay.write_max_attempts"));
    }

    #[test]
    fn non_http_paste_url_fails_validation() {
        let mut config = ModmailConfig::default();
        config.paste.base_url = "ftp://paste".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "paste.base_url"));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = serve_ready();
        config.discord.staff_role_id = Some("300".to_string());
        config.discord.archive_channel_id = Some("400".to_string());
        config.transcript.embed_color = Some("#5865f2".to_string());
        assert!(validate_config(&config).is_ok());
        assert!(validate_for_serve(&config).is_ok());
    }

    #[test]
    fn serve_requires_token_guild_category_and_database() {
        let errors = validate_for_serve(&ModmailConfig::default()).unwrap_err();
        let missing: Vec<String> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key } => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            vec![
                "discord.token",
                "discord.guild_id",
                "discord.category_id",
                "storage.database_path"
            ]
        );
    }

    #[test]
    fn serve_reports_only_missing_database_path() {
        let mut config = serve_ready();
        config.storage.database_path = None;
        let errors = validate_for_serve(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ConfigError::MissingKey { key } if key == "storage.database_path"));
    }
}
