// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Turns Figment errors and validation failures into miette diagnostics.
//! Unknown keys are located in the TOML file that introduced them and get a
//! "did you mean" hint based on Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity above which a valid key is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable with miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(modmail::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, if one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("not a modmail setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(modmail::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A setting `modmail serve` cannot run without.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(modmail::config::missing_key),
        help("set `{key}` in modmail.toml or through its MODMAIL_ environment variable")
    )]
    MissingKey { key: String },

    /// A value that parsed but makes no sense, e.g. a malformed Discord id.
    #[error("`{key}`: {message}")]
    #[diagnostic(code(modmail::config::validation))]
    Validation { key: String, message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(modmail::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// A TOML file that contributed to the configuration.
#[derive(Debug, Clone)]
pub struct TomlSource {
    /// Display name; a file path, or `<inline>` for string input.
    pub name: String,
    pub content: String,
}

impl TomlSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
pub fn from_figment(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let field = match &error.kind {
                Kind::UnknownField(field, _) => Some(field.as_str()),
                Kind::MissingField(field) => Some(&**field),
                _ => None,
            };
            let mut section = error.path.clone();
            if field.is_some() && section.last().map(String::as_str) == field {
                section.pop();
            }
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(&error, &section, field, sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&section, field),
                },
                Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
                    ConfigError::InvalidType {
                        key: section.join("."),
                        detail: format!("found {actual}"),
                        expected: expected.clone(),
                        span: None,
                        src: None,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn dotted(section: &[String], field: &str) -> String {
    if section.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", section.join("."))
    }
}

/// Finds the span of `field` in the source file the error came from.
fn locate(
    error: &figment::Error,
    section: &[String],
    field: &str,
    sources: &[TomlSource],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .map(|source| match source {
            figment::Source::File(path) => path.display().to_string(),
            other => other.to_string(),
        });

    let source = sources.iter().find(|s| match &origin {
        Some(origin) => &s.name == origin,
        None => s.name == "<inline>",
    });

    source
        .and_then(|s| {
            find_key_offset(&s.content, section, field).map(|offset| {
                (
                    Some(SourceSpan::new(offset.into(), field.len())),
                    Some(NamedSource::new(&s.name, s.content.clone())),
                )
            })
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` declared under the `[section]` table.
///
/// Tracks table headers line by line, so a key with the same name in another
/// table is not matched. An empty `section` means the root table.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let wanted = section.join(".");
    let mut current = String::new();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            current = header
                .split(']')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
        } else if current == wanted {
            let is_key = trimmed
                .strip_prefix(field)
                .map(|rest| rest.trim_start().starts_with('='))
                .unwrap_or(false);
            if is_key {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }

    None
}

/// Returns the valid key most similar to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr as a miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    #[test]
    fn suggest_token_for_tokn() {
        let valid = &["token", "guild_id", "category_id"];
        assert_eq!(suggest_key("tokn", valid), Some("token".to_string()));
    }

    #[test]
    fn suggest_picks_closest_key() {
        let valid = &["token", "guild_id", "category_id", "staff_role_id"];
        assert_eq!(
            suggest_key("categry_id", valid),
            Some("category_id".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["token", "guild_id", "category_id"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn key_offset_respects_tables() {
        let content = "[paste]\ntimeout_secs = 5\n\n[transcript]\n  timeout_secs = 9\n";
        let o = find_key_offset(content, &section("transcript"), "timeout_secs").unwrap();
        assert_eq!(&content[o..o + 12], "timeout_secs");
        assert!(o > content.find("[transcript]").unwrap());
    }

    #[test]
    fn key_offset_requires_assignment() {
        let content = "[discord]\ntoken_file = \"x\"\ntoken=\"y\"\n";
        let o = find_key_offset(content, &section("discord"), "token").unwrap();
        assert_eq!(&content[o..o + 7], "token=\"");
    }

    #[test]
    fn key_offset_missing_section() {
        let content = "[storage]\nwal_mode = true\n";
        assert_eq!(find_key_offset(content, &section("discord"), "token"), None);
    }

    #[test]
    fn unknown_key_in_commands_suggests_prefix() {
        let content = "[commands]\nprefx = \"?\"\n";
        let err = crate::loader::load_config_from_str(content).unwrap_err();
        let errors = from_figment(err, &[TomlSource::new("<inline>", content)]);

        match &errors[0] {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => {
                assert_eq!(key, "prefx");
                assert_eq!(suggestion.as_deref(), Some("prefix"));
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
    }
}
