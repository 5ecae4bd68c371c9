// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff commands issued inside relay channels.

/// A parsed staff command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffCommand {
    /// Close the conversation, with an optional reason.
    Close { reason: Option<String> },
    /// Render the channel history to an HTML file.
    Transcript,
}

/// Parses `content` as a staff command. Unknown commands yield `None` and
/// are relayed like any other text.
pub fn parse(content: &str, prefix: &str) -> Option<StaffCommand> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "close" => Some(StaffCommand::Close {
            reason: (!args.is_empty()).then(|| args.to_string()),
        }),
        "transcript" => Some(StaffCommand::Transcript),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_without_reason() {
        assert_eq!(
            parse("!close", "!"),
            Some(StaffCommand::Close { reason: None })
        );
        assert_eq!(
            parse("!close   ", "!"),
            Some(StaffCommand::Close { reason: None })
        );
    }

    #[test]
    fn close_with_reason() {
        assert_eq!(
            parse("!CLOSE resolved via  email", "!"),
            Some(StaffCommand::Close {
                reason: Some("resolved via  email".into())
            })
        );
    }

    #[test]
    fn transcript_command() {
        assert_eq!(parse("?transcript", "?"), Some(StaffCommand::Transcript));
    }

    #[test]
    fn other_text_is_not_a_command() {
        assert_eq!(parse("close please", "!"), None);
        assert_eq!(parse("!help", "!"), None);
        assert_eq!(parse("!", "!"), None);
        assert_eq!(parse("!closed", "!"), None);
    }
}
