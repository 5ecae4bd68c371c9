// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML fragments for the transcript document.

use modmail_core::types::{ChannelMeta, HistoryMessage};

/// Timestamp layout shown next to each author tag.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC";

const CODE_FENCE: &str = "```";

/// Escapes text for use in element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders the guild and channel header block.
pub fn info_block(meta: &ChannelMeta, message_count: usize) -> String {
    let icon = meta.guild_icon_url.as_deref().unwrap_or_default();
    format!(
        "<div class=\"info\">\
         <div class=\"info__guild-icon-container\"><img class=\"info__guild-icon\" src=\"{icon}\"></div>\
         <div class=\"info__metadata\">\
         <div class=\"info__guild-name\">{guild}</div>\
         <div class=\"info__channel-name\">{channel}</div>\
         <div class=\"info__channel-message-count\">Transcripted {message_count} messages.</div>\
         </div></div>\n",
        icon = html_escape(icon),
        guild = html_escape(&meta.guild_name),
        channel = html_escape(&meta.channel_name),
    )
}

/// Renders a single message entry.
///
/// Text opening with a code fence becomes a `<code>` block with every fence
/// removed; anything else is a plain `<span>`.
pub fn message_entry(message: &HistoryMessage) -> String {
    let avatar = message.author.avatar_url.as_deref().unwrap_or_default();
    let heading = format!(
        "{} {}",
        message.author.tag,
        message.created_at.format(TIMESTAMP_FORMAT)
    );
    let body = if message.content.starts_with(CODE_FENCE) {
        format!(
            "<code>{}</code>",
            html_escape(&message.content.replace(CODE_FENCE, ""))
        )
    } else {
        format!("<span>{}</span>", html_escape(&message.content))
    };

    format!(
        "<div class=\"parent-container\">\
         <div class=\"avatar-container\"><img src=\"{avatar}\" class=\"avatar\"></div>\
         <div class=\"message-container\"><span>{heading}</span>{body}</div>\
         </div>\n",
        avatar = html_escape(avatar),
        heading = html_escape(&heading),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use modmail_core::types::Author;
    use modmail_core::UserId;

    fn message(content: &str) -> HistoryMessage {
        HistoryMessage {
            author: Author {
                id: UserId::from("1"),
                tag: "alice".into(),
                avatar_url: Some("https://cdn.example/a.png".into()),
            },
            content: content.into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn plain_text_goes_in_span() {
        let html = message_entry(&message("hello <world>"));
        assert!(html.contains("<span>hello &lt;world&gt;</span>"));
        assert!(!html.contains("<code>"));
    }

    #[test]
    fn fenced_text_goes_in_code_without_fences() {
        let html = message_entry(&message("```rust\nfn main() {}\n```"));
        assert!(html.contains("<code>rust\nfn main() {}\n</code>"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn fence_later_in_text_stays_plain() {
        let html = message_entry(&message("see ```x```"));
        assert!(html.contains("<span>see ```x```</span>"));
    }

    #[test]
    fn heading_carries_tag_and_timestamp() {
        let html = message_entry(&message("hi"));
        assert!(html.contains("<span>alice Tue Mar 05 2024 14:07:09 UTC</span>"));
    }

    #[test]
    fn info_block_counts_messages() {
        let meta = ChannelMeta {
            guild_name: "Guild & Co".into(),
            guild_icon_url: None,
            channel_name: "alice-0001".into(),
        };
        let html = info_block(&meta, 3);
        assert!(html.contains("Transcripted 3 messages."));
        assert!(html.contains("Guild &amp; Co"));
        assert!(html.contains("src=\"\""));
    }
}
