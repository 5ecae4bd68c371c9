// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across collaborator traits and the relay.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of a chat platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Opaque identifier of a chat platform channel (guild channel or DM).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId(s.to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Platform,
    Storage,
    Paste,
}

// --- Inbound events ---

/// The author of an inbound or historical message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    /// Display tag, e.g. `name#0001` or the bare username.
    pub tag: String,
    pub avatar_url: Option<String>,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub proxy_url: Option<String>,
}

impl Attachment {
    /// The URL to reference when relaying, preferring the direct URL.
    pub fn link(&self) -> &str {
        if self.url.is_empty() {
            self.proxy_url.as_deref().unwrap_or_default()
        } else {
            &self.url
        }
    }
}

/// Where an inbound message was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOrigin {
    /// A private channel between the bot and the author.
    Direct,
    /// A guild text channel, with the category it sits under, if any.
    Guild { parent: Option<ChannelId> },
}

/// A message event delivered by the chat platform.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author: Author,
    pub channel: ChannelId,
    pub origin: MessageOrigin,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    pub fn is_direct(&self) -> bool {
        self.origin == MessageOrigin::Direct
    }

    /// Returns true when the message was posted in a channel under `category`.
    pub fn is_under(&self, category: &ChannelId) -> bool {
        matches!(&self.origin, MessageOrigin::Guild { parent: Some(p) } if p == category)
    }
}

// --- Durable records ---

/// An open modmail conversation: one user, one relay channel, ordered history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub user: UserId,
    pub channel: ChannelId,
    /// Formatted history lines in insertion order.
    pub messages: Vec<String>,
    pub created_at: String,
}

impl Conversation {
    pub fn new(user: UserId, channel: ChannelId, first_line: String) -> Self {
        Self {
            user,
            channel,
            messages: vec![first_line],
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

// --- Platform requests and lookups ---

/// Parameters for creating a staff-only relay channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayChannelSpec {
    pub name: String,
    pub category: ChannelId,
    /// Role granted view and send permissions; everyone else is denied view.
    pub staff_role: Option<String>,
}

/// A user looked up on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub tag: String,
    pub avatar_url: Option<String>,
}

/// A rich summary message (embed) with an optional link button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub author_name: String,
    pub author_icon: Option<String>,
    pub color: u32,
    pub description: String,
    pub link: Option<NoticeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeLink {
    pub label: String,
    pub url: String,
}

/// A message fetched from a channel's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Display metadata for the channel a transcript is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMeta {
    pub guild_name: String,
    pub guild_icon_url: Option<String>,
    pub channel_name: String,
}

/// A text blob to publish on the paste-hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRequest {
    pub name: String,
    pub content: String,
    /// Syntax-highlighting label, e.g. `AsciiDoc`.
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(origin: MessageOrigin) -> InboundMessage {
        InboundMessage {
            id: MessageId("m1".into()),
            author: Author {
                id: UserId::from("u1"),
                tag: "alice".into(),
                avatar_url: None,
            },
            channel: ChannelId::from("c1"),
            origin,
            content: "hi".into(),
            attachments: vec![],
        }
    }

    #[test]
    fn origin_classification() {
        let dm = inbound(MessageOrigin::Direct);
        assert!(dm.is_direct());
        assert!(!dm.is_under(&ChannelId::from("cat")));

        let staff = inbound(MessageOrigin::Guild {
            parent: Some(ChannelId::from("cat")),
        });
        assert!(!staff.is_direct());
        assert!(staff.is_under(&ChannelId::from("cat")));
        assert!(!staff.is_under(&ChannelId::from("other")));

        let loose = inbound(MessageOrigin::Guild { parent: None });
        assert!(!loose.is_under(&ChannelId::from("cat")));
    }

    #[test]
    fn attachment_link_falls_back_to_proxy() {
        let direct = Attachment {
            url: "https://cdn/a.png".into(),
            proxy_url: Some("https://proxy/a.png".into()),
        };
        assert_eq!(direct.link(), "https://cdn/a.png");

        let proxied = Attachment {
            url: String::new(),
            proxy_url: Some("https://proxy/a.png".into()),
        };
        assert_eq!(proxied.link(), "https://proxy/a.png");
    }

    #[test]
    fn new_conversation_holds_first_line() {
        let c = Conversation::new(UserId::from("u"), ChannelId::from("c"), "u :: hi".into());
        assert_eq!(c.messages, vec!["u :: hi".to_string()]);
        assert!(!c.created_at.is_empty());
    }

    #[test]
    fn ids_display_raw_value() {
        assert_eq!(UserId::from("42").to_string(), "42");
        assert_eq!(ChannelId::from("99").to_string(), "99");
    }
}
