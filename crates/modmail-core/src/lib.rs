// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the modmail bot.
//!
//! This crate provides the error type, the shared domain types, and the
//! collaborator traits (chat platform, conversation store, paste host) that
//! the relay is written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ModmailError;
pub use types::{AdapterType, ChannelId, Conversation, HealthStatus, MessageId, UserId};

pub use traits::{ChatPlatform, ConversationStore, PasteService, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modmail_error_has_all_variants() {
        let _config = ModmailError::Config("test".into());
        let _storage = ModmailError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = ModmailError::channel("test", std::io::Error::other("test"));
        let _paste = ModmailError::Paste {
            message: "test".into(),
            source: None,
        };
        let _transcript = ModmailError::Transcript {
            message: "test".into(),
            source: None,
        };
        let _internal = ModmailError::Internal("test".into());
    }

    #[test]
    fn error_messages_carry_context() {
        let err = ModmailError::Config("discord.token is required".into());
        assert_eq!(
            err.to_string(),
            "configuration error: discord.token is required"
        );
    }

    #[test]
    fn adapter_type_display_roundtrip() {
        use std::str::FromStr;

        for variant in [AdapterType::Platform, AdapterType::Storage, AdapterType::Paste] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat_platform<T: ChatPlatform>() {}
        fn _assert_conversation_store<T: ConversationStore>() {}
        fn _assert_paste_service<T: PasteService>() {}
    }
}
