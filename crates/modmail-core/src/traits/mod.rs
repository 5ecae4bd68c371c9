// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Every external collaborator (chat platform, durable store, paste host)
//! extends the [`PluginAdapter`] base trait and uses `#[async_trait]` for
//! dynamic dispatch compatibility.

pub mod adapter;
pub mod paste;
pub mod platform;
pub mod storage;

pub use adapter::PluginAdapter;
pub use paste::PasteService;
pub use platform::ChatPlatform;
pub use storage::ConversationStore;
