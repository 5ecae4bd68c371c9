// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for modmail integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without Discord, a database file or a paste service.
//!
//! # Components
//!
//! - [`MockPlatform`] - Chat platform that records every outbound call
//! - [`MockPaste`] - Paste service that records uploads
//! - [`MemoryStore`] - In-memory conversation store with failure injection

pub mod memory_store;
pub mod mock_paste;
pub mod mock_platform;

pub use memory_store::MemoryStore;
pub use mock_paste::MockPaste;
pub use mock_platform::{MockPlatform, SentMessage};
