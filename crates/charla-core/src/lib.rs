// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Charla bridge.
//!
//! Provides the error type, domain types, the chat-provider trait seam, and
//! the serialized task queue primitive used by every other Charla crate.

pub mod error;
pub mod queue;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CharlaError;
pub use queue::SerialQueue;
pub use traits::{ChatProvider, ProviderEvent};
pub use types::{
    AttachmentKind, BotReply, ChatIdentity, InboundChatMessage, InlineMedia, MediaReference,
    MessageDirection,
};
