// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot integration: the rate-limited account API client, lazy
//! contact/conversation resolution, and media materialization.

pub mod client;
pub mod media;
pub mod resolver;
pub mod types;

pub use client::{ChatwootClient, ChatwootSettings};
pub use media::{AttachmentPart, ResolvedMedia, resolve_reference};
pub use resolver::ConversationResolver;
