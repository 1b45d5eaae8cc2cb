// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-network provider seam.
//!
//! The chat protocol itself (connection, pairing, message encoding) lives
//! outside this workspace. The bridge consumes it through [`ChatProvider`]
//! for sends and through [`ProviderEvent`] values the provider emits into
//! the orchestrator's event channel.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::CharlaError;
use crate::types::{BotReply, ChatIdentity, InboundChatMessage, InlineMedia};

/// Outbound capabilities of the chat-network provider.
///
/// Implementations own address formatting: the network suffix is appended
/// here and nowhere else.
#[async_trait]
pub trait ChatProvider: Send + Sync + 'static {
    /// Human-readable provider name, used for log context.
    fn name(&self) -> &str;

    /// Sends plain text to a chat identity.
    async fn send_text(&self, to: &ChatIdentity, text: &str) -> Result<(), CharlaError>;

    /// Sends media (by URL or local path) with an optional caption.
    async fn send_media(
        &self,
        to: &ChatIdentity,
        media_url_or_path: &str,
        caption: Option<&str>,
    ) -> Result<(), CharlaError>;

    /// Persists a provider-native media payload and returns its local path.
    async fn save_media(&self, media: &InlineMedia) -> Result<PathBuf, CharlaError>;
}

/// Events the bridge consumes from its collaborators.
///
/// `Message`, `Ready`, and `PairingRequired` originate at the chat-network
/// provider; `BotReply` is raised by the bot's own reply pipeline.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// An end-user message arrived on the chat network.
    Message(InboundChatMessage),
    /// The provider session is established.
    Ready,
    /// The provider needs pairing (QR scan) before it can operate.
    PairingRequired,
    /// The bot generated a reply that must be mirrored to Chatwoot.
    BotReply(BotReply),
}
