// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across the Charla workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reserved identity for the bridge's own operational messages (pairing
/// prompts, readiness announcements). Never relayed like a normal contact.
pub const SENTINEL_NUMBER: &str = "593999999999";

/// Chatwoot custom attribute key gating whether the bot auto-responds to a contact.
pub const BOT_ATTRIBUTE_KEY: &str = "funciones_del_bot";

/// Marker embedded in provider-native message bodies that must reach
/// Chatwoot as structured attachment data rather than raw text.
pub const EVENT_MARKER: &str = "_event_";

/// Channel identifier Chatwoot reports for conversations owned by this
/// bridge's API inbox. Agent replies on any other channel were already
/// delivered natively and must not be re-forwarded.
pub const API_CHANNEL_MARKER: &str = "Channel::Api";

/// A normalized chat-network address: a bare phone-number-like string with
/// no leading `+`. The network suffix is appended only inside provider
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatIdentity(String);

impl ChatIdentity {
    /// Normalizes a raw address into a `ChatIdentity`, stripping a leading `+`.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().trim_start_matches('+').to_string())
    }

    /// The bare identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identity produced by toggle derivation on
    /// non-`contact_updated` events.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The identity prefixed with `+`, as Chatwoot stores phone numbers.
    pub fn with_plus(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for ChatIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-native media carried inline with an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMedia {
    /// Declared MIME type (e.g. `image/jpeg`).
    pub mime_type: String,
    /// Explicit file name, when the provider supplies one.
    pub file_name: Option<String>,
    /// Caption text attached to the media.
    pub caption: Option<String>,
}

/// A reference to media that must be bridged into a Chatwoot attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaReference {
    /// An `http(s)` URL to stream-download.
    RemoteUrl(String),
    /// An existing local file path.
    LocalPath(PathBuf),
    /// A provider-native buffer persisted via the provider's file-save capability.
    Inline(InlineMedia),
}

/// An inbound message received from the chat network.
#[derive(Debug, Clone)]
pub struct InboundChatMessage {
    pub from: ChatIdentity,
    pub body: String,
    /// Display name of the sender, used when lazily creating the contact.
    pub sender_name: Option<String>,
    pub media: Option<InlineMedia>,
}

impl InboundChatMessage {
    /// True when the body carries the internal event marker and must be
    /// posted to Chatwoot through the attachment call even with no media.
    pub fn is_event_payload(&self) -> bool {
        self.body.contains(EVENT_MARKER)
    }
}

/// A bot-generated reply flowing out to Chatwoot as an `outgoing` message.
#[derive(Debug, Clone)]
pub struct BotReply {
    pub to: ChatIdentity,
    pub answer: String,
    pub media: Option<MediaReference>,
}

/// Chatwoot message direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Declared file type of a Chatwoot attachment. Informational at the
/// provider boundary: every kind routes through the same media send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    File,
}
