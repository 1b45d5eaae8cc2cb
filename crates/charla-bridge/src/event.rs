// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed model of Chatwoot webhook payloads.
//!
//! The payload is decoded once at the HTTP boundary; everything downstream
//! works on this struct instead of probing loose JSON. Every field defaults,
//! because Chatwoot event shapes vary widely by event type and the bridge
//! must degrade to a no-op on anything it does not recognize.

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use charla_core::types::{AttachmentKind, BOT_ATTRIBUTE_KEY, ChatIdentity, SENTINEL_NUMBER};

/// One Chatwoot webhook event body. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    pub event: String,
    pub content_type: Option<String>,
    pub content: Option<String>,
    pub message_type: Option<String>,
    pub private: bool,
    /// Top-level phone number, present on `contact_updated` events.
    pub phone_number: Option<String>,
    pub custom_attributes: serde_json::Map<String, Value>,
    pub sender: Option<WebhookSender>,
    pub conversation: Option<WebhookConversation>,
    pub attachments: Vec<WebhookAttachment>,
    pub content_attributes: WebhookContentAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookContentAttributes {
    pub submitted_values: WebhookSubmittedValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSubmittedValues {
    /// Present once a CSAT survey has been answered.
    pub csat_survey_response: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSender {
    pub phone_number: Option<String>,
    pub custom_attributes: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConversation {
    /// Channel class name, e.g. `Channel::Api`.
    pub channel: Option<String>,
    pub meta: WebhookConversationMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConversationMeta {
    pub sender: Option<WebhookSender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookAttachment {
    pub data_url: Option<String>,
    pub file_type: Option<String>,
}

impl WebhookAttachment {
    /// Declared attachment kind, defaulting to a generic file.
    pub fn kind(&self) -> AttachmentKind {
        self.file_type
            .as_deref()
            .and_then(|s| AttachmentKind::from_str(s).ok())
            .unwrap_or(AttachmentKind::File)
    }
}

/// Closed classification of webhook events the bridge reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    MessageCreated,
    ContactUpdated,
    CsatInput,
    Other,
}

/// Requested state of the per-contact bot toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotToggle {
    On,
    Off,
}

impl WebhookPayload {
    pub fn kind(&self) -> WebhookKind {
        if self.content_type.as_deref() == Some("input_csat") {
            return WebhookKind::CsatInput;
        }
        match self.event.as_str() {
            "message_created" => WebhookKind::MessageCreated,
            "contact_updated" => WebhookKind::ContactUpdated,
            _ => WebhookKind::Other,
        }
    }

    /// True once the CSAT survey carried by this event has been answered.
    ///
    /// Chatwoot nests the response under
    /// `content_attributes.submitted_values.csat_survey_response`.
    pub fn csat_answered(&self) -> bool {
        self.content_attributes
            .submitted_values
            .csat_survey_response
            .is_some()
    }

    /// The end-user identity this event concerns, where one can be found.
    pub fn sender_identity(&self) -> Option<ChatIdentity> {
        self.meta_sender_phone()
            .or_else(|| self.sender.as_ref().and_then(|s| s.phone_number.as_deref()))
            .or(self.phone_number.as_deref())
            .map(ChatIdentity::normalize)
    }

    /// True when the event concerns the bridge's own operational identity.
    ///
    /// Only the conversation-meta sender counts. A sentinel phone number in
    /// other positions, such as the top level of a `contact_updated` event,
    /// must still reach the toggle handling.
    pub fn is_sentinel(&self) -> bool {
        self.meta_sender_phone()
            .map(ChatIdentity::normalize)
            .is_some_and(|identity| identity.as_str() == SENTINEL_NUMBER)
    }

    /// Resolves the bot toggle carried by this event, if any.
    ///
    /// Ordered extraction strategies; the first one yielding a value wins:
    /// event-level custom attributes, then the sender's, then the
    /// conversation-meta sender's.
    pub fn toggle_value(&self) -> Option<BotToggle> {
        let strategies: [fn(&Self) -> Option<&Value>; 3] = [
            Self::event_attribute,
            Self::sender_attribute,
            Self::meta_sender_attribute,
        ];
        let value = strategies.iter().find_map(|strategy| strategy(self))?;
        match value.as_str() {
            Some("ON") => Some(BotToggle::On),
            Some("OFF") => Some(BotToggle::Off),
            _ => None,
        }
    }

    /// The identity the toggle applies to.
    ///
    /// Only a `contact_updated` event carrying a top-level phone number
    /// yields a usable identity; every other event shape yields the empty
    /// identity and the toggle effectively targets nobody. Longstanding
    /// behavior, kept as-is.
    pub fn toggle_identity(&self) -> ChatIdentity {
        if self.event == "contact_updated" {
            if let Some(phone) = &self.phone_number {
                return ChatIdentity::normalize(phone);
            }
        }
        ChatIdentity::normalize("")
    }

    fn event_attribute(&self) -> Option<&Value> {
        self.custom_attributes.get(BOT_ATTRIBUTE_KEY)
    }

    fn sender_attribute(&self) -> Option<&Value> {
        self.sender
            .as_ref()
            .and_then(|s| s.custom_attributes.get(BOT_ATTRIBUTE_KEY))
    }

    fn meta_sender_attribute(&self) -> Option<&Value> {
        self.conversation
            .as_ref()
            .and_then(|c| c.meta.sender.as_ref())
            .and_then(|s| s.custom_attributes.get(BOT_ATTRIBUTE_KEY))
    }

    fn meta_sender_phone(&self) -> Option<&str> {
        self.conversation
            .as_ref()
            .and_then(|c| c.meta.sender.as_ref())
            .and_then(|s| s.phone_number.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn classifies_known_events() {
        assert_eq!(
            decode(serde_json::json!({"event": "message_created"})).kind(),
            WebhookKind::MessageCreated
        );
        assert_eq!(
            decode(serde_json::json!({"event": "contact_updated"})).kind(),
            WebhookKind::ContactUpdated
        );
        assert_eq!(
            decode(serde_json::json!({"event": "conversation_status_changed"})).kind(),
            WebhookKind::Other
        );
    }

    #[test]
    fn csat_content_type_wins_over_event_name() {
        let payload = decode(serde_json::json!({
            "event": "message_created",
            "content_type": "input_csat",
        }));
        assert_eq!(payload.kind(), WebhookKind::CsatInput);
    }

    #[test]
    fn csat_answer_is_read_from_content_attributes() {
        let answered = decode(serde_json::json!({
            "event": "message_created",
            "content_type": "input_csat",
            "content_attributes": {
                "submitted_values": {
                    "csat_survey_response": {"rating": 5}
                }
            },
        }));
        assert!(answered.csat_answered());

        let pending = decode(serde_json::json!({
            "event": "message_created",
            "content_type": "input_csat",
            "content_attributes": {"submitted_values": {}},
        }));
        assert!(!pending.csat_answered());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let payload = decode(serde_json::json!({
            "event": "message_created",
            "account": {"id": 1},
            "inbox": {"id": 7},
            "extra_future_field": true,
        }));
        assert_eq!(payload.kind(), WebhookKind::MessageCreated);
    }

    #[test]
    fn toggle_prefers_event_attributes_over_sender() {
        let payload = decode(serde_json::json!({
            "event": "contact_updated",
            "custom_attributes": {"funciones_del_bot": "OFF"},
            "sender": {"custom_attributes": {"funciones_del_bot": "ON"}},
        }));
        assert_eq!(payload.toggle_value(), Some(BotToggle::Off));
    }

    #[test]
    fn toggle_falls_back_to_conversation_meta_sender() {
        let payload = decode(serde_json::json!({
            "event": "message_created",
            "conversation": {
                "meta": {"sender": {"custom_attributes": {"funciones_del_bot": "ON"}}}
            },
        }));
        assert_eq!(payload.toggle_value(), Some(BotToggle::On));
    }

    #[test]
    fn unrecognized_toggle_values_are_ignored() {
        let payload = decode(serde_json::json!({
            "event": "contact_updated",
            "custom_attributes": {"funciones_del_bot": "maybe"},
        }));
        assert_eq!(payload.toggle_value(), None);
    }

    #[test]
    fn toggle_identity_requires_contact_updated_with_phone() {
        let updated = decode(serde_json::json!({
            "event": "contact_updated",
            "phone_number": "+593111111111",
        }));
        assert_eq!(updated.toggle_identity().as_str(), "593111111111");

        // Any other shape yields the empty identity, even when the toggle
        // value itself is resolvable through conversation meta.
        let created = decode(serde_json::json!({
            "event": "message_created",
            "conversation": {
                "meta": {"sender": {
                    "phone_number": "+593111111111",
                    "custom_attributes": {"funciones_del_bot": "OFF"},
                }}
            },
        }));
        assert!(created.toggle_identity().is_empty());
    }

    #[test]
    fn sender_identity_prefers_conversation_meta() {
        let payload = decode(serde_json::json!({
            "event": "message_created",
            "phone_number": "+111",
            "sender": {"phone_number": "+222"},
            "conversation": {"meta": {"sender": {"phone_number": "+333"}}},
        }));
        assert_eq!(payload.sender_identity().unwrap().as_str(), "333");
    }

    #[test]
    fn sentinel_detection_normalizes_the_plus_prefix() {
        let payload = decode(serde_json::json!({
            "event": "message_created",
            "conversation": {"meta": {"sender": {"phone_number": "+593999999999"}}},
        }));
        assert!(payload.is_sentinel());
    }

    #[test]
    fn sentinel_phone_outside_conversation_meta_is_not_suppressed() {
        let payload = decode(serde_json::json!({
            "event": "contact_updated",
            "phone_number": "+593999999999",
            "custom_attributes": {"funciones_del_bot": "OFF"},
        }));
        assert!(!payload.is_sentinel());
        assert_eq!(payload.toggle_value(), Some(BotToggle::Off));
    }

    #[test]
    fn attachment_kind_defaults_to_file() {
        let attachment = WebhookAttachment {
            data_url: Some("https://crm.example.com/a".into()),
            file_type: Some("image".into()),
        };
        assert_eq!(attachment.kind(), AttachmentKind::Image);
        let unknown = WebhookAttachment {
            data_url: None,
            file_type: Some("hologram".into()),
        };
        assert_eq!(unknown.kind(), AttachmentKind::File);
    }
}
