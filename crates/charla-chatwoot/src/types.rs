// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire models for the Chatwoot account API surface this bridge consumes.

use charla_core::types::BOT_ATTRIBUTE_KEY;
use serde::{Deserialize, Serialize};

/// Response of `GET /contacts/search`.
#[derive(Debug, Deserialize)]
pub struct ContactSearchResponse {
    #[serde(default)]
    pub payload: Vec<ContactRecord>,
}

/// A contact as returned by search and create endpoints.
#[derive(Debug, Deserialize)]
pub struct ContactRecord {
    pub id: i64,
    #[serde(default)]
    pub custom_attributes: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /contacts`.
#[derive(Debug, Deserialize)]
pub struct ContactCreateResponse {
    pub payload: ContactCreatePayload,
}

#[derive(Debug, Deserialize)]
pub struct ContactCreatePayload {
    pub contact: ContactRecord,
}

/// Response of `GET /contacts/{id}/conversations`.
///
/// Chatwoot nests the per-conversation records inside `payload[0].messages`.
#[derive(Debug, Deserialize)]
pub struct ConversationListResponse {
    #[serde(default)]
    pub payload: Vec<ConversationGroup>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationGroup {
    #[serde(default)]
    pub messages: Vec<ConversationRef>,
}

/// One conversation reference, scoped to an inbox.
#[derive(Debug, Deserialize)]
pub struct ConversationRef {
    pub conversation_id: i64,
    pub inbox_id: i64,
}

/// Response of `POST /conversations`.
#[derive(Debug, Deserialize)]
pub struct ConversationCreateResponse {
    pub id: i64,
}

/// Receipt for a created message.
#[derive(Debug, Deserialize)]
pub struct MessageReceipt {
    pub id: i64,
}

/// A custom attribute schema record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute_display_name: String,
    /// Display type: 6 = list.
    pub attribute_display_type: u8,
    pub attribute_description: String,
    pub attribute_key: String,
    pub attribute_values: Vec<String>,
    /// Model: 1 = contact.
    pub attribute_model: u8,
}

impl AttributeDefinition {
    /// The per-contact bot-enable toggle, created once per account at bootstrap.
    pub fn bot_toggle() -> Self {
        Self {
            attribute_display_name: "Funciones del Bot".to_string(),
            attribute_display_type: 6,
            attribute_description: "Desactiva el chatbot a un cliente".to_string(),
            attribute_key: BOT_ATTRIBUTE_KEY.to_string(),
            attribute_values: vec!["ON".to_string(), "OFF".to_string()],
            attribute_model: 1,
        }
    }
}

/// A record from `GET /custom_attribute_definitions`; only the key matters
/// for the existence check.
#[derive(Debug, Deserialize)]
pub struct AttributeDefinitionRecord {
    pub attribute_key: String,
}
