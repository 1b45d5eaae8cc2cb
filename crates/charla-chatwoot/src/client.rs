// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Chatwoot account API.
//!
//! Every call is routed through one serialized task queue (concurrency 1,
//! fixed inter-request interval) shared by all callers, so the outbound call
//! rate never exceeds one request per interval no matter how many chat
//! events fire concurrently. Failures reject the calling future with the
//! endpoint attached; no call site retries automatically.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use charla_core::error::CharlaError;
use charla_core::queue::SerialQueue;
use charla_core::types::{BOT_ATTRIBUTE_KEY, ChatIdentity, MessageDirection};

use crate::media::AttachmentPart;
use crate::types::{
    AttributeDefinition, AttributeDefinitionRecord, ContactCreateResponse, ContactSearchResponse,
    ConversationCreateResponse, ConversationListResponse, MessageReceipt,
};

/// Upper bound on a single Chatwoot request. A hung call would otherwise
/// stall the request queue indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for one Chatwoot account.
#[derive(Debug, Clone)]
pub struct ChatwootSettings {
    /// Base URL up to but excluding the account id.
    pub url: String,
    pub account_id: i64,
    pub inbox_id: i64,
    pub api_access_token: String,
    /// Minimum delay between consecutive API calls.
    pub request_interval: Duration,
}

/// Rate-limited client for the Chatwoot REST surface.
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    http: reqwest::Client,
    queue: SerialQueue,
    url: String,
    account_id: i64,
    inbox_id: i64,
}

impl ChatwootClient {
    /// Builds the client and spawns its request-queue worker.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(settings: ChatwootSettings) -> Result<Self, CharlaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "api_access_token",
            HeaderValue::from_str(&settings.api_access_token)
                .map_err(|e| CharlaError::Config(format!("invalid api_access_token: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CharlaError::Chatwoot {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            queue: SerialQueue::new("chatwoot-requests", settings.request_interval),
            url: settings.url.trim_end_matches('/').to_string(),
            account_id: settings.account_id,
            inbox_id: settings.inbox_id,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}{path}", self.url, self.account_id)
    }

    /// The configured inbox id.
    pub fn inbox_id(&self) -> i64 {
        self.inbox_id
    }

    /// Runs one request through the serialized queue and returns the parsed
    /// JSON body.
    async fn dispatch(
        &self,
        endpoint: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, CharlaError> {
        let endpoint = endpoint.to_string();
        debug!(endpoint = %endpoint, "enqueueing chatwoot request");
        self.queue
            .run(async move {
                let response = builder
                    .send()
                    .await
                    .map_err(|e| CharlaError::chatwoot(&endpoint, e))?;
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .map_err(|e| CharlaError::chatwoot(&endpoint, e))?;

                if !status.is_success() {
                    return Err(CharlaError::Chatwoot {
                        message: format!("{endpoint} returned {status}: {body}"),
                        source: None,
                    });
                }
                if body.is_empty() {
                    return Ok(serde_json::Value::Null);
                }
                serde_json::from_str(&body).map_err(|e| CharlaError::chatwoot(&endpoint, e))
            })
            .await?
    }

    fn parse<T: DeserializeOwned>(
        endpoint: &str,
        value: serde_json::Value,
    ) -> Result<T, CharlaError> {
        serde_json::from_value(value).map_err(|e| CharlaError::Chatwoot {
            message: format!("unexpected payload shape from {endpoint}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Searches contacts by `+identity` and returns the first match's id.
    ///
    /// Zero matches is a normal outcome, never an error.
    pub async fn find_contact_id(
        &self,
        identity: &ChatIdentity,
    ) -> Result<Option<i64>, CharlaError> {
        let endpoint = "/contacts/search";
        let builder = self
            .http
            .get(self.url_for(endpoint))
            .query(&[("q", identity.with_plus())]);
        let value = self.dispatch(endpoint, builder).await?;
        let parsed: ContactSearchResponse = Self::parse(endpoint, value)?;
        Ok(parsed.payload.first().map(|contact| contact.id))
    }

    /// Creates a contact on the configured inbox. The stored phone number is
    /// always `+`-prefixed.
    pub async fn create_contact(
        &self,
        name: &str,
        identity: &ChatIdentity,
    ) -> Result<i64, CharlaError> {
        let endpoint = "/contacts";
        let builder = self.http.post(self.url_for(endpoint)).json(&json!({
            "inbox_id": self.inbox_id,
            "name": name,
            "phone_number": identity.with_plus(),
        }));
        let value = self.dispatch(endpoint, builder).await?;
        let parsed: ContactCreateResponse = Self::parse(endpoint, value)?;
        Ok(parsed.payload.contact.id)
    }

    /// Sets one custom attribute on the contact resolved via [`Self::find_contact_id`].
    pub async fn set_custom_attribute(
        &self,
        identity: &ChatIdentity,
        key: &str,
        value: &str,
    ) -> Result<(), CharlaError> {
        let contact_id = self
            .find_contact_id(identity)
            .await?
            .ok_or_else(|| CharlaError::Chatwoot {
                message: format!("no contact found for {identity} while setting `{key}`"),
                source: None,
            })?;
        let endpoint = format!("/contacts/{contact_id}");
        let builder = self.http.put(self.url_for(&endpoint)).json(&json!({
            "custom_attributes": { key: value },
        }));
        self.dispatch(&endpoint, builder).await?;
        Ok(())
    }

    /// True when the contact exists and carries a non-null value for `key`.
    pub async fn has_custom_attribute(
        &self,
        identity: &ChatIdentity,
        key: &str,
    ) -> Result<bool, CharlaError> {
        let endpoint = "/contacts/search";
        let builder = self
            .http
            .get(self.url_for(endpoint))
            .query(&[("q", identity.with_plus())]);
        let value = self.dispatch(endpoint, builder).await?;
        let parsed: ContactSearchResponse = Self::parse(endpoint, value)?;
        Ok(parsed
            .payload
            .first()
            .and_then(|contact| contact.custom_attributes.get(key))
            .is_some_and(|v| !v.is_null()))
    }

    /// True when the account already declares the attribute schema `key`.
    pub async fn attribute_definition_exists(&self, key: &str) -> Result<bool, CharlaError> {
        let endpoint = "/custom_attribute_definitions";
        let builder = self.http.get(self.url_for(endpoint));
        let value = self.dispatch(endpoint, builder).await?;
        let parsed: Vec<AttributeDefinitionRecord> = Self::parse(endpoint, value)?;
        Ok(parsed.iter().any(|record| record.attribute_key == key))
    }

    /// Declares a custom attribute schema on the account.
    pub async fn create_attribute_definition(
        &self,
        definition: &AttributeDefinition,
    ) -> Result<(), CharlaError> {
        let endpoint = "/custom_attribute_definitions";
        let builder = self.http.post(self.url_for(endpoint)).json(definition);
        self.dispatch(endpoint, builder).await?;
        Ok(())
    }

    /// Idempotent bootstrap of the bot-enable attribute schema.
    ///
    /// Errors are logged, not fatal: toggle checks default to "enabled" when
    /// the attribute is absent, so the bridge keeps operating.
    pub async fn ensure_bot_attribute(&self) {
        match self.attribute_definition_exists(BOT_ATTRIBUTE_KEY).await {
            Ok(true) => debug!("bot attribute definition already present"),
            Ok(false) => {
                if let Err(error) = self
                    .create_attribute_definition(&AttributeDefinition::bot_toggle())
                    .await
                {
                    warn!(%error, "could not create bot attribute definition");
                }
            }
            Err(error) => {
                warn!(%error, "could not verify bot attribute definition");
            }
        }
    }

    /// Lists the contact's conversations and picks the one in the configured
    /// inbox.
    ///
    /// Conversations existing in other inboxes but none in the configured one
    /// is a configuration error, reported rather than silently ignored.
    pub async fn find_conversation_id(&self, contact_id: i64) -> Result<Option<i64>, CharlaError> {
        let endpoint = format!("/contacts/{contact_id}/conversations");
        let builder = self.http.get(self.url_for(&endpoint));
        let value = self.dispatch(&endpoint, builder).await?;
        let parsed: ConversationListResponse = Self::parse(&endpoint, value)?;

        let conversations = parsed
            .payload
            .first()
            .map(|group| group.messages.as_slice())
            .unwrap_or_default();
        if conversations.is_empty() {
            return Ok(None);
        }
        match conversations
            .iter()
            .find(|conversation| conversation.inbox_id == self.inbox_id)
        {
            Some(conversation) => Ok(Some(conversation.conversation_id)),
            None => Err(CharlaError::Config(format!(
                "contact {contact_id} has conversations but none in inbox {}; check chatwoot.inbox_id",
                self.inbox_id
            ))),
        }
    }

    /// Creates a conversation for the contact, tagged with a deterministic
    /// source id and assigned to the account's default assignee.
    pub async fn create_conversation(
        &self,
        source_id: &str,
        contact_id: i64,
    ) -> Result<i64, CharlaError> {
        let endpoint = "/conversations";
        let builder = self.http.post(self.url_for(endpoint)).json(&json!({
            "source_id": source_id,
            "inbox_id": self.inbox_id,
            "contact_id": contact_id,
            "status": "open",
            "assignee_id": self.account_id,
        }));
        let value = self.dispatch(endpoint, builder).await?;
        let parsed: ConversationCreateResponse = Self::parse(endpoint, value)?;
        Ok(parsed.id)
    }

    /// Posts a plain message into a conversation.
    pub async fn create_message(
        &self,
        conversation_id: i64,
        content: &str,
        direction: MessageDirection,
        is_private: bool,
    ) -> Result<MessageReceipt, CharlaError> {
        let endpoint = format!("/conversations/{conversation_id}/messages");
        let builder = self.http.post(self.url_for(&endpoint)).json(&json!({
            "content": content,
            "message_type": direction.to_string(),
            "private": is_private,
        }));
        let value = self.dispatch(&endpoint, builder).await?;
        Self::parse(&endpoint, value)
    }

    /// Posts a multipart message carrying attachments. Content is optional
    /// when only media is sent.
    pub async fn create_message_with_attachments(
        &self,
        conversation_id: i64,
        content: Option<&str>,
        attachments: Vec<AttachmentPart>,
        direction: MessageDirection,
        is_private: bool,
        sender_name: Option<&str>,
    ) -> Result<MessageReceipt, CharlaError> {
        let endpoint = format!("/conversations/{conversation_id}/messages");

        let mut form = reqwest::multipart::Form::new()
            .text("message_type", direction.to_string())
            .text("private", is_private.to_string());
        if let Some(content) = content {
            form = form.text("content", content.to_string());
        }
        if let Some(name) = sender_name {
            form = form.text("name", name.to_string());
        }
        for attachment in attachments {
            let mut part = reqwest::multipart::Part::bytes(attachment.bytes)
                .file_name(attachment.file_name.clone());
            if let Some(mime) = &attachment.mime_type {
                part = part.mime_str(mime).map_err(|e| CharlaError::Media {
                    message: format!(
                        "invalid mime type `{mime}` for attachment {}: {e}",
                        attachment.file_name
                    ),
                    source: Some(Box::new(e)),
                })?;
            }
            form = form.part("attachments[]", part);
        }

        let builder = self.http.post(self.url_for(&endpoint)).multipart(form);
        let value = self.dispatch(&endpoint, builder).await?;
        Self::parse(&endpoint, value)
    }
}
