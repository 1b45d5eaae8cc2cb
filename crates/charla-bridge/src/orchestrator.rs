// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bridge orchestrator.
//!
//! One `Bridge` is constructed at startup and passed by handle everywhere;
//! there is no global state. It owns the chat provider, the Chatwoot
//! resolver/client, the suppression set, and the two serialized chat-event
//! queues (inbound messages to the CRM, agent/bot traffic back out).
//! Failures inside queued tasks are logged at the task boundary and the
//! task is dropped; nothing propagates back to event emitters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use charla_core::error::CharlaError;
use charla_core::queue::SerialQueue;
use charla_core::traits::{ChatProvider, ProviderEvent};
use charla_core::types::{
    BotReply, ChatIdentity, InboundChatMessage, MediaReference, MessageDirection, SENTINEL_NUMBER,
};
use charla_chatwoot::media::resolve_reference;
use charla_chatwoot::resolver::ConversationResolver;

use crate::agent;
use crate::blacklist::BlacklistStore;
use crate::event::{BotToggle, WebhookPayload};

/// Delay between consecutive chat-event task starts, per queue.
const EVENT_QUEUE_INTERVAL: Duration = Duration::from_millis(200);
/// Grace period before announcing readiness, so the session settles first.
const READY_DELAY: Duration = Duration::from_secs(3);

/// Display name used for the bridge's own operational contact.
const OPERATOR_NAME: &str = "Chat_BOT";
const READY_MESSAGE: &str = "🔥EL CHATBOT ESTA LISTO PARA INTERACTUAR🔥";
const QR_CAPTION: &str = "Escanea el código QR para iniciar sesión";
const QR_FILE: &str = "bot.qr.png";

/// Process-wide bridge context.
pub struct Bridge {
    provider: Arc<dyn ChatProvider>,
    resolver: Arc<ConversationResolver>,
    blacklist: Arc<dyn BlacklistStore>,
    inbound: SerialQueue,
    outbound: SerialQueue,
    http: reqwest::Client,
    ready_delay: Duration,
}

impl Bridge {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        resolver: Arc<ConversationResolver>,
        blacklist: Arc<dyn BlacklistStore>,
    ) -> Self {
        Self::with_timings(provider, resolver, blacklist, EVENT_QUEUE_INTERVAL, READY_DELAY)
    }

    /// Overrides the queue interval and readiness delay, for tests.
    pub fn with_timings(
        provider: Arc<dyn ChatProvider>,
        resolver: Arc<ConversationResolver>,
        blacklist: Arc<dyn BlacklistStore>,
        event_interval: Duration,
        ready_delay: Duration,
    ) -> Self {
        Self {
            provider,
            resolver,
            blacklist,
            inbound: SerialQueue::new("chat-inbound", event_interval),
            outbound: SerialQueue::new("chat-outbound", event_interval),
            http: reqwest::Client::new(),
            ready_delay,
        }
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    pub fn blacklist(&self) -> &Arc<dyn BlacklistStore> {
        &self.blacklist
    }

    /// Consumes provider events until the channel closes.
    pub async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<ProviderEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        info!("provider event channel closed, bridge loop exiting");
    }

    /// Dispatches one provider event onto the appropriate queue.
    pub fn handle_event(self: &Arc<Self>, event: ProviderEvent) {
        match event {
            ProviderEvent::Message(message) => self.relay_inbound(message),
            ProviderEvent::BotReply(reply) => self.relay_bot_reply(reply),
            ProviderEvent::Ready => self.announce_ready(),
            ProviderEvent::PairingRequired => self.relay_pairing_prompt(),
        }
    }

    /// Enqueues an inbound chat message for delivery to Chatwoot.
    pub fn relay_inbound(self: &Arc<Self>, message: InboundChatMessage) {
        let bridge = Arc::clone(self);
        self.inbound.enqueue(async move {
            let from = message.from.clone();
            if let Err(error) = bridge.deliver_inbound(message).await {
                warn!(%error, %from, "inbound relay failed, message dropped");
            }
        });
    }

    /// Enqueues a bot-generated reply for delivery to Chatwoot.
    pub fn relay_bot_reply(self: &Arc<Self>, reply: BotReply) {
        let bridge = Arc::clone(self);
        self.outbound.enqueue(async move {
            let to = reply.to.clone();
            if let Err(error) = bridge.deliver_bot_reply(reply).await {
                warn!(%error, %to, "bot reply relay failed, message dropped");
            }
        });
    }

    /// Enqueues an agent-relay task for one webhook payload.
    pub fn enqueue_agent_relay(self: &Arc<Self>, payload: WebhookPayload) {
        let provider = Arc::clone(&self.provider);
        self.outbound.enqueue(async move {
            if let Err(error) = agent::relay(provider, payload).await {
                warn!(%error, "agent relay failed, message dropped");
            }
        });
    }

    /// Applies a toggle from the webhook router to the suppression set.
    pub async fn apply_toggle(&self, identity: &ChatIdentity, toggle: BotToggle) {
        match toggle {
            BotToggle::On => {
                if self.blacklist.contains(identity).await {
                    self.blacklist.remove(identity).await;
                    info!(%identity, "bot re-enabled");
                }
            }
            BotToggle::Off => {
                if !self.blacklist.contains(identity).await {
                    self.blacklist.add(identity).await;
                    info!(%identity, "bot disabled, agent takeover");
                }
            }
        }
    }

    /// Announces session readiness on the operational conversation after a
    /// short grace period.
    pub fn announce_ready(self: &Arc<Self>) {
        let bridge = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(bridge.ready_delay).await;
            let inner = Arc::clone(&bridge);
            bridge.inbound.enqueue(async move {
                if let Err(error) = inner.deliver_operational_text(READY_MESSAGE).await {
                    warn!(%error, "could not announce readiness");
                }
            });
        });
    }

    /// Posts the pairing QR image from the working directory onto the
    /// operational conversation so an agent can scan it.
    pub fn relay_pairing_prompt(self: &Arc<Self>) {
        let bridge = Arc::clone(self);
        self.inbound.enqueue(async move {
            if let Err(error) = bridge.deliver_pairing_prompt().await {
                warn!(%error, "could not relay pairing prompt");
            }
        });
    }

    async fn deliver_inbound(&self, message: InboundChatMessage) -> Result<(), CharlaError> {
        let display_name = message
            .sender_name
            .clone()
            .unwrap_or_else(|| message.from.to_string());
        let conversation_id = self.resolver.resolve(&message.from, &display_name).await?;

        if message.media.is_none() && !message.is_event_payload() {
            self.resolver
                .client()
                .create_message(
                    conversation_id,
                    &message.body,
                    MessageDirection::Incoming,
                    false,
                )
                .await?;
            return Ok(());
        }

        // Event-marked bodies go through the attachment call even with no
        // media, so provider-native metadata lands as structured data.
        let mut content = (!message.body.is_empty()).then(|| message.body.clone());
        let mut parts = Vec::new();
        if let Some(media) = &message.media {
            let reference = MediaReference::Inline(media.clone());
            match resolve_reference(&self.http, self.provider.as_ref(), &reference).await {
                Ok(resolved) => {
                    if content.is_none() {
                        content = resolved.caption.clone();
                    }
                    parts.push(resolved.part);
                }
                Err(error) => {
                    warn!(%error, from = %message.from, "skipping undeliverable attachment");
                }
            }
        }
        self.resolver
            .client()
            .create_message_with_attachments(
                conversation_id,
                content.as_deref(),
                parts,
                MessageDirection::Incoming,
                false,
                message.sender_name.as_deref(),
            )
            .await?;
        Ok(())
    }

    async fn deliver_bot_reply(&self, reply: BotReply) -> Result<(), CharlaError> {
        let conversation_id = self
            .resolver
            .resolve(&reply.to, &reply.to.to_string())
            .await?;

        if let Some(reference) = &reply.media {
            match resolve_reference(&self.http, self.provider.as_ref(), reference).await {
                Ok(resolved) => {
                    let content = if reply.answer.is_empty() {
                        resolved.caption.clone()
                    } else {
                        Some(reply.answer.clone())
                    };
                    self.resolver
                        .client()
                        .create_message_with_attachments(
                            conversation_id,
                            content.as_deref(),
                            vec![resolved.part],
                            MessageDirection::Outgoing,
                            false,
                            None,
                        )
                        .await?;
                    return Ok(());
                }
                Err(error) => {
                    warn!(%error, to = %reply.to, "skipping undeliverable attachment");
                }
            }
        }
        self.resolver
            .client()
            .create_message(
                conversation_id,
                &reply.answer,
                MessageDirection::Outgoing,
                false,
            )
            .await?;
        Ok(())
    }

    async fn deliver_operational_text(&self, text: &str) -> Result<(), CharlaError> {
        let sentinel = ChatIdentity::normalize(SENTINEL_NUMBER);
        let conversation_id = self.resolver.resolve(&sentinel, OPERATOR_NAME).await?;
        self.resolver
            .client()
            .create_message(conversation_id, text, MessageDirection::Incoming, false)
            .await?;
        Ok(())
    }

    async fn deliver_pairing_prompt(&self) -> Result<(), CharlaError> {
        let sentinel = ChatIdentity::normalize(SENTINEL_NUMBER);
        let conversation_id = self.resolver.resolve(&sentinel, OPERATOR_NAME).await?;

        let qr_path = std::env::current_dir()
            .map_err(|e| CharlaError::media("resolving working directory", e))?
            .join(QR_FILE);
        let resolved = resolve_reference(
            &self.http,
            self.provider.as_ref(),
            &MediaReference::LocalPath(qr_path),
        )
        .await?;

        self.resolver
            .client()
            .create_message_with_attachments(
                conversation_id,
                Some(QR_CAPTION),
                vec![resolved.part],
                MessageDirection::Incoming,
                false,
                Some(OPERATOR_NAME),
            )
            .await?;
        Ok(())
    }
}
