// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent reply relay: forwards a human agent's Chatwoot reply out to the
//! chat network.

use std::sync::Arc;

use tracing::debug;

use charla_core::error::CharlaError;
use charla_core::traits::ChatProvider;
use charla_core::types::API_CHANNEL_MARKER;

use crate::event::WebhookPayload;

/// True only for agent replies this bridge must deliver itself.
///
/// Replies on any channel other than the bridge's API inbox were already
/// delivered natively by Chatwoot; re-forwarding those would duplicate them.
pub fn should_relay(payload: &WebhookPayload) -> bool {
    !payload.private
        && payload.event == "message_created"
        && payload.message_type.as_deref() == Some("outgoing")
        && payload
            .conversation
            .as_ref()
            .and_then(|c| c.channel.as_deref())
            .is_some_and(|channel| channel.contains(API_CHANNEL_MARKER))
}

/// Delivers one agent reply, dispatching on its first attachment.
///
/// All attachment kinds route through the provider's media send; the kind is
/// informational at this boundary. With no attachments the content goes out
/// as plain text.
pub async fn relay(
    provider: Arc<dyn ChatProvider>,
    payload: WebhookPayload,
) -> Result<(), CharlaError> {
    if !should_relay(&payload) {
        return Ok(());
    }
    let Some(identity) = payload.sender_identity() else {
        debug!("agent reply has no resolvable recipient, skipping");
        return Ok(());
    };
    let content = payload.content.as_deref().unwrap_or_default();

    match payload.attachments.first() {
        Some(attachment) => match &attachment.data_url {
            Some(data_url) => {
                debug!(%identity, kind = %attachment.kind(), "relaying agent media");
                let caption = (!content.is_empty()).then_some(content);
                provider.send_media(&identity, data_url, caption).await
            }
            None => {
                debug!(%identity, "attachment without data url, relaying text only");
                if content.is_empty() {
                    Ok(())
                } else {
                    provider.send_text(&identity, content).await
                }
            }
        },
        None if content.is_empty() => Ok(()),
        None => provider.send_text(&identity, content).await,
    }
}
