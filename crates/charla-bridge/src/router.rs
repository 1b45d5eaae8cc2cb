// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook router: one state machine pass per Chatwoot event.
//!
//! Branch order matters: sentinel suppression, CSAT, toggle, agent relay.
//! The router never returns an error; relay failures are logged inside the
//! queued tasks and the webhook is acknowledged regardless.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::event::{WebhookKind, WebhookPayload};
use crate::orchestrator::Bridge;

/// Routes one decoded webhook payload.
pub async fn route(bridge: Arc<Bridge>, payload: WebhookPayload) {
    if payload.is_sentinel() {
        debug!("sentinel event suppressed");
        return;
    }

    if payload.kind() == WebhookKind::CsatInput {
        handle_csat(&bridge, &payload).await;
        return;
    }

    // The toggle branch runs for every non-CSAT event carrying a value,
    // even when the derived identity is empty (see event::toggle_identity).
    if let Some(toggle) = payload.toggle_value() {
        let identity = payload.toggle_identity();
        bridge.apply_toggle(&identity, toggle).await;
    }

    if payload.kind() == WebhookKind::MessageCreated {
        bridge.enqueue_agent_relay(payload);
    }
}

/// Forwards the CSAT prompt directly through the provider, bypassing the
/// CRM message pipeline. A payload already carrying a survey response is
/// only acknowledged.
async fn handle_csat(bridge: &Arc<Bridge>, payload: &WebhookPayload) {
    if payload.csat_answered() {
        debug!("csat survey already answered");
        return;
    }
    let Some(identity) = payload.sender_identity() else {
        debug!("csat prompt without recipient, skipping");
        return;
    };
    let Some(content) = payload.content.as_deref() else {
        debug!(%identity, "csat prompt without content, skipping");
        return;
    };
    if let Err(error) = bridge.provider().send_text(&identity, content).await {
        warn!(%error, %identity, "csat prompt delivery failed");
    }
}
