// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `charla serve` command implementation.
//!
//! Wires the chat provider, the Chatwoot client/resolver, the suppression
//! set, and the webhook server into one running bridge. The bundled provider
//! is the console one; a production deployment swaps in a real chat-network
//! provider behind the same trait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use charla_bridge::{Bridge, MemoryBlacklist, ServerConfig, start_server};
use charla_chatwoot::{ChatwootClient, ChatwootSettings, ConversationResolver};
use charla_config::model::CharlaConfig;
use charla_core::error::CharlaError;
use charla_core::traits::{ChatProvider, ProviderEvent};

use crate::console::ConsoleProvider;

pub async fn run_serve(config: CharlaConfig) -> Result<(), CharlaError> {
    init_tracing();

    let client = ChatwootClient::new(chatwoot_settings(&config)?)?;
    // Attribute schema bootstrap is best-effort; failures are logged inside.
    client.ensure_bot_attribute().await;

    let resolver = Arc::new(ConversationResolver::new(client));
    let (events_tx, events_rx) = mpsc::unbounded_channel::<ProviderEvent>();
    let provider: Arc<dyn ChatProvider> = Arc::new(ConsoleProvider::new());
    let bridge = Arc::new(Bridge::new(
        provider,
        resolver,
        Arc::new(MemoryBlacklist::new()),
    ));

    crate::console::spawn_stdin_loop(events_tx.clone());
    let _ = events_tx.send(ProviderEvent::Ready);

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    info!(
        host = %server_config.host,
        port = server_config.port,
        "starting charla bridge"
    );

    let bridge_loop = Arc::clone(&bridge).run(events_rx);
    tokio::select! {
        result = start_server(&server_config, bridge) => result,
        _ = bridge_loop => Ok(()),
    }
}

fn chatwoot_settings(config: &CharlaConfig) -> Result<ChatwootSettings, CharlaError> {
    let chatwoot = &config.chatwoot;
    let require = |field: &str| CharlaError::Config(format!("chatwoot.{field} is required"));
    Ok(ChatwootSettings {
        url: chatwoot.url.clone().ok_or_else(|| require("url"))?,
        account_id: chatwoot.account_id.ok_or_else(|| require("account_id"))?,
        inbox_id: chatwoot.inbox_id.ok_or_else(|| require("inbox_id"))?,
        api_access_token: chatwoot
            .api_access_token
            .clone()
            .ok_or_else(|| require("api_access_token"))?,
        request_interval: Duration::from_millis(chatwoot.request_interval_ms),
    })
}

/// Initializes the tracing subscriber, honoring `RUST_LOG` when set.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("charla=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
