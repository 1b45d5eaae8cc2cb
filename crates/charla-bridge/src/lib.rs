// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridge wiring: webhook event model and router, bot suppression set,
//! agent relay, orchestrator, and the webhook HTTP server.

pub mod agent;
pub mod blacklist;
pub mod event;
pub mod orchestrator;
pub mod router;
pub mod server;

pub use blacklist::{BlacklistStore, MemoryBlacklist};
pub use event::{BotToggle, WebhookKind, WebhookPayload};
pub use orchestrator::Bridge;
pub use server::{ServerConfig, start_server, webhook_router};
