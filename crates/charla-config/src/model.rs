// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Charla bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Charla configuration.
///
/// Loaded from TOML files with environment variable overrides. The
/// `[chatwoot]` credentials have no defaults: absence of any is
/// startup-fatal (see `validation`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CharlaConfig {
    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Chatwoot account and credential settings.
    #[serde(default)]
    pub chatwoot: ChatwootConfig,
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the webhook endpoint.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3008
}

/// Chatwoot account configuration. `url`, `account_id`, `inbox_id`, and
/// `api_access_token` are all required.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatwootConfig {
    /// Base URL of the Chatwoot account API (up to but excluding the account id).
    #[serde(default)]
    pub url: Option<String>,

    /// Numeric Chatwoot account id.
    #[serde(default)]
    pub account_id: Option<i64>,

    /// The single inbox this bridge targets.
    #[serde(default)]
    pub inbox_id: Option<i64>,

    /// API access token sent as the `api_access_token` header.
    #[serde(default)]
    pub api_access_token: Option<String>,

    /// Minimum delay between consecutive Chatwoot API calls, in milliseconds.
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
}

impl Default for ChatwootConfig {
    fn default() -> Self {
        Self {
            url: None,
            account_id: None,
            inbox_id: None,
            api_access_token: None,
            request_interval_ms: default_request_interval_ms(),
        }
    }
}

fn default_request_interval_ms() -> u64 {
    200
}
