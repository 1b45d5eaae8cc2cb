// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the hierarchy `./charla.toml` > `~/.config/charla/charla.toml` >
//! `/etc/charla/charla.toml` with environment variable overrides via the
//! `CHARLA_` prefix, plus the bare legacy variable names (`PORT`,
//! `CHATWOOT_URL`, `CHATWOOT_ID`, `CHATWOOT_INBOX_ID`,
//! `CHATWOOT_API_ACCESS_TOKEN`).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CharlaConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/charla/charla.toml` (system-wide)
/// 3. `~/.config/charla/charla.toml` (user XDG config)
/// 4. `./charla.toml` (local directory)
/// 5. `CHARLA_*` environment variables
/// 6. Bare legacy environment variables
pub fn load_config() -> Result<CharlaConfig, figment::Error> {
    base_figment().extract()
}

/// Load configuration from a TOML string only (no file hierarchy, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CharlaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CharlaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CharlaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CharlaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(legacy_env_provider())
        .extract()
}

fn base_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CharlaConfig::default()))
        .merge(Toml::file("/etc/charla/charla.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("charla/charla.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("charla.toml"))
        .merge(env_provider())
        .merge(legacy_env_provider())
}

/// `CHARLA_` prefixed variables, mapped section-first.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscore-bearing
/// key names survive: `CHARLA_CHATWOOT_API_ACCESS_TOKEN` must map to
/// `chatwoot.api_access_token`, not `chatwoot.api.access.token`.
fn env_provider() -> Env {
    Env::prefixed("CHARLA_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("chatwoot_", "chatwoot.", 1)
            .into()
    })
}

/// The bare variable names recognized for compatibility with existing
/// deployments: `PORT`, `CHATWOOT_URL`, `CHATWOOT_ID`, `CHATWOOT_INBOX_ID`,
/// `CHATWOOT_API_ACCESS_TOKEN`.
fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&[
            "PORT",
            "CHATWOOT_URL",
            "CHATWOOT_ID",
            "CHATWOOT_INBOX_ID",
            "CHATWOOT_API_ACCESS_TOKEN",
        ])
        .map(|key| {
            let lowered = key.as_str().to_ascii_lowercase();
            match lowered.as_str() {
                "port" => "server.port".into(),
                "chatwoot_url" => "chatwoot.url".into(),
                "chatwoot_id" => "chatwoot.account_id".into(),
                "chatwoot_inbox_id" => "chatwoot.inbox_id".into(),
                "chatwoot_api_access_token" => "chatwoot.api_access_token".into(),
                _ => lowered.into(),
            }
        })
}
