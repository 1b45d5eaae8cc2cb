// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! The bridge must not start against an incomplete Chatwoot configuration:
//! every missing credential is collected and reported (does not fail fast).

use crate::diagnostic::ConfigError;
use crate::model::CharlaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or all collected errors.
pub fn validate_config(config: &CharlaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let required: [(&str, &str, bool); 4] = [
        ("chatwoot.url", "CHATWOOT_URL", config.chatwoot.url.is_none()),
        (
            "chatwoot.account_id",
            "CHATWOOT_ID",
            config.chatwoot.account_id.is_none(),
        ),
        (
            "chatwoot.inbox_id",
            "CHATWOOT_INBOX_ID",
            config.chatwoot.inbox_id.is_none(),
        ),
        (
            "chatwoot.api_access_token",
            "CHATWOOT_API_ACCESS_TOKEN",
            config.chatwoot.api_access_token.is_none(),
        ),
    ];
    for (key, env_hint, missing) in required {
        if missing {
            errors.push(ConfigError::MissingKey {
                key: key.to_string(),
                env_hint: env_hint.to_string(),
            });
        }
    }

    if let Some(url) = &config.chatwoot.url
        && !url.starts_with("http://")
        && !url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!("chatwoot.url `{url}` must start with http:// or https://"),
        });
    }

    if let Some(token) = &config.chatwoot.api_access_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "chatwoot.api_access_token must not be empty".to_string(),
        });
    }

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.chatwoot.request_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "chatwoot.request_interval_ms must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
