// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Charla configuration system.

use charla_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_charla_config() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 3010

[chatwoot]
url = "https://crm.example.com/api/v1/accounts"
account_id = 4
inbox_id = 11
api_access_token = "tok-abc"
request_interval_ms = 250
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3010);
    assert_eq!(
        config.chatwoot.url.as_deref(),
        Some("https://crm.example.com/api/v1/accounts")
    );
    assert_eq!(config.chatwoot.account_id, Some(4));
    assert_eq!(config.chatwoot.inbox_id, Some(11));
    assert_eq!(config.chatwoot.api_access_token.as_deref(), Some("tok-abc"));
    assert_eq!(config.chatwoot.request_interval_ms, 250);
}

/// An unknown field in a section is rejected at deserialization.
#[test]
fn unknown_field_is_rejected() {
    let toml = r#"
[chatwoot]
url = "https://crm.example.com"
account_token = "typo"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Missing credentials collect one error per absent key.
#[test]
fn missing_credentials_are_startup_fatal() {
    let errors = load_and_validate_str(
        r#"
[chatwoot]
url = "https://crm.example.com/api/v1/accounts"
account_id = 4
"#,
    )
    .unwrap_err();
    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(errors.len(), 2, "got: {rendered:?}");
    assert!(rendered.iter().any(|e| e.contains("chatwoot.inbox_id")));
    assert!(
        rendered
            .iter()
            .any(|e| e.contains("chatwoot.api_access_token"))
    );
}

/// Defaults fill the server section when only [chatwoot] is present.
#[test]
fn server_defaults_apply() {
    let config = load_and_validate_str(
        r#"
[chatwoot]
url = "https://crm.example.com/api/v1/accounts"
account_id = 1
inbox_id = 2
api_access_token = "tok"
"#,
    )
    .unwrap();
    assert_eq!(config.server.port, 3008);
    assert_eq!(config.server.host, "0.0.0.0");
}
