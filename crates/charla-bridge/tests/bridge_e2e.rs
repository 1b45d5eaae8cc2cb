// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end bridge scenarios against a mocked Chatwoot API and a mock
//! chat provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use charla_bridge::{Bridge, MemoryBlacklist, router, webhook_router};
use charla_chatwoot::{ChatwootClient, ChatwootSettings, ConversationResolver};
use charla_core::traits::{ChatProvider, ProviderEvent};
use charla_core::types::{ChatIdentity, InboundChatMessage};
use charla_test_utils::MockChatProvider;

fn bridge_with(server: &MockServer, provider: Arc<MockChatProvider>) -> Arc<Bridge> {
    let client = ChatwootClient::new(ChatwootSettings {
        url: server.uri(),
        account_id: 3,
        inbox_id: 7,
        api_access_token: "test-token".into(),
        request_interval: Duration::from_millis(1),
    })
    .unwrap();
    let resolver = Arc::new(ConversationResolver::with_timings(
        client,
        Duration::from_millis(1),
        Duration::from_secs(2),
    ));
    Arc::new(Bridge::with_timings(
        provider as Arc<dyn ChatProvider>,
        resolver,
        Arc::new(MemoryBlacklist::new()),
        Duration::from_millis(1),
        Duration::from_millis(1),
    ))
}

async fn wait_until<F, Fut>(what: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Mounts Chatwoot mocks for an identity the CRM has never seen: one search
/// miss, then the created contact, an empty conversation list, and the
/// creation endpoints.
async fn mount_fresh_identity(server: &MockServer, contact_id: i64, conversation_id: i64) {
    Mock::given(method("GET"))
        .and(path("/3/contacts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"payload": []})))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/contacts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payload": [{"id": contact_id, "custom_attributes": {}}]
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payload": {"contact": {"id": contact_id}}
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/3/contacts/{contact_id}")))
        .and(body_partial_json(serde_json::json!({
            "custom_attributes": {"funciones_del_bot": "ON"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/3/contacts/{contact_id}/conversations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"payload": []})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/3/conversations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": conversation_id})),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn inbound_message_from_new_identity_provisions_and_posts() {
    let server = MockServer::start().await;
    mount_fresh_identity(&server, 9, 31).await;
    Mock::given(method("POST"))
        .and(path("/3/conversations/31/messages"))
        .and(body_partial_json(serde_json::json!({
            "content": "hello",
            "message_type": "incoming",
            "private": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&server, provider);

    bridge.handle_event(ProviderEvent::Message(InboundChatMessage {
        from: ChatIdentity::normalize("593111111111"),
        body: "hello".into(),
        sender_name: Some("Ana".into()),
        media: None,
    }));

    wait_until("message post to reach chatwoot", || async {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .any(|r| r.url.path() == "/3/conversations/31/messages")
    })
    .await;
}

#[tokio::test]
async fn event_marked_body_goes_through_the_attachment_call() {
    let server = MockServer::start().await;
    mount_fresh_identity(&server, 9, 31).await;
    Mock::given(method("POST"))
        .and(path("/3/conversations/31/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 78})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&server, provider);

    bridge.handle_event(ProviderEvent::Message(InboundChatMessage {
        from: ChatIdentity::normalize("593111111111"),
        body: "_event_voice-note_".into(),
        sender_name: None,
        media: None,
    }));

    wait_until("multipart message post", || async {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .any(|r| r.url.path() == "/3/conversations/31/messages")
    })
    .await;

    let requests = server.received_requests().await.unwrap();
    let message_post = requests
        .iter()
        .find(|r| r.url.path() == "/3/conversations/31/messages")
        .unwrap();
    let content_type = message_post
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("multipart/form-data"),
        "expected multipart, got {content_type}"
    );
}

#[tokio::test]
async fn agent_reply_webhook_reaches_the_chat_network_once() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, Arc::clone(&provider));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, webhook_router(bridge)).await.unwrap();
    });

    let payload = serde_json::json!({
        "event": "message_created",
        "message_type": "outgoing",
        "private": false,
        "content": "hi",
        "attachments": [],
        "conversation": {
            "channel": "Channel::Api",
            "meta": {"sender": {"phone_number": "+593111111111"}},
        },
    });
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");

    wait_until("agent reply to reach the provider", || async {
        !provider.sent_texts().is_empty()
    })
    .await;

    let sent = provider.sent_texts();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.as_str(), "593111111111");
    assert_eq!(sent[0].text, "hi");
    // No CRM traffic for a pure agent relay.
    assert!(crm.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn contact_updated_off_blacklists_the_identity() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, provider);
    let identity = ChatIdentity::normalize("593111111111");

    let off = serde_json::from_value(serde_json::json!({
        "event": "contact_updated",
        "phone_number": "+593111111111",
        "custom_attributes": {"funciones_del_bot": "OFF"},
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), off).await;
    assert!(bridge.blacklist().contains(&identity).await);

    let on = serde_json::from_value(serde_json::json!({
        "event": "contact_updated",
        "phone_number": "+593111111111",
        "custom_attributes": {"funciones_del_bot": "ON"},
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), on).await;
    assert!(!bridge.blacklist().contains(&identity).await);
}

#[tokio::test]
async fn contact_updated_for_the_operational_number_still_toggles() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, provider);
    let identity = ChatIdentity::normalize("593999999999");

    // Suppression only applies to conversation-meta senders; a toggle on
    // the operational contact itself must still land.
    let off = serde_json::from_value(serde_json::json!({
        "event": "contact_updated",
        "phone_number": "+593999999999",
        "custom_attributes": {"funciones_del_bot": "OFF"},
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), off).await;
    assert!(bridge.blacklist().contains(&identity).await);
}

#[tokio::test]
async fn off_on_off_leaves_the_blacklist_at_exactly_one_entry() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, provider);
    let identity = ChatIdentity::normalize("593111111111");

    for value in ["OFF", "ON", "OFF"] {
        let payload = serde_json::from_value(serde_json::json!({
            "event": "contact_updated",
            "phone_number": "+593111111111",
            "custom_attributes": {"funciones_del_bot": value},
        }))
        .unwrap();
        router::route(Arc::clone(&bridge), payload).await;
    }
    assert_eq!(bridge.blacklist().list().await, vec![identity]);
}

#[tokio::test]
async fn message_created_toggle_acts_on_the_empty_identity_only() {
    // A message_created event carrying the toggle through conversation meta
    // never blacklists the real sender; the derived identity is empty.
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, provider);

    let payload = serde_json::from_value(serde_json::json!({
        "event": "message_created",
        "message_type": "incoming",
        "conversation": {
            "meta": {"sender": {
                "phone_number": "+593111111111",
                "custom_attributes": {"funciones_del_bot": "OFF"},
            }}
        },
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), payload).await;

    let sender = ChatIdentity::normalize("593111111111");
    assert!(!bridge.blacklist().contains(&sender).await);
    assert!(
        bridge
            .blacklist()
            .contains(&ChatIdentity::normalize(""))
            .await
    );
}

#[tokio::test]
async fn sentinel_events_are_fully_suppressed() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, Arc::clone(&provider));

    let payload = serde_json::from_value(serde_json::json!({
        "event": "message_created",
        "message_type": "outgoing",
        "private": false,
        "content": "internal",
        "conversation": {
            "channel": "Channel::Api",
            "meta": {"sender": {"phone_number": "+593999999999"}},
        },
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), payload).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(provider.sent_texts().is_empty());
    assert!(provider.sent_media().is_empty());
    assert!(crm.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn csat_prompt_is_forwarded_directly_and_answered_ones_are_not() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, Arc::clone(&provider));

    let prompt = serde_json::from_value(serde_json::json!({
        "event": "message_created",
        "content_type": "input_csat",
        "content": "Califica nuestra atención",
        "conversation": {"meta": {"sender": {"phone_number": "+593111111111"}}},
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), prompt).await;

    let sent = provider.sent_texts();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Califica nuestra atención");
    // CSAT bypasses the CRM pipeline entirely.
    assert!(crm.received_requests().await.unwrap().is_empty());

    let answered = serde_json::from_value(serde_json::json!({
        "event": "message_created",
        "content_type": "input_csat",
        "content": "Califica nuestra atención",
        "content_attributes": {
            "submitted_values": {"csat_survey_response": {"rating": 5}}
        },
        "conversation": {"meta": {"sender": {"phone_number": "+593111111111"}}},
    }))
    .unwrap();
    router::route(Arc::clone(&bridge), answered).await;
    assert_eq!(provider.sent_texts().len(), 1);
}

#[tokio::test]
async fn undecodable_webhook_bodies_are_acknowledged() {
    let crm = MockServer::start().await;
    let provider = Arc::new(MockChatProvider::new());
    let bridge = bridge_with(&crm, provider);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, webhook_router(bridge)).await.unwrap();
    });

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook"))
        .body("not json at all")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}
