//! HTTP surface tests against a locally bound server

mod common;

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use chat_relay::conversation::ConversationService;
use chat_relay::routes::configure_routes;
use common::{chunks, harness, Script, CONVERSATION_ID, THINK_FOO_ANSWER_BAR};
use serde_json::{json, Value};

/// Serve the routes on a free local port and return the base url
async fn spawn_server(service: ConversationService) -> String {
    let addr: SocketAddr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    tokio::spawn(warp::serve(configure_routes(service)).run(addr));

    let base_url = format!("http://{}", addr);
    for _ in 0..100 {
        if reqwest::get(format!("{}/health", base_url)).await.is_ok() {
            return base_url;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not start on {}", addr);
}

async fn get(base_url: &str, path: &str) -> reqwest::Response {
    reqwest::get(format!("{}{}", base_url, path)).await.unwrap()
}

async fn post(base_url: &str, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base_url, path))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = get(&base_url, "/health").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "claude-test");
    assert_eq!(body["features"]["thinking"], true);
}

#[tokio::test]
async fn test_chat_without_message_is_bad_request() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = post(&base_url, "/chat", json!({ "conversation_id": CONVERSATION_ID })).await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing required field: message");
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_chat_with_invalid_json_is_bad_request() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/chat", base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chat_returns_aggregated_turn() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = post(
        &base_url,
        "/chat",
        json!({ "message": "hello", "conversationId": CONVERSATION_ID }),
    )
    .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["conversation_id"], CONVERSATION_ID);
    assert_eq!(body["response"], "bar");
    assert_eq!(body["thinking"], "foo");
    assert_eq!(body["metadata"]["model"], "claude-test");
    assert!(body["metadata"]["ttft"].as_f64().unwrap() > 0.0);
    assert_eq!(body["metadata"]["streaming_used"], true);

    assert_eq!(h.store.get(CONVERSATION_ID).await.len(), 2);
}

#[tokio::test]
async fn test_chat_upstream_failure_is_internal_error() {
    let h = harness(Script::Status(503, "overloaded")).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = post(
        &base_url,
        "/chat",
        json!({ "message": "hello", "conversation_id": CONVERSATION_ID }),
    )
    .await;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Claude API error 503: overloaded");

    // The user message stays recorded
    assert_eq!(h.store.get(CONVERSATION_ID).await.len(), 1);
}

#[tokio::test]
async fn test_get_conversation() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = get(&base_url, "/conversation/unknown").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["conversation_id"], "unknown");
    assert_eq!(body["history"], json!([]));

    h.service
        .complete_turn(CONVERSATION_ID, "hello", None)
        .await
        .unwrap();

    let body: Value = get(&base_url, &format!("/conversation/{}", CONVERSATION_ID))
        .await
        .json()
        .await
        .unwrap();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[1]["role"], "assistant");
    assert_eq!(history[1]["content"], "bar");
    assert_eq!(history[1]["thinking"], "foo");
    assert!(history[0].get("thinking").is_none());
}

#[tokio::test]
async fn test_chat_stream_relays_events() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = post(
        &base_url,
        "/chat/stream",
        json!({ "message": "hello", "conversation_id": CONVERSATION_ID }),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let body = response.text().await.unwrap();
    let payloads: Vec<Value> = body
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect();
    let types: Vec<&str> = payloads
        .iter()
        .map(|p| p["type"].as_str().unwrap())
        .collect();

    assert_eq!(
        types,
        vec!["connected", "thinking", "text", "metadata", "complete"]
    );
    assert_eq!(payloads[0]["conversation_id"], CONVERSATION_ID);
    assert_eq!(payloads[1]["content"], "foo");
    assert_eq!(payloads[2]["content"], "bar");
    assert!(body
        .lines()
        .filter(|line| line.starts_with("event:"))
        .all(|line| line.trim_start_matches("event:").trim() == "message"));
}

#[tokio::test]
async fn test_chat_stream_upstream_failure_ends_with_error_event() {
    let h = harness(Script::Status(503, "overloaded")).await;
    let base_url = spawn_server(h.service.clone()).await;

    let body = post(
        &base_url,
        "/chat/stream",
        json!({ "message": "hello", "conversation_id": CONVERSATION_ID }),
    )
    .await
    .text()
    .await
    .unwrap();

    assert!(body.contains("\"type\":\"connected\""));
    assert!(body.contains("Claude API error 503: overloaded"));
    assert!(!body.contains("\"type\":\"complete\""));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = get(&base_url, "/nope").await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_non_json_content_type_is_rejected() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/chat", base_url))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 415);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Content-Type must be application/json");
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() {
    let h = harness(chunks(THINK_FOO_ANSWER_BAR)).await;
    let base_url = spawn_server(h.service.clone()).await;
    let client = reqwest::Client::new();

    let not_found = client
        .get(format!("{}/nope", base_url))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(not_found.status(), 404);
    assert!(not_found
        .headers()
        .contains_key("access-control-allow-origin"));

    let bad_request = client
        .post(format!("{}/chat", base_url))
        .header("origin", "http://localhost:3000")
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_request.status(), 400);
    assert!(bad_request
        .headers()
        .contains_key("access-control-allow-origin"));
}
