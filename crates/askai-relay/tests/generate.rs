use std::net::SocketAddr;
use std::sync::Arc;

use askai_core::{ChatClient, ExchangeState, HttpRelayClient, Unavailable, FAILURE_TEXT};
use askai_relay::{router, serve, GeminiClient, RelayState};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Start the relay on an ephemeral port, pointed at the mock upstream
async fn start_relay(upstream: &MockServer) -> SocketAddr {
    start_relay_at(&format!("{}{}", upstream.uri(), UPSTREAM_PATH)).await
}

async fn start_relay_at(upstream_url: &str) -> SocketAddr {
    let gemini = GeminiClient::new(upstream_url, "test-key");
    let app = router(RelayState::new(Arc::new(gemini)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = serve(listener, app).await;
    });
    addr
}

/// An address nothing is listening on
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn candidate(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

async fn post_generate(addr: SocketAddr, body: serde_json::Value) -> (u16, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{}/generate", addr))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn forwards_prompt_and_returns_first_candidate() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .and(query_param("key", "test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Tell me a joke." }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("*Why did the chicken cross the road?* ")))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let (status, body) = post_generate(addr, serde_json::json!({ "prompt": "Tell me a joke." })).await;

    assert_eq!(status, 200);
    assert_eq!(body, serde_json::json!({ "output": "*Why did the chicken cross the road?* " }));
}

#[tokio::test]
async fn upstream_error_status_becomes_fixed_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "API key not valid" }
        })))
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let (status, body) = post_generate(addr, serde_json::json!({ "prompt": "hi" })).await;

    assert_eq!(status, 500);
    assert_eq!(body, serde_json::json!({ "error": "Failed to generate content" }));
}

#[tokio::test]
async fn malformed_upstream_shape_becomes_fixed_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let (status, body) = post_generate(addr, serde_json::json!({ "prompt": "hi" })).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to generate content");
}

#[tokio::test]
async fn missing_prompt_is_forwarded_as_empty_text() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .and(body_json(serde_json::json!({ "contents": [{ "parts": [{ "text": "" }] }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("What would you like to ask?")))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let (status, body) = post_generate(addr, serde_json::json!({})).await;

    assert_eq!(status, 200);
    assert_eq!(body["output"], "What would you like to ask?");
}

#[tokio::test]
async fn chat_client_shows_cleaned_reply_through_relay() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("*Why did the chicken cross the road?* ")))
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let relay = HttpRelayClient::new(&format!("http://{}", addr));
    let mut chat = ChatClient::new(Arc::new(relay), Arc::new(Unavailable));

    let reply = chat.send("Tell me a joke.").await.unwrap().clone();
    assert_eq!(reply.text, "Why did the chicken cross the road?");
    assert_eq!(chat.state(), ExchangeState::Resolved);
    assert_eq!(chat.messages().len(), 2);
}

#[tokio::test]
async fn chat_client_shows_failure_text_when_upstream_is_down() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let addr = start_relay(&upstream).await;
    let relay = HttpRelayClient::new(&format!("http://{}", addr));
    let mut chat = ChatClient::new(Arc::new(relay), Arc::new(Unavailable));

    let reply = chat.send("hello").await.unwrap().clone();
    assert_eq!(reply.text, FAILURE_TEXT);
    assert_eq!(chat.state(), ExchangeState::Failed);
    assert!(!chat.conversation().has_pending());
}

#[tokio::test]
async fn unreachable_upstream_becomes_fixed_500() {
    let addr = start_relay_at(&format!("http://{}{}", closed_addr(), UPSTREAM_PATH)).await;
    let (status, body) = post_generate(addr, serde_json::json!({ "prompt": "hi" })).await;

    assert_eq!(status, 500);
    assert_eq!(body, serde_json::json!({ "error": "Failed to generate content" }));
}

#[tokio::test]
async fn chat_client_shows_failure_text_when_relay_is_down() {
    let relay = HttpRelayClient::new(&format!("http://{}", closed_addr()));
    let mut chat = ChatClient::new(Arc::new(relay), Arc::new(Unavailable));

    chat.send("Tell me a joke.").await;

    assert_eq!(chat.state(), ExchangeState::Failed);
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].text, FAILURE_TEXT);
    assert!(!chat.messages()[1].pending);
}
