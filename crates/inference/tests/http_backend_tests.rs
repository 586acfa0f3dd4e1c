// Inference backends against a local mock HTTP server.

use contractguard_inference::{InferenceClient, InferenceError, MessagesClient, OpenAiClient};
use httpmock::prelude::*;
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn messages_client(server: &MockServer, api_key: Option<&str>) -> MessagesClient {
    MessagesClient::new(
        server.url("/v1/messages"),
        api_key.map(str::to_string),
        "claude-test",
        "bedrock-2023-05-31",
        4000,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_messages_completion_concatenates_text_blocks() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", "bedrock-2023-05-31")
                .json_body(json!({
                    "anthropic_version": "bedrock-2023-05-31",
                    "max_tokens": 4000,
                    "model": "claude-test",
                    "messages": [{"role": "user", "content": "review this contract"}]
                }));
            then.status(200).json_body(json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "{\"riskScore\": "},
                    {"type": "text", "text": "12}"}
                ],
                "stop_reason": "end_turn"
            }));
        })
        .await;

    let client = messages_client(&server, Some("test-key"));
    let completion = client.complete("review this contract").await.unwrap();

    mock.assert_async().await;
    assert_eq!(completion, "{\"riskScore\": 12}");
    assert_eq!(client.model(), "claude-test");
}

#[tokio::test]
async fn test_messages_error_status_carries_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(429).body("ThrottlingException: rate exceeded");
        })
        .await;

    let err = messages_client(&server, None)
        .complete("prompt")
        .await
        .unwrap_err();
    match err {
        InferenceError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("ThrottlingException"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_messages_empty_completion_rejected() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({"content": []}));
        })
        .await;

    let err = messages_client(&server, None)
        .complete("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::EmptyCompletion { .. }));
}

#[tokio::test]
async fn test_messages_undecodable_body_rejected() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let err = messages_client(&server, None)
        .complete("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Decode(_)));
}

#[tokio::test]
async fn test_openai_completion_returns_first_choice() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test");
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": "gpt-test",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "```json\n{\"riskScore\": 55}\n```"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }));
        })
        .await;

    let client = OpenAiClient::new(&server.url("/v1"), "sk-test", "gpt-test", 4000);
    let completion = client.complete("review").await.unwrap();

    mock.assert_async().await;
    assert_eq!(completion, "```json\n{\"riskScore\": 55}\n```");
    assert_eq!(client.backend_name(), "openai");
}
