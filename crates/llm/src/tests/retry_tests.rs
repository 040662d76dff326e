use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{completion, test_client};
use crate::ai_types::{ChatRequest, Message};
use crate::error::LlmError;

fn create_test_request() -> ChatRequest {
    ChatRequest {
        model: "test-model".to_owned(),
        messages: vec![Message::new("user", "hello")],
        response_format: None,
    }
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("test response")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.chat_completion(&create_test_request()).await.unwrap();
    assert_eq!(result, "test response");
}

#[tokio::test]
async fn test_retry_on_429_then_success() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("success after retry")))
        .mount(&server)
        .await;

    let result = client.chat_completion(&create_test_request()).await.unwrap();
    assert_eq!(result, "success after retry");
}

#[tokio::test]
async fn test_no_retry_on_400() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.chat_completion(&create_test_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::HttpStatus { code: 400, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_retries_exhausted_on_persistent_503() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let err = client.chat_completion(&create_test_request()).await.unwrap_err();
    match err {
        LlmError::RetriesExhausted(inner) => {
            assert!(matches!(*inner, LlmError::HttpStatus { code: 503, .. }));
        },
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices_is_error() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client.chat_completion(&create_test_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[test]
fn strip_markdown_fences() {
    assert_eq!(crate::strip_markdown_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(crate::strip_markdown_json("```\n[1]\n```"), "[1]");
    assert_eq!(crate::strip_markdown_json("  plain "), "plain");
}

#[test]
fn truncate_respects_char_boundary() {
    assert_eq!(crate::truncate("héllo", 2), "h");
    assert_eq!(crate::truncate("abc", 10), "abc");
}
