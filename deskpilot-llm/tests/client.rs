use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use deskpilot_core::{DecisionOracle, DeskpilotError, Message, OracleRequest, ToolSpec};
use deskpilot_llm::OpenAiCompatibleOracle;

fn oracle_for(server: &MockServer) -> OpenAiCompatibleOracle {
    OpenAiCompatibleOracle::builder()
        .base_url(server.base_url())
        .api_key("test-key")
        .model("pilot-small")
        .timeout(Duration::from_secs(5))
        .build()
        .expect("oracle should build")
}

#[tokio::test]
async fn decide_sends_bearer_auth_and_model() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer test-key")
            .body_contains("\"model\":\"pilot-small\"");
        then.status(200).json_body(json!({
            "choices": [{"message": {"content": "hello there"}}]
        }));
    });

    let oracle = oracle_for(&server);
    let reply = oracle
        .decide(OracleRequest::new(vec![Message::user("hi")]))
        .await
        .expect("decide");

    assert_eq!(reply.text(), "hello there");
    assert!(reply.tool_calls.is_empty());
    mock.assert();
}

#[tokio::test]
async fn decide_serializes_tool_specs() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .body_contains("\"type\":\"function\"")
            .body_contains("\"name\":\"book_meeting\"");
        then.status(200).json_body(json!({
            "choices": [{"message": {"content": "ok"}}]
        }));
    });

    let oracle = oracle_for(&server);
    let spec = ToolSpec {
        name: "book_meeting".to_string(),
        description: "Books a meeting slot".to_string(),
        parameters: json!({"type": "object", "properties": {}}),
    };
    let request = OracleRequest::new(vec![Message::user("book it")]).with_tools(vec![spec]);

    oracle.decide(request).await.expect("decide");
    mock.assert();
}

#[tokio::test]
async fn decide_parses_tool_calls_from_arguments_string() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "book_meeting",
                        "arguments": "{\"date\":\"2026-09-01\",\"time\":\"10:00\"}"
                    }
                }]
            }}]
        }));
    });

    let oracle = oracle_for(&server);
    let reply = oracle
        .decide(OracleRequest::new(vec![Message::user("book it")]))
        .await
        .expect("decide");

    assert_eq!(reply.text(), "");
    let call = reply.requested_action().expect("tool call");
    assert_eq!(call.name, "book_meeting");
    assert_eq!(call.args["date"], json!("2026-09-01"));
    assert_eq!(call.args["time"], json!("10:00"));
}

#[tokio::test]
async fn decide_rejects_malformed_tool_arguments() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({
            "choices": [{"message": {
                "tool_calls": [{
                    "id": "call_1",
                    "function": {"name": "book_meeting", "arguments": "{not json"}
                }]
            }}]
        }));
    });

    let oracle = oracle_for(&server);
    let err = oracle
        .decide(OracleRequest::new(vec![Message::user("book it")]))
        .await
        .expect_err("malformed arguments should fail");

    assert!(matches!(
        err,
        DeskpilotError::SchemaViolation { expected, .. } if expected == "tool call arguments"
    ));
}

#[tokio::test]
async fn decide_surfaces_provider_error_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(429).json_body(json!({
            "error": {"message": "rate limited, slow down"}
        }));
    });

    let oracle = oracle_for(&server);
    let err = oracle
        .decide(OracleRequest::new(vec![Message::user("hi")]))
        .await
        .expect_err("429 should fail");

    match err {
        DeskpilotError::Oracle(message) => {
            assert!(message.contains("429"), "missing status in: {message}");
            assert!(message.contains("rate limited"), "missing detail in: {message}");
        }
        other => panic!("expected oracle error, got {other:?}"),
    }
}

#[tokio::test]
async fn decide_fails_on_empty_choices() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(json!({"choices": []}));
    });

    let oracle = oracle_for(&server);
    let err = oracle
        .decide(OracleRequest::new(vec![Message::user("hi")]))
        .await
        .expect_err("empty choices should fail");

    assert!(matches!(err, DeskpilotError::Oracle(_)));
}

#[test]
fn builder_rejects_missing_api_key() {
    let err = OpenAiCompatibleOracle::builder()
        .model("pilot-small")
        .build()
        .expect_err("missing key should fail");

    assert!(matches!(err, DeskpilotError::InvalidConfig(_)));
}

#[test]
fn builder_rejects_invalid_base_url() {
    let err = OpenAiCompatibleOracle::builder()
        .base_url("not a url")
        .api_key("k")
        .model("m")
        .build()
        .expect_err("bad url should fail");

    assert!(matches!(err, DeskpilotError::InvalidConfig(_)));
}
