//! # Gemini Provider Tests
//!
//! Verifies the wire shape of requests sent to the `generateContent` endpoint
//! and the error mapping for unhappy responses, against a local mock server.

use menuforge::providers::ai::gemini::GeminiProvider;
use menuforge::{ImagePayload, OracleError, OracleProvider, OracleRequest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn candidate_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn text_request_carries_system_instruction_and_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [ { "text": "You are a menu analyst." } ] },
            "contents": [ { "parts": [ { "text": "Count the items." } ] } ],
            "generationConfig": { "maxOutputTokens": 777, "temperature": 0.1 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("{\"ok\": true}")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        format!("{}/v1beta/models/gemini-flash:generateContent", server.uri()),
        "test-key".to_string(),
    )
    .unwrap();

    let response = provider
        .generate(OracleRequest::text(
            "You are a menu analyst.",
            "Count the items.",
            777,
        ))
        .await
        .unwrap();
    assert_eq!(response, "{\"ok\": true}");
}

#[tokio::test]
async fn image_request_attaches_inline_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "contents": [ { "parts": [
                { "text": "Extract this menu photo." },
                { "inlineData": { "mimeType": "image/jpeg", "data": "aGVsbG8=" } }
            ] } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(
        format!("{}/generate", server.uri()),
        "test-key".to_string(),
    )
    .unwrap();

    let image = ImagePayload {
        mime_type: "image/jpeg".to_string(),
        data_base64: "aGVsbG8=".to_string(),
    };
    let request = OracleRequest::text("system", "Extract this menu photo.", 2048)
        .with_image(Some(&image));
    let response = provider.generate(request).await.unwrap();
    assert_eq!(response, "[]");
}

#[tokio::test]
async fn server_errors_map_to_the_api_variant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let provider =
        GeminiProvider::new(format!("{}/generate", server.uri()), "test-key".to_string()).unwrap();
    let result = provider
        .generate(OracleRequest::text("system", "user", 256))
        .await;

    match result {
        Err(OracleError::Api(message)) => assert!(message.contains("quota exhausted")),
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn an_empty_api_key_is_rejected_at_construction() {
    let error = GeminiProvider::new("http://localhost/generate".to_string(), String::new())
        .err()
        .unwrap();
    assert!(matches!(error, OracleError::MissingApiKey));
}
