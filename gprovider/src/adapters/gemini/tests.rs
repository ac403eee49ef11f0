//! Focused unit tests for Gemini adapter internals.

#![cfg(test)]

use serde_json::json;

use crate::{
    BackendTool, Content, FinishReason, FunctionDeclaration, FunctionResponse, GenerateRequest,
    Part, Role,
};

use super::serde_api::{
    GeminiApiResponse, build_api_request, extract_error_message, parse_finish_reason,
    sse_data_payload,
};

#[test]
fn build_api_request_uses_camel_case_wire_names() {
    let request = GenerateRequest::builder("gemini-2.0-flash")
        .content(Content::user_text("What is x?"))
        .content(Content::new(
            Role::User,
            vec![Part::FunctionResponse(FunctionResponse {
                name: "lookup".to_string(),
                response: json!({"result": {"value": 42}}),
            })],
        ))
        .tool(BackendTool::FunctionDeclarations(vec![FunctionDeclaration {
            name: "lookup".to_string(),
            description: "Looks things up".to_string(),
            parameters: json!({"type": "object"}),
        }]))
        .tool(BackendTool::GoogleSearch)
        .max_output_tokens(256)
        .build()
        .expect("request should build");

    let wire = serde_json::to_value(build_api_request(&request)).expect("serialize");

    assert_eq!(wire["contents"][0]["role"], "user");
    assert_eq!(wire["contents"][0]["parts"][0]["text"], "What is x?");
    assert_eq!(
        wire["contents"][1]["parts"][0]["functionResponse"]["response"]["result"]["value"],
        42
    );
    assert_eq!(wire["tools"][0]["functionDeclarations"][0]["name"], "lookup");
    assert_eq!(wire["tools"][1]["googleSearch"], json!({}));
    assert_eq!(wire["generationConfig"]["maxOutputTokens"], 256);
    assert!(wire["generationConfig"].get("temperature").is_none());
}

#[test]
fn build_api_request_omits_empty_tools_and_config() {
    let request = GenerateRequest::new("m", vec![Content::user_text("hi")]);
    let wire = serde_json::to_value(build_api_request(&request)).expect("serialize");

    assert!(wire.get("tools").is_none());
    assert!(wire.get("generationConfig").is_none());
}

#[test]
fn api_response_maps_parts_grounding_and_usage() {
    let body = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Result: "},
                    {"executableCode": {"language": "PYTHON", "code": "print(6*7)"}},
                    {"codeExecutionResult": {"outcome": "OUTCOME_OK", "output": "42\n"}},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBOR"}},
                    {"functionCall": {"name": "lookup", "args": {"q": "x"}}},
                    {"thoughtSignature": "opaque"}
                ]
            },
            "finishReason": "STOP",
            "groundingMetadata": {"webSearchQueries": ["x"]}
        }],
        "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 7, "totalTokenCount": 12},
        "modelVersion": "gemini-2.0-flash-001"
    });

    let parsed: GeminiApiResponse = serde_json::from_value(body).expect("deserialize");
    let response = parsed.into_generate_response("gemini-2.0-flash");

    assert_eq!(response.model, "gemini-2.0-flash-001");
    assert_eq!(response.parts.len(), 5);
    assert_eq!(response.text(), "Result: ");
    assert!(response.has_artifacts());
    assert_eq!(response.function_call().map(|call| call.args.clone()), Some(json!({"q": "x"})));
    assert_eq!(response.grounding, Some(json!({"webSearchQueries": ["x"]})));
    assert_eq!(response.finish_reason, FinishReason::Stop);
    assert_eq!(response.usage.total_tokens, 12);
}

#[test]
fn api_response_without_candidates_is_empty() {
    let parsed: GeminiApiResponse =
        serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}}))
            .expect("deserialize");
    let response = parsed.into_generate_response("gemini-pro");

    assert_eq!(response.model, "gemini-pro");
    assert!(response.parts.is_empty());
    assert_eq!(response.finish_reason, FinishReason::Other);
}

#[test]
fn parse_finish_reason_maps_expected_values() {
    assert_eq!(parse_finish_reason(Some("STOP")), FinishReason::Stop);
    assert_eq!(parse_finish_reason(Some("MAX_TOKENS")), FinishReason::MaxTokens);
    assert_eq!(parse_finish_reason(Some("SAFETY")), FinishReason::Safety);
    assert_eq!(parse_finish_reason(Some("unknown")), FinishReason::Other);
    assert_eq!(parse_finish_reason(None), FinishReason::Other);
}

#[test]
fn sse_data_payload_skips_non_data_lines() {
    assert_eq!(sse_data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
    assert_eq!(sse_data_payload("data:{}"), Some("{}"));
    assert_eq!(sse_data_payload(": keep-alive"), None);
    assert_eq!(sse_data_payload("data: [DONE]"), None);
    assert_eq!(sse_data_payload(""), None);
}

#[test]
fn extract_error_message_reads_google_error_envelope() {
    let body = r#"{"error":{"code":404,"message":"models/gemini-x is not found","status":"NOT_FOUND"}}"#;
    assert_eq!(
        extract_error_message(body).as_deref(),
        Some("models/gemini-x is not found")
    );
    assert_eq!(extract_error_message("<html>"), None);
}
