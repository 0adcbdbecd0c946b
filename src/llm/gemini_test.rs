use super::*;
use crate::llm::types::Message;
use serde_json::json;

#[test]
fn request_has_system_instruction_and_schema() {
    let messages = [Message::user("What is the iHeart approval status?")];
    let schema = json!({ "type": "object", "properties": { "page": { "type": "integer" } } });
    let request = ChatRequest {
        system: "SYS",
        messages: &messages,
        max_tokens: 512,
        temperature: Some(0.2),
        response_schema: Some(&schema),
    };
    let body = serde_json::to_value(build_request(&request)).unwrap();
    assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "SYS" }] }));
    assert_eq!(
        body["contents"][0],
        json!({ "role": "user", "parts": [{ "text": "What is the iHeart approval status?" }] })
    );
    let config = &body["generationConfig"];
    assert_eq!(config["maxOutputTokens"], 512);
    assert_eq!(config["responseMimeType"], "application/json");
    assert_eq!(config["responseSchema"]["type"], "OBJECT");
    assert_eq!(config["responseSchema"]["properties"]["page"]["type"], "INTEGER");
    assert!((config["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}

#[test]
fn request_without_schema_is_plain_text() {
    let messages = [Message { role: "assistant".into(), content: "earlier".into() }];
    let request = ChatRequest { system: " ", messages: &messages, max_tokens: 64, temperature: None, response_schema: None };
    let body = serde_json::to_value(build_request(&request)).unwrap();
    assert!(body.get("systemInstruction").is_none());
    assert_eq!(body["contents"][0]["role"], "model");
    assert!(body["generationConfig"].get("responseMimeType").is_none());
    assert!(body["generationConfig"].get("temperature").is_none());
}

#[test]
fn parse_text_response() {
    let json = json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "{\"status\":" }, { "text": "\"OK\"}" }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 30 },
        "modelVersion": "gemini-2.5-flash-001"
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text, "{\"status\":\"OK\"}");
    assert_eq!(resp.model, "gemini-2.5-flash-001");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 120);
    assert_eq!(resp.output_tokens, 30);
}

#[test]
fn parse_skips_thought_parts() {
    let json = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "thinking...", "thought": true }, { "text": "answer" }] },
            "finishReason": "MAX_TOKENS"
        }]
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text, "answer");
    assert_eq!(resp.stop_reason, "max_tokens");
    assert_eq!(resp.model, "gemini-2.5-flash");
}

#[test]
fn parse_blocked_prompt_errors() {
    let json = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    let err = parse_response(&json, "m").unwrap_err();
    assert!(matches!(&err, LlmError::ApiParse(msg) if msg.contains("SAFETY")));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("nope", "m"), Err(LlmError::ApiParse(_))));
}
