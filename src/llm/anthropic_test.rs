use super::*;
use serde_json::json;

fn make_response(content: serde_json::Value) -> String {
    json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(json!([{ "type": "text", "text": "{\"status\":\"OK\"}" }]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "{\"status\":\"OK\"}");
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_concatenates_text_blocks() {
    let json = make_response(json!([
        { "type": "text", "text": "{\"a\":" },
        { "type": "text", "text": "1}" }
    ]));
    assert_eq!(parse_response(&json).unwrap().text, "{\"a\":1}");
}

#[test]
fn parse_skips_thinking_and_unknown_blocks() {
    let json = make_response(json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "some_future_type", "data": {} },
        { "type": "text", "text": "Here is my answer" }
    ]));
    assert_eq!(parse_response(&json).unwrap().text, "Here is my answer");
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn schema_is_appended_to_system_prompt() {
    let schema = json!({ "type": "object" });
    let system = system_with_schema("BASE", Some(&schema));
    assert!(system.starts_with("BASE\n"));
    assert!(system.contains("{\"type\":\"object\"}"));
    assert_eq!(system_with_schema("BASE", None), "BASE");
}

#[test]
fn request_serializes_temperature_when_set() {
    let messages = [Message::user("hi")];
    let body = ApiRequest { model: "m", max_tokens: 10, system: "s", messages: &messages, temperature: Some(0.2) };
    let value = serde_json::to_value(&body).unwrap();
    assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(value["messages"][0]["role"], "user");

    let body = ApiRequest { model: "m", max_tokens: 10, system: "s", messages: &messages, temperature: None };
    assert!(serde_json::to_value(&body).unwrap().get("temperature").is_none());
}
