use super::*;

fn request<'a>(messages: &'a [Message], schema: Option<&'a Value>) -> ChatRequest<'a> {
    ChatRequest { system: "SYS", messages, max_tokens: 256, temperature: Some(0.2), response_schema: schema }
}

// ===== chat completions =====

#[test]
fn cc_parse_text_response() {
    let json = json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "Hello!");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_length_is_max_tokens() {
    let json = json!({
        "model": "gpt-4o",
        "choices": [{ "message": { "content": "{\"a\"" }, "finish_reason": "length" }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn cc_parse_missing_choices() {
    let json = json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(parse_chat_completions_response(&json).is_err());
}

#[test]
fn cc_request_carries_system_and_schema() {
    let messages = [Message::user("question")];
    let schema = json!({ "type": "object", "properties": { "f": { "type": "string", "nullable": true } } });
    let body = serde_json::to_value(build_chat_completions_request("gpt-4o", &request(&messages, Some(&schema)))).unwrap();
    assert_eq!(body["messages"][0], json!({ "role": "system", "content": "SYS" }));
    assert_eq!(body["messages"][1], json!({ "role": "user", "content": "question" }));
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "answer_record");
    assert_eq!(
        body["response_format"]["json_schema"]["schema"]["properties"]["f"]["type"],
        json!(["string", "null"])
    );
}

#[test]
fn cc_request_without_schema_omits_format() {
    let messages = [Message::user("q")];
    let body = serde_json::to_value(build_chat_completions_request("gpt-4o", &request(&messages, None))).unwrap();
    assert!(body.get("response_format").is_none());
}

// ===== responses API =====

#[test]
fn resp_parse_text_response() {
    let json = json!({
        "model": "gpt-4o",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "Done!" }]
        }],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.text, "Done!");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 15);
}

#[test]
fn resp_parse_skips_reasoning_items() {
    let json = json!({
        "model": "gpt-4o",
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "{}" }] }
        ]
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().text, "{}");
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = json!({
        "model": "gpt-4o",
        "output_text": "Fallback text",
        "usage": { "input_tokens": 5, "output_tokens": 3 }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().text, "Fallback text");
}

#[test]
fn resp_parse_incomplete_is_max_tokens() {
    let json = json!({
        "model": "gpt-4o",
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    assert_eq!(parse_responses_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn resp_request_uses_instructions_and_text_format() {
    let messages = [Message::user("question")];
    let schema = json!({ "type": "object" });
    let body = serde_json::to_value(build_responses_request("gpt-4o", &request(&messages, Some(&schema)))).unwrap();
    assert_eq!(body["instructions"], "SYS");
    assert_eq!(body["max_output_tokens"], 256);
    assert_eq!(body["input"][0]["type"], "message");
    assert_eq!(body["input"][0]["content"][0], json!({ "type": "input_text", "text": "question" }));
    assert_eq!(body["text"]["format"]["type"], "json_schema");
    assert_eq!(body["text"]["format"]["schema"], schema);
}
