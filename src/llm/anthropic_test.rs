use super::*;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
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
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "Jawabanmu sudah baik." }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "Jawabanmu sudah baik.");
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_concatenates_text_blocks_and_skips_others() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "hmm" },
        { "type": "text", "text": "Bagian satu. " },
        { "type": "text", "text": "Bagian dua." }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "Bagian satu. Bagian dua.");
}

#[test]
fn parse_empty_content() {
    let json = make_response(serde_json::json!([]));
    let resp = parse_response(&json).unwrap();
    assert!(resp.text.is_empty());
}

#[test]
fn parse_invalid_json_is_parse_error() {
    assert!(matches!(parse_response("not json"), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_missing_stop_reason_defaults() {
    let json = serde_json::json!({
        "content": [{ "type": "text", "text": "ok" }],
        "model": "m",
        "stop_reason": null,
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap().stop_reason, "end_turn");
}
