use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Teruskan, " }, { "text": "kamu hebat." }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 7 },
        "modelVersion": "gemini-2.0-flash-001"
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.0-flash").unwrap();
    assert_eq!(resp.text, "Teruskan, kamu hebat.");
    assert_eq!(resp.model, "gemini-2.0-flash-001");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 12);
    assert_eq!(resp.output_tokens, 7);
}

#[test]
fn parse_falls_back_to_requested_model() {
    let json = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "ok" }] }, "finishReason": "MAX_TOKENS" }]
    })
    .to_string();
    let resp = parse_response(&json, "gemini-2.0-flash").unwrap();
    assert_eq!(resp.model, "gemini-2.0-flash");
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn parse_blocked_candidate_has_empty_text() {
    let json = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] }).to_string();
    assert!(parse_response(&json, "m").unwrap().text.is_empty());
}

#[test]
fn parse_missing_candidates() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    assert!(matches!(parse_response(&json, "m"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_uses_system_instruction_and_model_role() {
    let messages = [
        Message::user("Soal"),
        Message { role: "assistant".into(), content: "Jawab".into() },
    ];
    let body = serde_json::to_value(build_request(256, "Kamu guru.", &messages)).unwrap();
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Kamu guru.");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][1]["role"], "model");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
}

#[test]
fn request_omits_blank_system() {
    let messages = [Message::user("x")];
    let body = serde_json::to_value(build_request(10, "", &messages)).unwrap();
    assert!(body.get("systemInstruction").is_none());
}
