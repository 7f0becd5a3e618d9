use super::*;

#[test]
fn provider_defaults_to_anthropic() {
    assert_eq!(parse_provider(None).unwrap(), LlmProviderKind::Anthropic);
}

#[test]
fn provider_accepts_known_names() {
    assert_eq!(parse_provider(Some("openai")).unwrap(), LlmProviderKind::OpenAi);
    assert_eq!(parse_provider(Some("gemini")).unwrap(), LlmProviderKind::Gemini);
    assert_eq!(parse_provider(Some(" anthropic ")).unwrap(), LlmProviderKind::Anthropic);
}

#[test]
fn provider_rejects_unknown() {
    let err = parse_provider(Some("mistral")).unwrap_err();
    assert!(matches!(err, LlmError::ConfigParse(msg) if msg.contains("mistral")));
}

#[test]
fn every_provider_has_a_default_model() {
    for kind in [LlmProviderKind::Anthropic, LlmProviderKind::OpenAi, LlmProviderKind::Gemini] {
        assert!(!default_model(kind).is_empty());
    }
}

#[test]
fn default_timeouts() {
    let t = LlmTimeouts::default();
    assert_eq!(t.request_secs, 120);
    assert_eq!(t.connect_secs, 10);
}
