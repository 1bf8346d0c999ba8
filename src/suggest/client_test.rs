use super::*;
use crate::credentials::{MemoryStore, Provider, SharedCredentials, shared};
use serde_json::{Value, json};

fn client_with(creds: &SharedCredentials<MemoryStore>) -> SuggestionClient {
    SuggestionClient::new(ClientConfig::new("http://food.test/"), creds.clone()).unwrap()
}

fn body_json(request: &reqwest::Request) -> Value {
    let bytes = request.body().and_then(reqwest::Body::as_bytes).unwrap();
    serde_json::from_slice(bytes).unwrap()
}

// =============================================================
// build_request
// =============================================================

#[test]
fn posts_json_to_suggest_endpoint() {
    let creds = shared(MemoryStore::default());
    let request = client_with(&creds)
        .build_request(&SuggestionRequest::new("spicy chicken"))
        .unwrap();
    assert_eq!(request.method(), reqwest::Method::POST);
    assert_eq!(request.url().as_str(), "http://food.test/suggest");
    assert_eq!(request.headers()["content-type"], "application/json");
    assert_eq!(body_json(&request), json!({ "user_input": "spicy chicken" }));
}

#[test]
fn no_credential_headers_without_saved_key() {
    let creds = shared(MemoryStore::default());
    let request = client_with(&creds)
        .build_request(&SuggestionRequest::new("soup"))
        .unwrap();
    assert!(!request.headers().contains_key("X-AI-Provider"));
    assert!(!request.headers().contains_key("X-OpenAI-API-Key"));
    assert!(!request.headers().contains_key("X-Gemini-API-Key"));
}

#[test]
fn openai_credential_attaches_openai_headers() {
    let creds = shared(MemoryStore::default());
    creds.lock().unwrap().save(Provider::OpenAi, "sk-test");
    let request = client_with(&creds)
        .build_request(&SuggestionRequest::new("soup"))
        .unwrap();
    assert_eq!(request.headers()["X-AI-Provider"], "openai");
    assert_eq!(request.headers()["X-OpenAI-API-Key"], "sk-test");
    assert!(!request.headers().contains_key("X-Gemini-API-Key"));
}

#[test]
fn gemini_credential_attaches_gemini_headers() {
    let creds = shared(MemoryStore::default());
    creds.lock().unwrap().save(Provider::Gemini, "gm-key");
    let request = client_with(&creds)
        .build_request(&SuggestionRequest::new("soup"))
        .unwrap();
    assert_eq!(request.headers()["X-AI-Provider"], "gemini");
    assert_eq!(request.headers()["X-Gemini-API-Key"], "gm-key");
}

#[test]
fn switching_to_provider_without_key_sends_neither_header() {
    let creds = shared(MemoryStore::default());
    creds.lock().unwrap().save(Provider::OpenAi, "sk-test");
    creds.lock().unwrap().set_active_provider(Provider::Gemini);
    let request = client_with(&creds)
        .build_request(&SuggestionRequest::new("soup"))
        .unwrap();
    assert!(!request.headers().contains_key("X-AI-Provider"));
    assert!(!request.headers().contains_key("X-OpenAI-API-Key"));
}

#[test]
fn credentials_are_read_at_call_time() {
    let creds = shared(MemoryStore::default());
    let client = client_with(&creds);
    assert!(!client.build_request(&SuggestionRequest::new("a")).unwrap().headers().contains_key(PROVIDER_HEADER));

    creds.lock().unwrap().save(Provider::Gemini, "gm-key");
    assert!(client.build_request(&SuggestionRequest::new("a")).unwrap().headers().contains_key(PROVIDER_HEADER));
}

#[test]
fn key_with_newline_is_rejected() {
    let creds = shared(MemoryStore::default());
    creds.lock().unwrap().save(Provider::OpenAi, "sk-bad\nkey");
    let err = client_with(&creds)
        .build_request(&SuggestionRequest::new("soup"))
        .unwrap_err();
    assert!(matches!(err, SuggestError::InvalidHeader { header: "x-openai-api-key" }));
}

// =============================================================
// response parsing
// =============================================================

#[test]
fn parse_valid_response() {
    let body = json!({
        "suggestions": [{ "name": "Pho", "description": "Broth", "ingredients": ["beef"], "reasoning": "warm" }],
        "provider": "openai"
    })
    .to_string();
    let parsed = parse_suggestion_response(&body).unwrap();
    assert_eq!(parsed.suggestions.len(), 1);
    assert_eq!(parsed.provider, "openai");
}

#[test]
fn parse_garbage_is_parse_error() {
    assert!(matches!(parse_suggestion_response("<html>"), Err(SuggestError::Parse(_))));
}
