use super::*;
use crate::conversation::Conversation;
use crate::credentials::MemoryStore;
use crate::suggest::{ModelInfo, SuggestionResponse};

fn dish() -> Suggestion {
    Suggestion {
        name: "Dan Dan Noodles".into(),
        description: "Sichuan noodles in chili oil".into(),
        ingredients: vec!["noodles".into(), "pork".into(), "chili oil".into()],
        reasoning: "numbing heat".into(),
    }
}

#[test]
fn suggestion_card_lists_every_field() {
    let card = render_suggestion(1, &dish());
    assert!(card.contains("1. Dan Dan Noodles"));
    assert!(card.contains("Sichuan noodles in chili oil"));
    assert!(card.contains("Ingredients: noodles, pork, chili oil"));
    assert!(card.contains("Why: numbing heat"));
}

#[test]
fn assistant_turn_renders_cards_in_order() {
    let mut conversation = Conversation::new();
    let pending = conversation.begin("noodles").unwrap();
    let mut second = dish();
    second.name = "Pad Thai".into();
    let response = SuggestionResponse { suggestions: vec![dish(), second], provider: "gemini".into() };
    let id = conversation.settle(pending, Ok(response)).unwrap();

    let user = render_turn(&conversation.turns()[0]);
    assert!(user.contains("you> noodles"));
    assert!(user.starts_with('['));
    assert!(user.contains(" UTC] you>"));

    let rendered = render_turn(conversation.turn(id).unwrap());
    assert!(rendered.contains("chef> Here are 2 delicious suggestions for you:"));
    let first = rendered.find("1. Dan Dan Noodles").unwrap();
    let second = rendered.find("2. Pad Thai").unwrap();
    assert!(first < second);
}

#[test]
fn mask_key_hides_all_but_tail() {
    assert_eq!(mask_key(""), "not set");
    assert_eq!(mask_key("abc"), "set");
    assert_eq!(mask_key("sk-test-1234"), "set (...1234)");
}

#[test]
fn settings_reports_gate() {
    let mut store = CredentialStore::new(MemoryStore::default());
    let empty = render_settings(&store);
    assert!(empty.contains("active provider: Gemini"));
    assert!(empty.contains("credentials sent with requests: no"));

    store.save(Provider::OpenAi, "sk-test-9876");
    let saved = render_settings(&store);
    assert!(saved.contains("OpenAI key: set (...9876)"));
    assert!(saved.contains("Gemini key: not set"));
    assert!(saved.contains("credentials sent with requests: yes (openai)"));
    assert!(!saved.contains("sk-test-9876"));
}

#[test]
fn health_and_models_render() {
    let health = HealthStatus {
        status: "healthy".into(),
        ai_provider: Some("gemini".into()),
        openai_configured: false,
        gemini_configured: true,
    };
    let out = render_health(&health);
    assert!(out.contains("service provider: gemini"));
    assert!(out.contains("gemini configured: yes"));

    let list = ModelList {
        count: 1,
        models: vec![ModelInfo {
            name: "models/gemini-2.0-flash".into(),
            display_name: "Gemini 2.0 Flash".into(),
            description: None,
            supported_methods: vec!["generateContent".into()],
        }],
    };
    assert!(render_models(&list).contains("models/gemini-2.0-flash (Gemini 2.0 Flash)"));
}
