use super::*;
use craving::conversation::ConversationState;
use craving::suggest::Suggestion;

fn reply(names: &[&str]) -> SuggestionResponse {
    let suggestions = names
        .iter()
        .map(|name| Suggestion {
            name: (*name).to_owned(),
            description: String::new(),
            ingredients: Vec::new(),
            reasoning: String::new(),
        })
        .collect();
    SuggestionResponse { suggestions, provider: "gemini".into() }
}

#[test]
fn commands_map_to_actions() {
    let mut conversation = Conversation::new();
    assert_eq!(handle_line("/quit", &mut conversation), LineAction::Quit);
    assert_eq!(handle_line(" /exit ", &mut conversation), LineAction::Quit);
    assert_eq!(handle_line("/help", &mut conversation), LineAction::Help);
    assert_eq!(handle_line("/settings", &mut conversation), LineAction::ShowSettings);
    assert_eq!(handle_line("   ", &mut conversation), LineAction::Ignore);
    assert!(conversation.turns().is_empty());
}

#[test]
fn text_line_starts_a_request() {
    let mut conversation = Conversation::new();
    let LineAction::Send(pending) = handle_line("spicy chicken", &mut conversation) else {
        panic!("expected a request to start");
    };
    assert_eq!(pending.request().user_input, "spicy chicken");
    assert_eq!(conversation.state(), ConversationState::Pending);
    assert_eq!(conversation.turns().len(), 1);
}

#[test]
fn text_while_pending_is_busy_and_kept_as_draft() {
    let mut conversation = Conversation::new();
    assert!(matches!(handle_line("ramen", &mut conversation), LineAction::Send(_)));

    assert_eq!(handle_line("pizza", &mut conversation), LineAction::Busy);
    assert_eq!(conversation.turns().len(), 1);
    assert_eq!(conversation.input(), "pizza");
}

#[test]
fn new_while_pending_resets_and_drops_late_reply() {
    let mut conversation = Conversation::new();
    let LineAction::Send(stale) = handle_line("ramen", &mut conversation) else {
        panic!("expected a request to start");
    };

    assert_eq!(handle_line("/new", &mut conversation), LineAction::Reset);
    assert!(conversation.turns().is_empty());
    assert!(!conversation.is_pending());

    assert!(matches!(handle_line("pizza", &mut conversation), LineAction::Send(_)));
    assert!(conversation.settle(stale, Ok(reply(&["Shoyu"]))).is_none());
    assert_eq!(conversation.turns().len(), 1);
    assert!(conversation.is_pending());
}
