//! Plain-text rendering for the terminal front end.
//!
//! Everything here is presentation: functions take state and return
//! strings so the chat loop decides where output goes.

use crate::conversation::{Role, Turn};
use crate::credentials::{CredentialStore, KeyValueStore, Provider};
use crate::suggest::{HealthStatus, ModelList, Suggestion};

const KEY_TAIL_CHARS: usize = 4;

/// `[HH:MM UTC] you> text` for user turns; assistant turns also list a
/// card per suggestion.
#[must_use]
pub fn render_turn(turn: &Turn) -> String {
    let at = turn.created_at();
    let speaker = match turn.role() {
        Role::User => "you",
        Role::Assistant => "chef",
    };
    let mut out = format!("[{:02}:{:02} UTC] {speaker}> {}\n", at.hour(), at.minute(), turn.text());
    for (index, suggestion) in turn.suggestions().iter().enumerate() {
        out.push_str(&render_suggestion(index + 1, suggestion));
    }
    out
}

#[must_use]
pub fn render_suggestion(number: usize, suggestion: &Suggestion) -> String {
    format!(
        "\n  {number}. {name}\n     {description}\n     Ingredients: {ingredients}\n     Why: {reasoning}\n",
        name = suggestion.name,
        description = suggestion.description,
        ingredients = suggestion.ingredients.join(", "),
        reasoning = suggestion.reasoning,
    )
}

/// Key status without revealing the key: `not set` or `set (...abcd)`.
#[must_use]
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "not set".to_owned();
    }
    let count = key.chars().count();
    if count <= KEY_TAIL_CHARS {
        return "set".to_owned();
    }
    let tail: String = key.chars().skip(count - KEY_TAIL_CHARS).collect();
    format!("set (...{tail})")
}

/// Settings summary: active provider, each provider's key status, and
/// whether requests will carry credentials.
#[must_use]
pub fn render_settings<S: KeyValueStore>(store: &CredentialStore<S>) -> String {
    let keys: String = Provider::ALL
        .iter()
        .map(|provider| format!("{} key: {}\n", provider.display_name(), mask_key(&store.load(*provider))))
        .collect();
    let sending = match store.credential() {
        Some(credential) => format!("yes ({})", credential.provider),
        None => "no".to_owned(),
    };
    format!(
        "active provider: {}\n{keys}credentials sent with requests: {sending}\n",
        store.active_provider().display_name()
    )
}

#[must_use]
pub fn render_health(health: &HealthStatus) -> String {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    format!(
        "status: {}\nservice provider: {}\nopenai configured: {}\ngemini configured: {}\n",
        health.status,
        health.ai_provider.as_deref().unwrap_or("unknown"),
        yes_no(health.openai_configured),
        yes_no(health.gemini_configured),
    )
}

#[must_use]
pub fn render_models(list: &ModelList) -> String {
    let models: String = list
        .models
        .iter()
        .map(|model| format!("  {} ({})\n", model.name, model.display_name))
        .collect();
    format!("{} model(s)\n{models}", list.count)
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
