//! Conversation state — the turn log and its submission state machine.
//!
//! DESIGN
//! ======
//! A submission is split into [`Conversation::begin`] and
//! [`Conversation::settle`] so the request can run while the caller keeps
//! handling input. `begin` appends the user turn and enters
//! [`ConversationState::Pending`]; `settle` appends exactly one assistant
//! turn and returns to `Idle`. A second `begin` while pending is rejected.
//!
//! `reset` bumps an epoch counter. A [`PendingSubmission`] issued before the
//! reset carries the old epoch, and its eventual result is discarded instead
//! of landing in the fresh log.

use std::fmt;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::suggest::{Suggestion, SuggestionRequest, SuggestionResponse, SuggestionSource, SuggestError};

/// Assistant reply when the suggestion request fails for any reason.
pub const ERROR_REPLY: &str = "Sorry, I couldn't get suggestions. Please make sure the backend is running.";

/// Assistant reply introducing `count` suggestions.
#[must_use]
pub fn success_reply(count: usize) -> String {
    format!("Here are {count} delicious suggestions for you:")
}

// =============================================================================
// TYPES
// =============================================================================

/// Turn identifier, increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the log. Fields are read-only once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    id: TurnId,
    role: Role,
    text: String,
    suggestions: Vec<Suggestion>,
    created_at: OffsetDateTime,
}

impl Turn {
    #[must_use]
    pub fn id(&self) -> TurnId {
        self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Empty for user turns and for failed requests.
    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    Pending,
}

/// Ticket for an accepted submission; hand it back to
/// [`Conversation::settle`] with the request's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingSubmission {
    epoch: u64,
    request: SuggestionRequest,
}

impl PendingSubmission {
    #[must_use]
    pub fn request(&self) -> &SuggestionRequest {
        &self.request
    }
}

// =============================================================================
// CONVERSATION
// =============================================================================

#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    input: String,
    state: ConversationState,
    next_id: u64,
    epoch: u64,
    preferences: Option<String>,
    cuisine_type: Option<String>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach dietary preferences and a cuisine to every later request.
    /// Blank values are treated as absent.
    #[must_use]
    pub fn with_filters(mut self, preferences: Option<String>, cuisine_type: Option<String>) -> Self {
        self.preferences = non_blank(preferences);
        self.cuisine_type = non_blank(cuisine_type);
        self
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    #[must_use]
    pub fn state(&self) -> ConversationState {
        self.state
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == ConversationState::Pending
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Accept `text` as a new submission.
    ///
    /// Returns `None` without touching the log when `text` is blank or a
    /// submission is already pending. Otherwise appends the user turn,
    /// clears the input buffer, and enters `Pending`.
    pub fn begin(&mut self, text: &str) -> Option<PendingSubmission> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_pending() {
            debug!("submission rejected while another is pending");
            return None;
        }

        self.push_turn(Role::User, text.to_owned(), Vec::new());
        self.input.clear();
        self.state = ConversationState::Pending;

        let request = SuggestionRequest::new(text)
            .with_preferences(self.preferences.clone())
            .with_cuisine_type(self.cuisine_type.clone());
        Some(PendingSubmission { epoch: self.epoch, request })
    }

    /// Record the outcome of `pending` as one assistant turn and return to
    /// `Idle`. Results for submissions made before the last [`reset`] are
    /// dropped and `None` is returned.
    ///
    /// [`reset`]: Conversation::reset
    pub fn settle(
        &mut self,
        pending: PendingSubmission,
        result: Result<SuggestionResponse, SuggestError>,
    ) -> Option<TurnId> {
        if pending.epoch != self.epoch {
            debug!(epoch = pending.epoch, current = self.epoch, "discarding result for reset conversation");
            return None;
        }

        let id = match result {
            Ok(response) => {
                let text = success_reply(response.suggestions.len());
                self.push_turn(Role::Assistant, text, response.suggestions)
            }
            Err(e) => {
                warn!(error = %e, "suggestion request failed");
                self.push_turn(Role::Assistant, ERROR_REPLY.to_owned(), Vec::new())
            }
        };
        self.state = ConversationState::Idle;
        Some(id)
    }

    /// `begin`, await `source`, then `settle`. Returns the assistant turn,
    /// or `None` when the submission was not accepted.
    pub async fn submit<S>(&mut self, text: &str, source: &S) -> Option<TurnId>
    where
        S: SuggestionSource + ?Sized,
    {
        let pending = self.begin(text)?;
        let result = source.request_suggestions(pending.request()).await;
        self.settle(pending, result)
    }

    /// Empty the log and input buffer. Allowed at any time; an in-flight
    /// request keeps running but its result will be discarded.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.input.clear();
        self.state = ConversationState::Idle;
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn push_turn(&mut self, role: Role, text: String, suggestions: Vec<Suggestion>) -> TurnId {
        self.next_id += 1;
        let id = TurnId(self.next_id);
        self.turns.push(Turn { id, role, text, suggestions, created_at: OffsetDateTime::now_utc() });
        id
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
