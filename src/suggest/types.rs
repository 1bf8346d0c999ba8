//! Wire types for the suggestion service and client errors.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by suggestion client operations. Callers presenting
/// results to a user collapse all of these into one generic failure.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A stored credential cannot be sent as a header value.
    #[error("invalid header value for {header}")]
    InvalidHeader { header: &'static str },

    /// The request could not be assembled.
    #[error("request build failed: {0}")]
    RequestBuild(String),

    /// The request never produced a response (connect, DNS, body read).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("request failed: status {status}")]
    RequestFailed { status: u16 },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// SUGGEST
// =============================================================================

/// Body of `POST /suggest`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SuggestionRequest {
    pub user_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
}

impl SuggestionRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self { user_input: user_input.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: Option<String>) -> Self {
        self.preferences = preferences;
        self
    }

    #[must_use]
    pub fn with_cuisine_type(mut self, cuisine_type: Option<String>) -> Self {
        self.cuisine_type = cuisine_type;
        self
    }
}

/// One recommended dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub reasoning: String,
}

/// Successful `POST /suggest` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    /// Provider the service actually used.
    pub provider: String,
}

// =============================================================================
// SERVICE INFO
// =============================================================================

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub ai_provider: Option<String>,
    #[serde(default)]
    pub openai_configured: bool,
    #[serde(default)]
    pub gemini_configured: bool,
}

/// `GET /models/gemini` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelList {
    pub count: usize,
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub supported_methods: Vec<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
