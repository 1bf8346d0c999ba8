//! Suggestion service client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The suggestion service owns all natural-language work. This module only
//! shapes the `POST /suggest` exchange, passes provider credentials through
//! as headers, and turns the response into typed suggestions.

pub mod client;
pub mod types;

pub use client::SuggestionClient;
pub use types::{HealthStatus, ModelInfo, ModelList, Suggestion, SuggestionRequest, SuggestionResponse, SuggestError};

/// Anything that can answer a suggestion request. Implemented by
/// [`SuggestionClient`]; tests substitute in-process fakes.
#[async_trait::async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn request_suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestError>;
}
