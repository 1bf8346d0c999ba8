//! HTTP client for the suggestion service.
//!
//! One call issues exactly one request: no retry, no caching, and no
//! client-side timeout beyond what the network stack imposes.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::SuggestionSource;
use super::types::{HealthStatus, ModelList, SuggestError, SuggestionRequest, SuggestionResponse};
use crate::config::ClientConfig;
use crate::credentials::{Credential, CredentialSource};

pub const PROVIDER_HEADER: &str = "x-ai-provider";

pub struct SuggestionClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl SuggestionClient {
    /// Build a client for `config`. `credentials` is consulted on every
    /// request, so keys saved later are picked up without rebuilding.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestError::HttpClientBuild`] if the HTTP stack cannot
    /// be initialised.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self, SuggestError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SuggestError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config, credentials })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Assemble `POST /suggest` without sending it.
    ///
    /// # Errors
    ///
    /// Fails when a stored key is not a valid header value.
    pub fn build_request(&self, request: &SuggestionRequest) -> Result<reqwest::Request, SuggestError> {
        let mut builder = self.http.post(self.config.endpoint("/suggest")).json(request);
        if let Some(credential) = self.credentials.credential() {
            builder = builder.headers(credential_headers(&credential)?);
        }
        builder
            .build()
            .map_err(|e| SuggestError::RequestBuild(e.to_string()))
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Transport, status, and parse failures as for suggestions.
    pub async fn health(&self) -> Result<HealthStatus, SuggestError> {
        self.get_json("/health").await
    }

    /// `GET /models/gemini`: Gemini models the service can use.
    ///
    /// # Errors
    ///
    /// Transport, status, and parse failures as for suggestions.
    pub async fn gemini_models(&self) -> Result<ModelList, SuggestError> {
        self.get_json("/models/gemini").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SuggestError> {
        let url = self.config.endpoint(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| SuggestError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SuggestionSource for SuggestionClient {
    async fn request_suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestError> {
        let http_request = self.build_request(request)?;
        debug!(
            url = %http_request.url(),
            credentialed = http_request.headers().contains_key(PROVIDER_HEADER),
            "sending suggestion request"
        );
        let response = self
            .http
            .execute(http_request)
            .await
            .map_err(|e| SuggestError::Transport(e.to_string()))?;
        let body = read_success_body(response).await?;
        let parsed = parse_suggestion_response(&body)?;
        debug!(count = parsed.suggestions.len(), provider = %parsed.provider, "suggestions received");
        Ok(parsed)
    }
}

/// `X-AI-Provider` plus the provider-specific key header.
fn credential_headers(credential: &Credential) -> Result<HeaderMap, SuggestError> {
    let key_header = credential.provider.key_header();
    let mut key_value =
        HeaderValue::from_str(&credential.api_key).map_err(|_| SuggestError::InvalidHeader { header: key_header })?;
    key_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(PROVIDER_HEADER),
        HeaderValue::from_static(credential.provider.id()),
    );
    headers.insert(HeaderName::from_static(key_header), key_value);
    Ok(headers)
}

async fn read_success_body(response: reqwest::Response) -> Result<String, SuggestError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SuggestError::RequestFailed { status: status.as_u16() });
    }
    response
        .text()
        .await
        .map_err(|e| SuggestError::Transport(e.to_string()))
}

pub(crate) fn parse_suggestion_response(body: &str) -> Result<SuggestionResponse, SuggestError> {
    serde_json::from_str(body).map_err(|e| SuggestError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
