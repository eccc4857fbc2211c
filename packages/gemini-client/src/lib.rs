//! Gemini chat-completions client
//!
//! Talks to Gemini through its OpenAI-compatible REST surface, so requests
//! and responses use the familiar chat-completions shape.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{ChatRequest, GeminiClient, Message};
//!
//! let client = GeminiClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("gemini-2.0-flash")
//!         .message(Message::system("You are terse."))
//!         .message(Message::user("Hello!")),
//! ).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// OpenAI-compatible endpoint for Gemini.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (proxies, local fakes).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns the first choice's content. A choice without content yields an
    /// empty string; a response without choices is [`GeminiError::NoChoices`].
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let choice = raw.choices.into_iter().next().ok_or(GeminiError::NoChoices)?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .unwrap_or_default();

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            content_len = content.len(),
            "Gemini chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }
}
