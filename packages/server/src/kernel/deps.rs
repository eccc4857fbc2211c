//! Server dependencies for effects (using traits for testability)
//!
//! This module provides the central dependency container used by the job
//! pipeline. All external services sit behind `Base*` traits so tests can
//! swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gemini_client::{ChatRequest, GeminiClient, Message};
use resend::{ResendOptions, ResendService, SendEmailRequest};
use tracing::debug;

use crate::config::Config;
use crate::domains::jobs::store::JobStore;
use crate::kernel::{
    BaseAI, BaseChannelResolver, BaseEmailSender, BaseVideoLister, EmailMessage, YouTubeClient,
};

// =============================================================================
// Gemini Adapter (implements BaseAI trait)
// =============================================================================

/// Title generation through Gemini's OpenAI-compatible endpoint
pub struct GeminiTitleGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiTitleGenerator {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl BaseAI for GeminiTitleGenerator {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(system_prompt))
            .message(Message::user(user_prompt))
            .temperature(0.7);

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                total_tokens = usage.total_tokens,
                "Gemini completion finished"
            );
        }
        Ok(response.content)
    }
}

// =============================================================================
// Resend Adapter (implements BaseEmailSender trait)
// =============================================================================

/// Wrapper around ResendService that implements BaseEmailSender trait
pub struct ResendAdapter {
    service: ResendService,
    from: String,
}

impl ResendAdapter {
    pub fn new(service: ResendService, from: impl Into<String>) -> Self {
        Self {
            service,
            from: from.into(),
        }
    }
}

#[async_trait]
impl BaseEmailSender for ResendAdapter {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let request = SendEmailRequest {
            from: self.from.clone(),
            to: vec![message.to.clone()],
            subject: message.subject.clone(),
            text: message.text.clone(),
        };

        self.service
            .send_email(&request)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to effects (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub jobs: JobStore,
    pub channel_resolver: Arc<dyn BaseChannelResolver>,
    pub video_lister: Arc<dyn BaseVideoLister>,
    pub ai: Arc<dyn BaseAI>,
    pub email_sender: Arc<dyn BaseEmailSender>,
}

impl ServerDeps {
    pub fn new(
        jobs: JobStore,
        channel_resolver: Arc<dyn BaseChannelResolver>,
        video_lister: Arc<dyn BaseVideoLister>,
        ai: Arc<dyn BaseAI>,
        email_sender: Arc<dyn BaseEmailSender>,
    ) -> Self {
        Self {
            jobs,
            channel_resolver,
            video_lister,
            ai,
            email_sender,
        }
    }

    /// Production wiring: YouTube, Gemini and Resend over an in-memory job store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut youtube = YouTubeClient::new(config.youtube_api_key.clone())
            .context("Failed to create YouTube client")?;
        if let Some(url) = &config.youtube_api_base_url {
            youtube = youtube.with_base_url(url.as_str());
        }
        let youtube = Arc::new(youtube);

        let mut gemini = GeminiClient::new(config.gemini_api_key.clone());
        if let Some(url) = &config.gemini_api_base_url {
            gemini = gemini.with_base_url(url.as_str());
        }

        let mut resend_options = ResendOptions::new(config.resend_api_key.clone());
        if let Some(url) = &config.resend_api_base_url {
            resend_options = resend_options.with_base_url(url.as_str());
        }

        Ok(Self::new(
            JobStore::in_memory(),
            youtube.clone(),
            youtube,
            Arc::new(GeminiTitleGenerator::new(gemini, &config.gemini_model)),
            Arc::new(ResendAdapter::new(
                ResendService::new(resend_options),
                &config.resend_from_email,
            )),
        ))
    }
}
