// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Stage logic lives in domains/jobs/effects and talks to collaborators
// through these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseEmailSender)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::jobs::models::Video;

// =============================================================================
// Channel Resolution (Infrastructure - video platform lookup)
// =============================================================================

/// How a user-supplied channel string is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelQuery {
    /// `@handle` - searched by handle (sigil removed)
    Handle(String),
    /// Anything else - legacy username lookup
    Username(String),
}

impl ChannelQuery {
    pub fn parse(channel: &str) -> Self {
        let channel = channel.trim();
        match channel.strip_prefix('@') {
            Some(handle) => ChannelQuery::Handle(handle.to_string()),
            None => ChannelQuery::Username(channel.to_string()),
        }
    }

    /// Nothing left to look up, e.g. a bare `@`.
    pub fn is_empty(&self) -> bool {
        match self {
            ChannelQuery::Handle(name) | ChannelQuery::Username(name) => name.trim().is_empty(),
        }
    }
}

/// A resolved channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub channel_id: String,
    pub channel_name: String,
}

#[async_trait]
pub trait BaseChannelResolver: Send + Sync {
    /// Resolve a channel. `Ok(None)` means no channel matched.
    async fn resolve(&self, query: &ChannelQuery) -> Result<Option<ResolvedChannel>>;
}

// =============================================================================
// Content Listing (Infrastructure - recent uploads)
// =============================================================================

#[async_trait]
pub trait BaseVideoLister: Send + Sync {
    /// Most recent uploads for a channel, newest first, at most `max_results`.
    async fn list_recent(&self, channel_id: &str, max_results: usize) -> Result<Vec<Video>>;
}

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a system + user prompt pair (returns raw text response).
    ///
    /// An empty string means the model answered without content.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

// =============================================================================
// Email Delivery (Infrastructure)
// =============================================================================

/// A plain-text message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait BaseEmailSender: Send + Sync {
    /// Send one message. Non-2xx responses are errors carrying status and body.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}
