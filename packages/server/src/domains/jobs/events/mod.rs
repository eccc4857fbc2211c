//! Job pipeline events
//!
//! Every event is a fact published under a stable topic name. Success events
//! trigger the next stage; failure events are terminal.
//!
//! ```text
//! submitted ─► channel_resolved ─► videos_fetched ─► titles_ready ─► email_sent
//!     │               │                  │                │
//!     ▼               ▼                  ▼                ▼
//! channel_      videos_fetch_     titles_generation_  email_error
//! resolution_   failed            failed
//! failed
//! ```
//!
//! On the wire an event is `{"topic": "<name>", "payload": {camelCase fields}}`,
//! which is also the shape accepted by `Engine::emit_raw`.

use seesaw::Event;
use serde::{Deserialize, Serialize};

use crate::common::JobId;
use crate::domains::jobs::models::{ImprovedTitle, Video};

/// Most recent uploads considered per channel.
pub const MAX_VIDEOS: usize = 5;

/// Topic names, usable in subscriptions and logs.
pub mod topics {
    pub const SUBMITTED: &str = "submitted";
    pub const CHANNEL_RESOLVED: &str = "channel_resolved";
    pub const CHANNEL_RESOLUTION_FAILED: &str = "channel_resolution_failed";
    pub const VIDEOS_FETCHED: &str = "videos_fetched";
    pub const VIDEOS_FETCH_FAILED: &str = "videos_fetch_failed";
    pub const TITLES_READY: &str = "titles_ready";
    pub const TITLES_GENERATION_FAILED: &str = "titles_generation_failed";
    pub const EMAIL_SENT: &str = "email_sent";
    pub const EMAIL_ERROR: &str = "email_error";
}

/// Job pipeline events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "topic",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum PipelineEvent {
    /// A job was created and queued
    Submitted {
        job_id: JobId,
        channel: String,
        email: String,
    },

    ChannelResolved {
        job_id: JobId,
        email: String,
        channel_id: String,
        channel_name: String,
    },

    ChannelResolutionFailed {
        job_id: JobId,
        email: String,
        error: String,
    },

    VideosFetched {
        job_id: JobId,
        email: String,
        videos: Vec<Video>,
        channel_id: String,
        channel_name: String,
    },

    VideosFetchFailed {
        job_id: JobId,
        email: String,
        error: String,
    },

    TitlesReady {
        job_id: JobId,
        email: String,
        improved_titles: Vec<ImprovedTitle>,
        channel_name: String,
    },

    TitlesGenerationFailed {
        job_id: JobId,
        email: String,
        error: String,
    },

    EmailSent {
        job_id: JobId,
        email: String,
        channel_name: String,
    },

    EmailError {
        job_id: JobId,
        error: String,
    },
}

impl PipelineEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            PipelineEvent::Submitted { job_id, .. }
            | PipelineEvent::ChannelResolved { job_id, .. }
            | PipelineEvent::ChannelResolutionFailed { job_id, .. }
            | PipelineEvent::VideosFetched { job_id, .. }
            | PipelineEvent::VideosFetchFailed { job_id, .. }
            | PipelineEvent::TitlesReady { job_id, .. }
            | PipelineEvent::TitlesGenerationFailed { job_id, .. }
            | PipelineEvent::EmailSent { job_id, .. }
            | PipelineEvent::EmailError { job_id, .. } => *job_id,
        }
    }

    /// Failure exits of the pipeline.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PipelineEvent::ChannelResolutionFailed { .. }
                | PipelineEvent::VideosFetchFailed { .. }
                | PipelineEvent::TitlesGenerationFailed { .. }
                | PipelineEvent::EmailError { .. }
        )
    }

    /// Events no stage subscribes to.
    pub fn is_terminal(&self) -> bool {
        self.is_failure() || matches!(self, PipelineEvent::EmailSent { .. })
    }
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be blank", field))
    } else {
        Ok(())
    }
}

impl Event for PipelineEvent {
    fn topic(&self) -> &'static str {
        match self {
            PipelineEvent::Submitted { .. } => topics::SUBMITTED,
            PipelineEvent::ChannelResolved { .. } => topics::CHANNEL_RESOLVED,
            PipelineEvent::ChannelResolutionFailed { .. } => topics::CHANNEL_RESOLUTION_FAILED,
            PipelineEvent::VideosFetched { .. } => topics::VIDEOS_FETCHED,
            PipelineEvent::VideosFetchFailed { .. } => topics::VIDEOS_FETCH_FAILED,
            PipelineEvent::TitlesReady { .. } => topics::TITLES_READY,
            PipelineEvent::TitlesGenerationFailed { .. } => topics::TITLES_GENERATION_FAILED,
            PipelineEvent::EmailSent { .. } => topics::EMAIL_SENT,
            PipelineEvent::EmailError { .. } => topics::EMAIL_ERROR,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            PipelineEvent::Submitted { channel, email, .. } => {
                require("channel", channel)?;
                require("email", email)
            }
            PipelineEvent::ChannelResolved {
                email,
                channel_id,
                channel_name,
                ..
            } => {
                require("email", email)?;
                require("channelId", channel_id)?;
                require("channelName", channel_name)
            }
            PipelineEvent::VideosFetched {
                email,
                videos,
                channel_id,
                ..
            } => {
                require("email", email)?;
                require("channelId", channel_id)?;
                if videos.is_empty() {
                    return Err("videos must not be empty".into());
                }
                if videos.len() > MAX_VIDEOS {
                    return Err(format!(
                        "at most {} videos allowed, got {}",
                        MAX_VIDEOS,
                        videos.len()
                    ));
                }
                Ok(())
            }
            PipelineEvent::TitlesReady {
                email,
                improved_titles,
                ..
            } => {
                require("email", email)?;
                if improved_titles.is_empty() {
                    return Err("improvedTitles must not be empty".into());
                }
                Ok(())
            }
            PipelineEvent::EmailSent { email, .. } => require("email", email),
            PipelineEvent::ChannelResolutionFailed { email, error, .. }
            | PipelineEvent::VideosFetchFailed { email, error, .. }
            | PipelineEvent::TitlesGenerationFailed { email, error, .. } => {
                require("email", email)?;
                require("error", error)
            }
            PipelineEvent::EmailError { error, .. } => require("error", error),
        }
    }
}
