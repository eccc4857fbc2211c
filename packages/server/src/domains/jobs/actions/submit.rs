//! Submit action - validates a request, creates the job and starts the pipeline

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domains::jobs::events::PipelineEvent;
use crate::domains::jobs::models::Job;
use crate::domains::jobs::store::JobStoreError;
use crate::domains::jobs::AppEngine;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Inbound `{channel, email}` body. Missing fields decode as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitRequest {
    pub channel: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Missing channel or email")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Internal Server Error")]
    Store(#[from] JobStoreError),
}

impl SubmitError {
    /// Client input errors, as opposed to internal failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SubmitError::MissingFields | SubmitError::InvalidEmail)
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Create a queued job and emit `submitted`.
///
/// Nothing is written and nothing is emitted unless validation passes.
/// The pipeline runs in the background; the queued job is returned at once.
pub async fn submit_job(engine: &AppEngine, request: SubmitRequest) -> Result<Job, SubmitError> {
    let channel = request.channel.trim();
    let email = request.email.trim();

    if channel.is_empty() || email.is_empty() {
        return Err(SubmitError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(SubmitError::InvalidEmail);
    }

    let job = engine.deps().jobs.create(Job::new(channel, email)).await?;

    let correlation_id = engine.emit(PipelineEvent::Submitted {
        job_id: job.job_id,
        channel: job.channel.clone(),
        email: job.email.clone(),
    });
    info!(job_id = %job.job_id, %correlation_id, channel = %job.channel, "job submitted");

    Ok(job)
}
