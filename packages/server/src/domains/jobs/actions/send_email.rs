//! Send email action - delivers the improved titles to the requester

use anyhow::Result;
use tracing::{info, warn};

use super::{enter_stage, settle};
use crate::common::JobId;
use crate::domains::jobs::events::PipelineEvent;
use crate::domains::jobs::models::{ImprovedTitle, JobStatus};
use crate::domains::jobs::templates::{email_body, email_subject};
use crate::kernel::{EmailMessage, ServerDeps};

/// Render the results email and send it to `email`.
///
/// Returns:
/// - `EmailSent` once the provider accepted the message
/// - `EmailError` with the raw failure message otherwise
pub async fn send_email(
    job_id: JobId,
    email: &str,
    improved_titles: &[ImprovedTitle],
    channel_name: &str,
    deps: &ServerDeps,
) -> Result<Option<PipelineEvent>> {
    if enter_stage(deps, job_id, JobStatus::SendingEmail)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    let message = EmailMessage {
        to: email.to_string(),
        subject: email_subject(channel_name),
        text: email_body(channel_name, improved_titles),
    };

    match deps.email_sender.send(&message).await {
        Ok(()) => {
            let recorded = deps
                .jobs
                .update(job_id, |job| job.transition(JobStatus::EmailSent))
                .await;
            if settle(job_id, recorded)?.is_none() {
                return Ok(None);
            }

            info!(%job_id, to = %email, "results email sent");
            Ok(Some(PipelineEvent::EmailSent {
                job_id,
                email: email.to_string(),
                channel_name: channel_name.to_string(),
            }))
        }
        Err(e) => {
            let error = format!("{:#}", e);
            warn!(%job_id, %error, "results email failed");

            let recorded = deps
                .jobs
                .update(job_id, |job| job.fail_email(&error))
                .await;
            if settle(job_id, recorded)?.is_none() {
                return Ok(None);
            }

            Ok(Some(PipelineEvent::EmailError { job_id, error }))
        }
    }
}
