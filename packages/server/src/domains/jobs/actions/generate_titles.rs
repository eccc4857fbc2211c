//! Generate titles action - one AI call for the whole batch of videos

use anyhow::Result;
use tracing::{info, warn};

use super::{enter_stage, fail_job, settle};
use crate::common::JobId;
use crate::domains::jobs::events::PipelineEvent;
use crate::domains::jobs::models::{ImprovedTitle, JobStatus, Video};
use crate::domains::jobs::prompts::{parse_improved_titles, title_prompt, TITLE_SYSTEM_PROMPT};
use crate::domains::jobs::store::JobStoreError;
use crate::kernel::ServerDeps;

/// Ask the model for improved titles and pair them with the stored videos.
///
/// The prompt and the URLs come from the job record, never from the
/// triggering event. Any failure fails the whole batch: the job is marked
/// `failed` before `TitlesGenerationFailed` is returned, like every other
/// stage.
pub async fn generate_titles(
    job_id: JobId,
    email: &str,
    channel_name: &str,
    deps: &ServerDeps,
) -> Result<Option<PipelineEvent>> {
    let Some(job) = enter_stage(deps, job_id, JobStatus::GeneratingAiTitles).await? else {
        return Ok(None);
    };

    let reason = match request_titles(&job.videos, channel_name, deps).await {
        Ok(improved_titles) => {
            let recorded = deps
                .jobs
                .update(job_id, |job| job.record_titles(improved_titles.clone()))
                .await;
            match recorded {
                Err(JobStoreError::Rejected(rejection)) if !rejection.is_stale() => {
                    rejection.to_string()
                }
                recorded => {
                    if settle(job_id, recorded)?.is_none() {
                        return Ok(None);
                    }
                    info!(%job_id, count = improved_titles.len(), "improved titles ready");
                    return Ok(Some(PipelineEvent::TitlesReady {
                        job_id,
                        email: email.to_string(),
                        improved_titles,
                        channel_name: channel_name.to_string(),
                    }));
                }
            }
        }
        Err(reason) => reason,
    };

    warn!(%job_id, %reason, "title generation failed");
    if !fail_job(deps, job_id, &reason).await? {
        return Ok(None);
    }

    Ok(Some(PipelineEvent::TitlesGenerationFailed {
        job_id,
        email: email.to_string(),
        error: format!("Failed to generate improved AI titles: {}", reason),
    }))
}

async fn request_titles(
    videos: &[Video],
    channel_name: &str,
    deps: &ServerDeps,
) -> Result<Vec<ImprovedTitle>, String> {
    if videos.is_empty() {
        return Err("No videos recorded for job".to_string());
    }

    let prompt = title_prompt(channel_name, videos);
    let raw = deps
        .ai
        .complete(TITLE_SYSTEM_PROMPT, &prompt)
        .await
        .map_err(|e| format!("{:#}", e))?;

    parse_improved_titles(&raw, videos).map_err(|e| e.to_string())
}
