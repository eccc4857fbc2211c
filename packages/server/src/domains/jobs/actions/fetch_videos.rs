//! Fetch videos action - lists the channel's most recent uploads

use anyhow::Result;
use tracing::{info, warn};

use super::{enter_stage, fail_job, settle};
use crate::common::JobId;
use crate::domains::jobs::events::{PipelineEvent, MAX_VIDEOS};
use crate::domains::jobs::models::JobStatus;
use crate::kernel::ServerDeps;

/// Fetch up to [`MAX_VIDEOS`] recent videos, newest first.
///
/// Returns:
/// - `VideosFetched` with the videos stored on the job
/// - `VideosFetchFailed` when the channel has no videos or listing failed
pub async fn fetch_videos(
    job_id: JobId,
    email: &str,
    channel_id: &str,
    channel_name: &str,
    deps: &ServerDeps,
) -> Result<Option<PipelineEvent>> {
    if enter_stage(deps, job_id, JobStatus::FetchingVideos)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    let (reason, error) = match deps.video_lister.list_recent(channel_id, MAX_VIDEOS).await {
        Ok(videos) if videos.is_empty() => (
            "No videos found".to_string(),
            "No videos found for the specified channel.".to_string(),
        ),
        Ok(mut videos) => {
            videos.truncate(MAX_VIDEOS);

            let recorded = deps
                .jobs
                .update(job_id, |job| job.record_videos(videos.clone()))
                .await;
            if settle(job_id, recorded)?.is_none() {
                return Ok(None);
            }

            info!(%job_id, %channel_id, count = videos.len(), "videos fetched");
            return Ok(Some(PipelineEvent::VideosFetched {
                job_id,
                email: email.to_string(),
                videos,
                channel_id: channel_id.to_string(),
                channel_name: channel_name.to_string(),
            }));
        }
        Err(e) => (
            format!("{:#}", e),
            "Failed to fetch videos. Please try again later.".to_string(),
        ),
    };

    warn!(%job_id, %channel_id, %reason, "video fetch failed");
    if !fail_job(deps, job_id, &reason).await? {
        return Ok(None);
    }

    Ok(Some(PipelineEvent::VideosFetchFailed {
        job_id,
        email: email.to_string(),
        error,
    }))
}
