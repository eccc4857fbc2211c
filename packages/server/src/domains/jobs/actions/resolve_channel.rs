//! Resolve channel action - turns the submitted channel string into a channel id

use anyhow::Result;
use tracing::{info, warn};

use super::{enter_stage, fail_job, settle};
use crate::common::JobId;
use crate::domains::jobs::events::PipelineEvent;
use crate::domains::jobs::models::JobStatus;
use crate::kernel::{ChannelQuery, ServerDeps};

const CHANNEL_NOT_FOUND: &str = "Channel not found";

/// Resolve `channel` (`@handle` or legacy username) for a queued job.
///
/// Returns:
/// - `ChannelResolved` with the channel id and display name
/// - `ChannelResolutionFailed` when nothing matched or the lookup failed
pub async fn resolve_channel(
    job_id: JobId,
    channel: &str,
    email: &str,
    deps: &ServerDeps,
) -> Result<Option<PipelineEvent>> {
    if enter_stage(deps, job_id, JobStatus::ResolvingChannel)
        .await?
        .is_none()
    {
        return Ok(None);
    }

    // A bare sigil would search for nothing and match an arbitrary channel
    let query = ChannelQuery::parse(channel);
    let lookup = if query.is_empty() {
        Ok(None)
    } else {
        deps.channel_resolver.resolve(&query).await
    };
    let (reason, error) = match lookup {
        Ok(Some(resolved)) => {
            let recorded = deps
                .jobs
                .update(job_id, |job| {
                    job.record_channel(&resolved.channel_id, &resolved.channel_name)
                })
                .await;
            if settle(job_id, recorded)?.is_none() {
                return Ok(None);
            }

            info!(
                %job_id,
                channel_id = %resolved.channel_id,
                channel_name = %resolved.channel_name,
                "channel resolved"
            );
            return Ok(Some(PipelineEvent::ChannelResolved {
                job_id,
                email: email.to_string(),
                channel_id: resolved.channel_id,
                channel_name: resolved.channel_name,
            }));
        }
        Ok(None) => (CHANNEL_NOT_FOUND.to_string(), CHANNEL_NOT_FOUND.to_string()),
        Err(e) => {
            let reason = format!("{:#}", e);
            let error = format!("Failed to resolve channel: {}", reason);
            (reason, error)
        }
    };

    warn!(%job_id, ?query, %reason, "channel resolution failed");
    if !fail_job(deps, job_id, &reason).await? {
        return Ok(None);
    }

    Ok(Some(PipelineEvent::ChannelResolutionFailed {
        job_id,
        email: email.to_string(),
        error,
    }))
}
