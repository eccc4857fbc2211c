//! Job domain actions - business logic functions
//!
//! `submit_job` is called from the HTTP edge. The stage actions are called
//! from the pipeline effects: each one moves the job forward in the store,
//! talks to one collaborator, and returns the fact event for the engine to
//! publish next. `Ok(None)` means the delivery was stale and was dropped.

mod fetch_videos;
mod generate_titles;
mod resolve_channel;
mod send_email;
mod submit;

pub use fetch_videos::fetch_videos;
pub use generate_titles::generate_titles;
pub use resolve_channel::resolve_channel;
pub use send_email::send_email;
pub use submit::{submit_job, SubmitError, SubmitRequest};

use anyhow::Result;
use tracing::warn;

use crate::common::JobId;
use crate::domains::jobs::models::{Job, JobStatus};
use crate::domains::jobs::store::JobStoreError;
use crate::kernel::ServerDeps;

/// Collapse a store write into "applied", "stale" or a hard error.
///
/// Unknown jobs and rejected transitions are stale deliveries: a duplicate
/// or out-of-order event for a job that has already moved on. Any other
/// rejection is inconsistent data and comes back as an error.
fn settle(job_id: JobId, result: Result<Job, JobStoreError>) -> Result<Option<Job>> {
    match result {
        Ok(job) => Ok(Some(job)),
        Err(JobStoreError::NotFound(_)) => {
            warn!(%job_id, "event for unknown job, dropping");
            Ok(None)
        }
        Err(JobStoreError::Rejected(reason)) if reason.is_stale() => {
            warn!(%job_id, %reason, "stale delivery, dropping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Move the job into a stage's working status.
async fn enter_stage(deps: &ServerDeps, job_id: JobId, status: JobStatus) -> Result<Option<Job>> {
    let result = deps.jobs.update(job_id, |job| job.transition(status)).await;
    settle(job_id, result)
}

/// Persist `failed` with the raw reason. `false` if the job already moved on.
async fn fail_job(deps: &ServerDeps, job_id: JobId, reason: &str) -> Result<bool> {
    let result = deps.jobs.update(job_id, |job| job.fail(reason)).await;
    Ok(settle(job_id, result)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::jobs::models::JobError;

    #[test]
    fn test_settle_drops_stale_deliveries() {
        let job_id = JobId::new();

        let unknown = settle(job_id, Err(JobStoreError::NotFound(job_id))).unwrap();
        assert!(unknown.is_none());

        let finished = settle(
            job_id,
            Err(JobError::Terminal(JobStatus::EmailSent).into()),
        )
        .unwrap();
        assert!(finished.is_none());

        let out_of_order = settle(
            job_id,
            Err(JobError::InvalidTransition {
                from: JobStatus::FetchingVideos,
                to: JobStatus::ResolvingChannel,
            }
            .into()),
        )
        .unwrap();
        assert!(out_of_order.is_none());
    }

    #[test]
    fn test_settle_surfaces_inconsistent_data() {
        let job_id = JobId::new();
        let result = settle(
            job_id,
            Err(JobError::TitleCountMismatch { videos: 3, titles: 2 }.into()),
        );
        assert!(result.is_err());
    }
}
