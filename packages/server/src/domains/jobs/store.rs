//! Keyed job persistence.
//!
//! `JobStore` is the only way stages read or write job records. Writes go
//! through [`JobStore::update`], a per-key read-modify-write guarded by the
//! record's revision: if another writer saved in between, the transform is
//! re-applied to the fresh record instead of overwriting it.

use std::sync::Arc;

use seesaw::{InMemoryStore, Revision, StateStore, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::JobId;
use crate::domains::jobs::models::{Job, JobError};

/// Reload-and-retry bound for conflicting writers.
const MAX_UPDATE_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} already exists")]
    AlreadyExists(JobId),

    /// The transform refused the change; nothing was written.
    #[error(transparent)]
    Rejected(#[from] JobError),

    #[error("job {job_id} kept changing concurrently after {attempts} attempts")]
    Contended { job_id: JobId, attempts: usize },

    #[error("job store backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<StoreError> for JobStoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(e) => JobStoreError::Backend(e),
            StoreError::Conflict => {
                JobStoreError::Backend(anyhow::anyhow!("unexpected revision conflict"))
            }
        }
    }
}

/// Job records keyed by job id.
#[derive(Clone)]
pub struct JobStore {
    backend: Arc<dyn StateStore<JobId, Job>>,
}

impl JobStore {
    pub fn new(backend: Arc<dyn StateStore<JobId, Job>>) -> Self {
        Self { backend }
    }

    /// Process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    pub async fn get(&self, job_id: JobId) -> Result<Job, JobStoreError> {
        self.backend
            .load(&job_id)
            .await?
            .map(|versioned| versioned.value)
            .ok_or(JobStoreError::NotFound(job_id))
    }

    /// Unconditional write. Concurrent writers race; the last one wins.
    pub async fn set(&self, job: Job) -> Result<(), JobStoreError> {
        let job_id = job.job_id;
        self.backend.put(&job_id, job).await?;
        Ok(())
    }

    /// Insert a new record. Fails if the id is already taken.
    pub async fn create(&self, job: Job) -> Result<Job, JobStoreError> {
        let job_id = job.job_id;
        match self.backend.save(&job_id, job.clone(), Revision::NONE).await {
            Ok(_) => Ok(job),
            Err(StoreError::Conflict) => Err(JobStoreError::AlreadyExists(job_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `transform` to the current record and persist the result.
    ///
    /// The transform runs on a copy; if it returns an error nothing is
    /// written. On a revision conflict the record is reloaded and the
    /// transform runs again against the fresh copy.
    pub async fn update<F>(&self, job_id: JobId, transform: F) -> Result<Job, JobStoreError>
    where
        F: Fn(&mut Job) -> Result<(), JobError> + Send + Sync,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = self
                .backend
                .load(&job_id)
                .await?
                .ok_or(JobStoreError::NotFound(job_id))?;

            let mut next = current.value;
            transform(&mut next)?;

            match self.backend.save(&job_id, next.clone(), current.revision).await {
                Ok(revision) => {
                    debug!(%job_id, status = %next.status, %revision, "job updated");
                    return Ok(next);
                }
                Err(StoreError::Conflict) => {
                    warn!(%job_id, attempt, "job changed concurrently, retrying update");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(JobStoreError::Contended {
            job_id,
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}
