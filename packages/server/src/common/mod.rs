// Shared types used across domains

pub mod id;

pub use id::Id;

use crate::domains::jobs::models::Job;

/// Identifier of one submitted job.
pub type JobId = Id<Job>;
