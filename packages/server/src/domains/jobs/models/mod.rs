pub mod job;

pub use job::{ImprovedTitle, Job, JobError, JobStatus, Video};
