//! Jobs domain - the title-improvement pipeline
//!
//! Architecture (event cascade):
//!   HTTP → actions::submit_job → `submitted` → effects run stage by stage,
//!   each returning the next fact until a terminal event is reached.

pub mod actions;
pub mod effects;
pub mod events;
pub mod models;
pub mod prompts;
pub mod store;
pub mod templates;

// Re-export commonly used types
pub use effects::{build_engine, pipeline_builder, AppEngine};
pub use events::PipelineEvent;
pub use models::{ImprovedTitle, Job, JobStatus, Video};
pub use store::{JobStore, JobStoreError};
