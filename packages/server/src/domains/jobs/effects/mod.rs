//! Job pipeline effects - each stage reacts to one topic
//!
//! Effects are thin: they unpack the trigger event, call the stage action,
//! and return the action's outcome for the engine to publish.
//!
//! Cascade flow:
//!   submitted        → ResolveChannel → channel_resolved | channel_resolution_failed
//!   channel_resolved → FetchVideos    → videos_fetched   | videos_fetch_failed
//!   videos_fetched   → GenerateTitles → titles_ready     | titles_generation_failed
//!   titles_ready     → SendEmail      → email_sent       | email_error

mod fetch_videos;
mod generate_titles;
mod job_log;
mod resolve_channel;
mod send_email;

pub use fetch_videos::FetchVideosEffect;
pub use generate_titles::GenerateTitlesEffect;
pub use job_log::JobLogTap;
pub use resolve_channel::ResolveChannelEffect;
pub use send_email::SendEmailEffect;

use seesaw::{Engine, EngineBuilder, SeesawError};

use super::events::PipelineEvent;
use crate::kernel::ServerDeps;

/// The engine running the job pipeline.
pub type AppEngine = Engine<PipelineEvent, ServerDeps>;

/// Builder with every stage subscribed and job logging attached.
///
/// Callers can add taps before building.
pub fn pipeline_builder(deps: ServerDeps) -> EngineBuilder<PipelineEvent, ServerDeps> {
    Engine::builder(deps)
        .with_effect(ResolveChannelEffect)
        .with_effect(FetchVideosEffect)
        .with_effect(GenerateTitlesEffect)
        .with_effect(SendEmailEffect)
        .with_tap(JobLogTap)
}

/// Build the pipeline engine.
pub fn build_engine(deps: ServerDeps) -> Result<AppEngine, SeesawError> {
    pipeline_builder(deps).build()
}
