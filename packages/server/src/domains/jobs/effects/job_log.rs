use anyhow::Result;
use async_trait::async_trait;
use seesaw::{Event, EventTap, TapContext};
use tracing::{info, warn};

use crate::domains::jobs::events::PipelineEvent;

/// Logs every pipeline event; failure exits at warn.
pub struct JobLogTap;

#[async_trait]
impl EventTap<PipelineEvent> for JobLogTap {
    async fn on_event(&self, event: &PipelineEvent, ctx: &TapContext) -> Result<()> {
        let job_id = event.job_id();
        let topic = event.topic();
        let correlation_id = ctx.correlation_id;

        match event {
            PipelineEvent::ChannelResolutionFailed { error, .. }
            | PipelineEvent::VideosFetchFailed { error, .. }
            | PipelineEvent::TitlesGenerationFailed { error, .. }
            | PipelineEvent::EmailError { error, .. } => {
                warn!(%job_id, topic, %correlation_id, %error, "job failed");
            }
            PipelineEvent::EmailSent { email, .. } => {
                info!(%job_id, topic, %correlation_id, to = %email, "job completed");
            }
            _ => {
                info!(%job_id, topic, %correlation_id, depth = ctx.depth, "job progressed");
            }
        }
        Ok(())
    }
}
