use anyhow::Result;
use async_trait::async_trait;
use seesaw::{Effect, EffectContext};

use crate::domains::jobs::actions;
use crate::domains::jobs::events::{topics, PipelineEvent};
use crate::kernel::ServerDeps;

/// `channel_resolved` → list recent videos
pub struct FetchVideosEffect;

#[async_trait]
impl Effect<PipelineEvent, ServerDeps> for FetchVideosEffect {
    fn name(&self) -> &'static str {
        "fetch_videos"
    }

    fn subscribes_to(&self) -> &'static str {
        topics::CHANNEL_RESOLVED
    }

    async fn handle(
        &self,
        event: PipelineEvent,
        ctx: EffectContext<ServerDeps>,
    ) -> Result<Option<PipelineEvent>> {
        let PipelineEvent::ChannelResolved {
            job_id,
            email,
            channel_id,
            channel_name,
        } = event
        else {
            return Ok(None);
        };

        actions::fetch_videos(job_id, &email, &channel_id, &channel_name, ctx.deps()).await
    }
}
