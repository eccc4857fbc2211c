use anyhow::Result;
use async_trait::async_trait;
use seesaw::{Effect, EffectContext};

use crate::domains::jobs::actions;
use crate::domains::jobs::events::{topics, PipelineEvent};
use crate::kernel::ServerDeps;

/// `submitted` → resolve the channel
pub struct ResolveChannelEffect;

#[async_trait]
impl Effect<PipelineEvent, ServerDeps> for ResolveChannelEffect {
    fn name(&self) -> &'static str {
        "resolve_channel"
    }

    fn subscribes_to(&self) -> &'static str {
        topics::SUBMITTED
    }

    async fn handle(
        &self,
        event: PipelineEvent,
        ctx: EffectContext<ServerDeps>,
    ) -> Result<Option<PipelineEvent>> {
        let PipelineEvent::Submitted {
            job_id,
            channel,
            email,
        } = event
        else {
            return Ok(None);
        };

        actions::resolve_channel(job_id, &channel, &email, ctx.deps()).await
    }
}
