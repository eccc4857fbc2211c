use anyhow::Result;
use async_trait::async_trait;
use seesaw::{Effect, EffectContext};

use crate::domains::jobs::actions;
use crate::domains::jobs::events::{topics, PipelineEvent};
use crate::kernel::ServerDeps;

/// `titles_ready` → email the results
pub struct SendEmailEffect;

#[async_trait]
impl Effect<PipelineEvent, ServerDeps> for SendEmailEffect {
    fn name(&self) -> &'static str {
        "send_email"
    }

    fn subscribes_to(&self) -> &'static str {
        topics::TITLES_READY
    }

    async fn handle(
        &self,
        event: PipelineEvent,
        ctx: EffectContext<ServerDeps>,
    ) -> Result<Option<PipelineEvent>> {
        let PipelineEvent::TitlesReady {
            job_id,
            email,
            improved_titles,
            channel_name,
        } = event
        else {
            return Ok(None);
        };

        actions::send_email(job_id, &email, &improved_titles, &channel_name, ctx.deps()).await
    }
}
