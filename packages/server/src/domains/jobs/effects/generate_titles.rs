use anyhow::Result;
use async_trait::async_trait;
use seesaw::{Effect, EffectContext};

use crate::domains::jobs::actions;
use crate::domains::jobs::events::{topics, PipelineEvent};
use crate::kernel::ServerDeps;

/// `videos_fetched` → generate improved titles
pub struct GenerateTitlesEffect;

#[async_trait]
impl Effect<PipelineEvent, ServerDeps> for GenerateTitlesEffect {
    fn name(&self) -> &'static str {
        "generate_titles"
    }

    fn subscribes_to(&self) -> &'static str {
        topics::VIDEOS_FETCHED
    }

    async fn handle(
        &self,
        event: PipelineEvent,
        ctx: EffectContext<ServerDeps>,
    ) -> Result<Option<PipelineEvent>> {
        let PipelineEvent::VideosFetched {
            job_id,
            email,
            channel_name,
            ..
        } = event
        else {
            return Ok(None);
        };

        actions::generate_titles(job_id, &email, &channel_name, ctx.deps()).await
    }
}
