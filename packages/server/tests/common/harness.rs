//! Test harness running the real pipeline over mock collaborators.
//!
//! Each test gets its own engine, job store and mocks. A recording tap sees
//! every event the engine publishes.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use seesaw::testing::RecordingTap;
use seesaw::EventTap;
use test_context::AsyncTestContext;
use title_doctor::common::JobId;
use title_doctor::domains::jobs::{pipeline_builder, AppEngine, Job, PipelineEvent};
use title_doctor::kernel::TestDependencies;
use title_doctor::server::{build_app, AppState};

/// How long to wait for a cascade to reach a terminal event.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let response = ctx.app().oneshot(request).await.unwrap();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Mocks shared with the engine - inspect calls through these.
    pub deps: TestDependencies,
    pub engine: AppEngine,
    pub tap: Arc<RecordingTap<PipelineEvent>>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new(TestDependencies::new())
    }

    async fn teardown(self) {
        // Engine and in-memory store are dropped with the harness
    }
}

impl TestHarness {
    /// Build the pipeline over the given mocks.
    pub fn new(deps: TestDependencies) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let tap = Arc::new(RecordingTap::new());
        let engine = pipeline_builder(deps.into_server_deps())
            .with_tap_arc(tap.clone() as Arc<dyn EventTap<PipelineEvent>>)
            .build()
            .expect("Failed to build pipeline engine");

        Self { deps, engine, tap }
    }

    /// HTTP router over this harness's engine.
    pub fn app(&self) -> Router {
        build_app(AppState::with_engine(self.engine.clone()))
    }

    /// Current job record.
    pub async fn job(&self, job_id: JobId) -> Job {
        self.deps.jobs.get(job_id).await.expect("job should exist")
    }

    /// Wait until the job's cascade publishes a terminal event.
    pub async fn wait_for_terminal(&self, job_id: JobId) -> PipelineEvent {
        self.tap
            .wait_for(SETTLE_TIMEOUT, |e| e.job_id() == job_id && e.is_terminal())
            .await
            .expect("job did not reach a terminal event")
    }

    /// Topics published for one job, in order.
    pub fn topics_for(&self, job_id: JobId) -> Vec<&'static str> {
        self.tap
            .recorded()
            .into_iter()
            .filter(|r| r.event.job_id() == job_id)
            .map(|r| seesaw::Event::topic(&r.event))
            .collect()
    }

    /// Give background cascades a moment to run.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
