//! Integration tests for the HTTP surface.
//!
//! Requests go through the real router with `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use seesaw::{InMemoryStore, Revision, StateStore, StoreError, Versioned};
use serde_json::{json, Value};
use test_context::test_context;
use title_doctor::common::JobId;
use title_doctor::domains::jobs::{Job, JobStatus, JobStore};
use title_doctor::kernel::TestDependencies;
use tower::ServiceExt;

use crate::common::{happy_path_deps, TestHarness};

async fn send(ctx: &TestHarness, request: Request<Body>) -> (StatusCode, Value) {
    let response = ctx.app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn submit(body: &str) -> Request<Body> {
    Request::post("/submit")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// POST /submit
// =============================================================================

#[tokio::test]
async fn submit_returns_persisted_job_id() {
    let (deps, _) = happy_path_deps("UC123", "Chan", 5);
    let ctx = TestHarness::new(deps);

    let (status, body) = send(&ctx, submit(r#"{"channel":"@mkbhd","email":"a@b.com"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["message"],
        "Your request has been queued. You will receieve an email soon with improved suggestions for yt videos."
    );

    let job_id: JobId = body["jobId"].as_str().unwrap().parse().unwrap();
    let job = ctx.job(job_id).await;
    assert_eq!(job.channel, "@mkbhd");
    assert_eq!(job.email, "a@b.com");

    ctx.wait_for_terminal(job_id).await;
    assert_eq!(ctx.job(job_id).await.status, JobStatus::EmailSent);
}

#[tokio::test]
async fn submit_rejects_invalid_email() {
    let records: Arc<InMemoryStore<JobId, Job>> = Arc::new(InMemoryStore::new());
    let mut deps = TestDependencies::new();
    deps.jobs = JobStore::new(records.clone());
    let ctx = TestHarness::new(deps);

    let (status, body) = send(&ctx, submit(r#"{"channel":"@mkbhd","email":"not-an-email"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid email format" }));

    ctx.settle().await;
    assert!(records.is_empty());
    assert!(ctx.tap.events().is_empty());
    assert_eq!(ctx.deps.channel_resolver.call_count(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn submit_rejects_missing_fields(ctx: &TestHarness) {
    for body in [
        r#"{"channel":"@mkbhd"}"#,
        r#"{"email":"a@b.com"}"#,
        r#"{"channel":"   ","email":"a@b.com"}"#,
        r#"{}"#,
    ] {
        let (status, response) = send(ctx, submit(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response, json!({ "error": "Missing channel or email" }));
    }

    ctx.settle().await;
    assert!(ctx.tap.events().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn submit_rejects_malformed_json(ctx: &TestHarness) {
    let (status, body) = send(ctx, submit(r#"{"channel": "@mkbhd", "#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(ctx.tap.events().is_empty());
}

/// Store that refuses every write.
struct BrokenStore;

#[async_trait]
impl StateStore<JobId, Job> for BrokenStore {
    async fn load(&self, _key: &JobId) -> Result<Option<Versioned<Job>>, StoreError> {
        Err(StoreError::Backend(anyhow::anyhow!("store offline")))
    }

    async fn save(&self, _key: &JobId, _value: Job, _expected: Revision) -> Result<Revision, StoreError> {
        Err(StoreError::Backend(anyhow::anyhow!("store offline")))
    }

    async fn put(&self, _key: &JobId, _value: Job) -> Result<Revision, StoreError> {
        Err(StoreError::Backend(anyhow::anyhow!("store offline")))
    }
}

#[tokio::test]
async fn submit_reports_store_failure_as_500() {
    let mut deps = TestDependencies::new();
    deps.jobs = JobStore::new(Arc::new(BrokenStore));
    let ctx = TestHarness::new(deps);

    let (status, body) = send(&ctx, submit(r#"{"channel":"@mkbhd","email":"a@b.com"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    ctx.settle().await;
    assert!(ctx.tap.events().is_empty());
}

// =============================================================================
// GET /jobs/:job_id
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn job_lookup_returns_record(ctx: &TestHarness) {
    let job = ctx
        .deps
        .jobs
        .create(Job::new("@mkbhd", "a@b.com"))
        .await
        .unwrap();

    let (status, body) = send(ctx, get(&format!("/jobs/{}", job.job_id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobId"], json!(job.job_id.to_string()));
    assert_eq!(body["status"], "queued");
    assert_eq!(body["channel"], "@mkbhd");
    assert!(body["createdAt"].is_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn job_lookup_unknown_and_invalid_ids(ctx: &TestHarness) {
    let (status, body) = send(ctx, get(&format!("/jobs/{}", JobId::new()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Job not found" }));

    let (status, body) = send(ctx, get("/jobs/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid job id" }));
}

// =============================================================================
// GET /health
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn health_lists_subscribed_topics(ctx: &TestHarness) {
    let (status, body) = send(ctx, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "healthy",
            "subscribed_topics": ["channel_resolved", "submitted", "titles_ready", "videos_fetched"],
        })
    );
}
