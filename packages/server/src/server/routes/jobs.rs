use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::error_response;
use crate::common::JobId;
use crate::domains::jobs::store::JobStoreError;
use crate::server::app::AppState;

/// Current record for one job
pub async fn get_job_handler(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let Ok(job_id) = JobId::parse(&job_id) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid job id").into_response();
    };

    match state.deps().jobs.get(job_id).await {
        Ok(job) => Json(job).into_response(),
        Err(JobStoreError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "Job not found").into_response()
        }
        Err(e) => {
            error!(%job_id, error = %e, "failed to load job");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .into_response()
        }
    }
}
