use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use super::error_response;
use crate::common::JobId;
use crate::domains::jobs::actions::{submit_job, SubmitError, SubmitRequest};
use crate::server::app::AppState;

pub const QUEUED_MESSAGE: &str =
    "Your request has been queued. You will receieve an email soon with improved suggestions for yt videos.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub job_id: JobId,
    pub message: String,
}

/// Queue a title-improvement job
///
/// Returns 200 with the job id, 400 on invalid input and 500 if the job
/// could not be stored.
pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected submit body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    match submit_job(&state.engine, request).await {
        Ok(job) => Json(SubmitResponse {
            success: true,
            job_id: job.job_id,
            message: QUEUED_MESSAGE.to_string(),
        })
        .into_response(),
        Err(e) if e.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            if let SubmitError::Store(source) = &e {
                error!(error = %source, "failed to create job");
            }
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
