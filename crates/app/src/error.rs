use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jobposts_storage::JobPostError;
use thiserror::Error;
use tracing::error;

use crate::problem::ProblemResponse;

const REDACTED_DETAIL: &str = "the job post store failed to complete the request";

/// Outcome of a job post request that is not a success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("job post not found")]
    NotFound,
    #[error("store failure: {error}")]
    StoreFailure {
        error: JobPostError,
        expose_detail: bool,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the `result` dimension of request metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::StoreFailure { .. } => "error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NotFound => status.into_response(),
            Self::StoreFailure {
                error,
                expose_detail,
            } => {
                error!(stage = "api", error = %error, "job post store failure");
                let problem_type = match &error {
                    JobPostError::InvalidId(_) => "invalid_id",
                    _ => "store_failure",
                };
                let detail = if expose_detail {
                    error.to_string()
                } else {
                    REDACTED_DETAIL.to_string()
                };
                ProblemResponse::new(status, problem_type, detail).into_response()
            }
        }
    }
}
