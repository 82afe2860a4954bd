//! Handlers for the `/jobposts` resource.
//!
//! Each handler performs exactly one store operation. Missing records answer
//! 404 with an empty body; every other store failure answers 500.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use jobposts_core::{JobPost, JobPostPatch, NewJobPost};
use jobposts_storage::JobPostError;
use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::router::AppState;

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewJobPost>,
) -> Result<Json<JobPost>, ApiError> {
    let start = Instant::now();
    let outcome = state
        .storage()
        .job_posts()
        .create(&body)
        .await
        .map_err(|err| state.store_failure(err));
    observe("create", start, &outcome);

    let post = outcome?;
    info!(stage = "api", id = %post.id, "job post created");
    Ok(Json(post))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<JobPost>>, ApiError> {
    let start = Instant::now();
    let outcome = state
        .storage()
        .job_posts()
        .list()
        .await
        .map_err(|err| state.store_failure(err));
    observe("list", start, &outcome);

    let posts = outcome?;
    debug!(stage = "api", count = posts.len(), "job posts listed");
    Ok(Json(posts))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPost>, ApiError> {
    let start = Instant::now();
    let outcome = found(&state, state.storage().job_posts().find_by_id(&id).await);
    observe("get", start, &outcome);

    outcome.map(Json)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<JobPostPatch>,
) -> Result<Json<JobPost>, ApiError> {
    let start = Instant::now();
    let outcome = found(&state, state.storage().job_posts().update(&id, &patch).await);
    observe("update", start, &outcome);

    let post = outcome?;
    info!(stage = "api", id = %post.id, "job post updated");
    Ok(Json(post))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobPost>, ApiError> {
    let start = Instant::now();
    let outcome = found(&state, state.storage().job_posts().delete(&id).await);
    observe("delete", start, &outcome);

    let post = outcome?;
    info!(stage = "api", id = %post.id, "job post deleted");
    Ok(Json(post))
}

fn found(
    state: &AppState,
    result: Result<Option<JobPost>, JobPostError>,
) -> Result<JobPost, ApiError> {
    match result {
        Ok(Some(post)) => Ok(post),
        Ok(None) => Err(ApiError::NotFound),
        Err(err) => Err(state.store_failure(err)),
    }
}

fn observe<T>(operation: &'static str, start: Instant, outcome: &Result<T, ApiError>) {
    let result = match outcome {
        Ok(_) => "ok",
        Err(err) => err.metric_label(),
    };
    counter!("jobposts_requests_total", "operation" => operation, "result" => result).increment(1);
    histogram!("jobposts_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
