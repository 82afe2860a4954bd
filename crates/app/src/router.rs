use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use jobposts_storage::{Database, JobPostError};
use jobposts_util::Environment;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::error::ApiError;
use crate::{job_posts, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    expose_store_errors: bool,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database, environment: Environment) -> Self {
        Self {
            metrics,
            storage,
            expose_store_errors: !environment.redacts_errors(),
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    /// Wraps a store error, keeping its detail only outside production.
    pub fn store_failure(&self, error: JobPostError) -> ApiError {
        ApiError::StoreFailure {
            error,
            expose_detail: self.expose_store_errors,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/jobposts", get(job_posts::list).post(job_posts::create))
        .route(
            "/jobposts/:id",
            get(job_posts::get_by_id)
                .patch(job_posts::update)
                .delete(job_posts::delete),
        )
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    pub(crate) async fn setup_state(environment: Environment) -> (TempDir, AppState) {
        let metrics = telemetry::init_metrics().expect("metrics init");

        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());
        let database = Database::connect(&url).await.expect("connect");
        database.run_migrations().await.expect("migrations");

        (dir, AppState::new(metrics, database, environment))
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (_dir, state) = setup_state(Environment::Test).await;
        let app = app_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exports_build_info() {
        let (_dir, state) = setup_state(Environment::Test).await;
        let app = app_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let body = String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8");
        assert!(body.contains("app_build_info"));
        assert!(body.contains("app_uptime_seconds"));
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let (_dir, state) = setup_state(Environment::Test).await;
        let app = app_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
