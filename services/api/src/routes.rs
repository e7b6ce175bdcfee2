use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use dmf_engage::workflows::outreach::{
    outreach_router, ContactRelay, MailingListDirectory, OutreachService,
};
use dmf_engage::workflows::scholarship::{
    scholarship_router, ApplicationStore, DocumentStore, Notifier, SubmissionPipeline,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_engagement_routes<D, S, N, M, C>(
    pipeline: Arc<SubmissionPipeline<D, S, N>>,
    outreach: Arc<OutreachService<M, C>>,
) -> axum::Router
where
    D: DocumentStore + 'static,
    S: ApplicationStore + 'static,
    N: Notifier + 'static,
    M: MailingListDirectory + 'static,
    C: ContactRelay + 'static,
{
    scholarship_router(pipeline)
        .merge(outreach_router(outreach))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
