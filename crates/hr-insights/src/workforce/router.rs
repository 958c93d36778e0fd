use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{form_fields, EmployeeProfile, PredictionResult};
use super::history::HistoryStorage;
use super::predictions::{BatchError, PredictionService};
use super::report::profile_template_csv;
use super::service::{InsightsError, WorkforceInsightsService};

/// Router exposing predictions, history, analytics, and explanations.
pub fn insights_router<P, S>(service: Arc<WorkforceInsightsService<P, S>>) -> Router
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    Router::new()
        .route("/api/v1/predictions", post(predict_handler::<P, S>))
        .route("/api/v1/predictions/bulk", post(bulk_handler::<P, S>))
        .route("/api/v1/predictions/status", get(status_handler::<P, S>))
        .route(
            "/api/v1/history",
            get(history_handler::<P, S>).delete(clear_history_handler::<P, S>),
        )
        .route("/api/v1/analytics", get(analytics_handler::<P, S>))
        .route("/api/v1/explanations", post(explain_handler::<P, S>))
        .route("/api/v1/profile/fields", get(fields_handler))
        .route("/api/v1/profile/template.csv", get(template_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkRequest {
    csv: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExplainRequest {
    profile: EmployeeProfile,
    results: PredictionResult,
}

pub(crate) async fn predict_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
    Json(profile): Json<EmployeeProfile>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    match service.predict(profile).await {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
    Json(request): Json<BulkRequest>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    match service.predict_bulk_csv(&request.csv).await {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    let status = service.status();
    (StatusCode::OK, Json(json!({ "status": status.label() }))).into_response()
}

pub(crate) async fn history_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    match service.history() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn clear_history_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    match service.clear_history().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn analytics_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    match service.analytics() {
        Ok(analytics) => (StatusCode::OK, Json(analytics)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn explain_handler<P, S>(
    State(service): State<Arc<WorkforceInsightsService<P, S>>>,
    Json(request): Json<ExplainRequest>,
) -> Response
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    let explanations = service.explain(&request.profile, &request.results);
    (StatusCode::OK, Json(explanations)).into_response()
}

pub(crate) async fn fields_handler() -> Response {
    (StatusCode::OK, Json(form_fields())).into_response()
}

pub(crate) async fn template_handler() -> Response {
    match profile_template_csv(&EmployeeProfile::default()) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sample_employee_data.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to render upload template");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Maps service failures onto status codes with a JSON `error` body.
pub fn error_response(err: InsightsError) -> Response {
    match err {
        InsightsError::Batch(BatchError::Validation(validation)) => {
            let payload = json!({
                "error": "profile validation failed",
                "details": validation.messages,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        InsightsError::Import(import) => {
            let payload = json!({
                "error": import.to_string(),
                "details": import.details(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        InsightsError::Batch(BatchError::Busy) => {
            let payload = json!({
                "error": "a prediction batch is already in progress",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        InsightsError::Batch(BatchError::Service(service)) => {
            let payload = json!({
                "error": service.to_string(),
                "service": service.endpoint().label(),
                "upstream_status": service.upstream_status(),
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        InsightsError::History(history) => {
            error!(error = %history, "prediction history unavailable");
            let payload = json!({
                "error": history.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
