use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use hr_insights::error::AppError;
use hr_insights::workforce::report::{bulk_csv, individual_report, summary_report, BulkSummary};
use hr_insights::workforce::{
    insights_router, BulkPredictions, EmployeeProfile, HistoryStorage, PredictionResult,
    PredictionService, WorkforceInsightsService,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Deserialize)]
pub(crate) struct IndividualReportRequest {
    pub(crate) profile: EmployeeProfile,
    pub(crate) results: PredictionResult,
    #[serde(default)]
    pub(crate) generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkReportRequest {
    pub(crate) predictions: BulkPredictions,
    #[serde(default)]
    pub(crate) generated_at: Option<DateTime<Utc>>,
}

pub(crate) fn with_insights_routes<P, S>(service: Arc<WorkforceInsightsService<P, S>>) -> Router
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    insights_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/reports/individual", post(individual_report_endpoint))
        .route("/api/v1/reports/summary", post(summary_report_endpoint))
        .route("/api/v1/reports/bulk", post(bulk_export_endpoint))
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

pub(crate) async fn individual_report_endpoint(
    Json(request): Json<IndividualReportRequest>,
) -> impl IntoResponse {
    let generated_at = request.generated_at.unwrap_or_else(Utc::now);
    let document = individual_report(&request.profile, &request.results, generated_at);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        document.render(),
    )
}

pub(crate) async fn summary_report_endpoint(
    Json(request): Json<BulkReportRequest>,
) -> impl IntoResponse {
    let generated_at = request.generated_at.unwrap_or_else(Utc::now);
    let summary = BulkSummary::from_predictions(&request.predictions);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        summary_report(&summary, generated_at).render(),
    )
}

pub(crate) async fn bulk_export_endpoint(
    Json(request): Json<BulkReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let csv = bulk_csv(&request.predictions)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bulk_predictions.csv\"",
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use hr_insights::workforce::explanations::RuleBook;
    use hr_insights::workforce::{
        AttritionPrediction, BulkUpload, InMemoryHistoryStorage, PerformancePrediction,
        PredictionHistoryStore, RetentionPrediction, ServiceError,
    };
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct OfflinePredictions;

    #[async_trait::async_trait]
    impl PredictionService for OfflinePredictions {
        async fn predict_attrition(
            &self,
            _profile: &EmployeeProfile,
        ) -> Result<AttritionPrediction, ServiceError> {
            Ok(AttritionPrediction {
                risk: 1,
                probability: 0.8765,
            })
        }

        async fn predict_performance(
            &self,
            _profile: &EmployeeProfile,
        ) -> Result<PerformancePrediction, ServiceError> {
            Ok(PerformancePrediction { rating: 4 })
        }

        async fn predict_retention(
            &self,
            _profile: &EmployeeProfile,
        ) -> Result<RetentionPrediction, ServiceError> {
            Ok(RetentionPrediction {
                risk: 0,
                probability: 0.2,
            })
        }

        async fn predict_attrition_bulk(
            &self,
            _upload: &BulkUpload,
        ) -> Result<Vec<AttritionPrediction>, ServiceError> {
            Ok(Vec::new())
        }

        async fn predict_performance_bulk(
            &self,
            _upload: &BulkUpload,
        ) -> Result<Vec<PerformancePrediction>, ServiceError> {
            Ok(Vec::new())
        }

        async fn predict_retention_bulk(
            &self,
            _upload: &BulkUpload,
        ) -> Result<Vec<RetentionPrediction>, ServiceError> {
            Ok(Vec::new())
        }
    }

    fn router(ready: bool) -> Router {
        let service = Arc::new(WorkforceInsightsService::new(
            Arc::new(OfflinePredictions),
            Arc::new(PredictionHistoryStore::load(InMemoryHistoryStorage::new())),
            RuleBook::standard(),
        ));
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        };
        with_insights_routes(service).layer(Extension(state))
    }

    fn predictions_body() -> serde_json::Value {
        json!({
            "predictions": {
                "attrition": [
                    { "AttritionRisk": 1, "AttritionRiskProbability": 0.81 },
                    { "AttritionRisk": 0, "AttritionRiskProbability": 0.12 }
                ],
                "performance": [{ "PerformanceRating": 2 }, { "PerformanceRating": 5 }],
                "retention": [
                    { "RetentionRisk": 1, "RetentionRiskProbability": 0.7 },
                    { "RetentionRisk": 0, "RetentionRiskProbability": 0.1 }
                ]
            },
            "generated_at": "2025-03-14T09:30:00Z"
        })
    }

    async fn post_json(
        router: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, String) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        (status, String::from_utf8(body.to_vec()).expect("utf8 body"))
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let response = router(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = router(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn insights_routes_are_mounted() {
        let response = router(true)
            .oneshot(
                Request::get("/api/v1/predictions/status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn individual_report_renders_predictions() {
        let body = json!({
            "profile": EmployeeProfile::default(),
            "results": {
                "attrition": { "AttritionRisk": 1, "AttritionRiskProbability": 0.8765 },
                "performance": { "PerformanceRating": 4 },
                "retention": { "RetentionRisk": 0, "RetentionRiskProbability": 0.2 }
            }
        });

        let (status, text) = post_json(router(true), "/api/v1/reports/individual", body).await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("Employee Prediction Report"));
        assert!(text.contains("Attrition Risk: High (Probability: 87.65%)"));
    }

    #[tokio::test]
    async fn summary_report_counts_high_risk_rows() {
        let (status, text) =
            post_json(router(true), "/api/v1/reports/summary", predictions_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("Date: 2025-03-14 09:30:00 UTC"));
        assert!(text.contains("High Attrition Risk: 1"));
    }

    #[tokio::test]
    async fn bulk_export_returns_one_row_per_employee() {
        let (status, text) =
            post_json(router(true), "/api/v1/reports/bulk", predictions_body()).await;

        assert_eq!(status, StatusCode::OK);
        let rows: Vec<_> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "0,1,0.81,2,1,0.7");
    }
}
