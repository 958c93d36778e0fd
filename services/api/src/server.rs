use crate::cli::ServeArgs;
use crate::infra::{build_insights_service, AppState};
use crate::routes::with_insights_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hr_insights::config::AppConfig;
use hr_insights::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_insights_service(&config)?);
    let app = with_insights_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        history = %config.history.path.display(),
        attrition_url = %config.predictions.attrition_url,
        performance_url = %config.predictions.performance_url,
        "hr insights service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
