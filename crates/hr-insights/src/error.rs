use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workforce::explanations::RuleBookError;
use crate::workforce::import::BulkImportError;
use crate::workforce::router::error_response;
use crate::workforce::InsightsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Client(reqwest::Error),
    Rules(RuleBookError),
    Export(csv::Error),
    Insights(InsightsError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Client(err) => write!(f, "prediction client error: {}", err),
            AppError::Rules(err) => write!(f, "rule book error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Insights(err) => write!(f, "insights error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Client(err) => Some(err),
            AppError::Rules(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Insights(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Insights(err) => return error_response(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Client(_)
            | AppError::Rules(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Client(value)
    }
}

impl From<RuleBookError> for AppError {
    fn from(value: RuleBookError) -> Self {
        Self::Rules(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl From<InsightsError> for AppError {
    fn from(value: InsightsError) -> Self {
        Self::Insights(value)
    }
}

impl From<BulkImportError> for AppError {
    fn from(value: BulkImportError) -> Self {
        Self::Insights(InsightsError::Import(value))
    }
}
