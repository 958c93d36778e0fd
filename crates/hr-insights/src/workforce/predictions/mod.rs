//! Port to the three remote prediction services plus the sequential batch coordinator.

mod batch;
mod client;

use async_trait::async_trait;

use super::domain::{
    AttritionPrediction, EmployeeProfile, PerformancePrediction, RetentionPrediction,
};
use super::import::BulkUpload;

pub use batch::{BatchError, BatchStatus, PredictionBatch};
pub use client::HttpPredictionClient;

/// Remote model endpoints. Implementations treat results as opaque.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict_attrition(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<AttritionPrediction, ServiceError>;
    async fn predict_performance(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<PerformancePrediction, ServiceError>;
    async fn predict_retention(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<RetentionPrediction, ServiceError>;

    async fn predict_attrition_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<AttritionPrediction>, ServiceError>;
    async fn predict_performance_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<PerformancePrediction>, ServiceError>;
    async fn predict_retention_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<RetentionPrediction>, ServiceError>;
}

/// Which remote operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Attrition,
    Performance,
    Retention,
    AttritionBulk,
    PerformanceBulk,
    RetentionBulk,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Attrition => "/predict_attrition",
            Endpoint::Performance => "/predict_performance",
            Endpoint::Retention => "/predict_retention",
            Endpoint::AttritionBulk => "/predict_attrition_bulk",
            Endpoint::PerformanceBulk => "/predict_performance_bulk",
            Endpoint::RetentionBulk => "/predict_retention_bulk",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Endpoint::Attrition | Endpoint::AttritionBulk => "attrition",
            Endpoint::Performance | Endpoint::PerformanceBulk => "performance",
            Endpoint::Retention | Endpoint::RetentionBulk => "retention",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{} service unreachable: {message}", .endpoint.label())]
    Transport { endpoint: Endpoint, message: String },
    #[error("{} service returned {status} {status_text}", .endpoint.label())]
    Status {
        endpoint: Endpoint,
        status: u16,
        status_text: String,
    },
    #[error("{} service sent an unexpected payload: {message}", .endpoint.label())]
    Decode { endpoint: Endpoint, message: String },
}

impl ServiceError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => *endpoint,
        }
    }

    /// Upstream status code, when the service answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}
