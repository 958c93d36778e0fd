use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{PredictionService, ServiceError};
use crate::workforce::domain::{
    BulkPredictions, EmployeeProfile, PredictionResult, ProfileValidationError,
};
use crate::workforce::import::BulkUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Idle,
    Pending,
}

impl BatchStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BatchStatus::Idle => "idle",
            BatchStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Validation(#[from] ProfileValidationError),
    #[error("a prediction batch is already in progress")]
    Busy,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Issues attrition, performance, and retention calls in that order and stops at the first
/// failure. At most one batch runs at a time; a second submission is rejected, not queued.
pub struct PredictionBatch<P> {
    service: Arc<P>,
    pending: AtomicBool,
}

impl<P> PredictionBatch<P>
where
    P: PredictionService,
{
    pub fn new(service: Arc<P>) -> Self {
        Self {
            service,
            pending: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> BatchStatus {
        if self.pending.load(Ordering::Acquire) {
            BatchStatus::Pending
        } else {
            BatchStatus::Idle
        }
    }

    pub async fn run(&self, profile: &EmployeeProfile) -> Result<PredictionResult, BatchError> {
        profile.validate()?;
        let _claim = self.claim()?;

        let outcome = async {
            let attrition = self.service.predict_attrition(profile).await?;
            let performance = self.service.predict_performance(profile).await?;
            let retention = self.service.predict_retention(profile).await?;
            Ok::<_, ServiceError>(PredictionResult {
                attrition,
                performance,
                retention,
            })
        }
        .await;

        match outcome {
            Ok(result) => {
                info!(
                    attrition_risk = result.attrition.risk,
                    rating = result.performance.rating,
                    retention_risk = result.retention.risk,
                    "individual prediction completed"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "individual prediction aborted");
                Err(err.into())
            }
        }
    }

    pub async fn run_bulk(&self, upload: &BulkUpload) -> Result<BulkPredictions, BatchError> {
        let _claim = self.claim()?;

        let outcome = async {
            let attrition = self.service.predict_attrition_bulk(upload).await?;
            let performance = self.service.predict_performance_bulk(upload).await?;
            let retention = self.service.predict_retention_bulk(upload).await?;
            Ok::<_, ServiceError>(BulkPredictions {
                attrition,
                performance,
                retention,
                profiles: Vec::new(),
            })
        }
        .await;

        match outcome {
            Ok(bulk) => {
                info!(rows = upload.len(), results = bulk.len(), "bulk prediction completed");
                Ok(bulk)
            }
            Err(err) => {
                warn!(error = %err, rows = upload.len(), "bulk prediction aborted");
                Err(err.into())
            }
        }
    }

    fn claim(&self) -> Result<PendingClaim<'_>, BatchError> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BatchError::Busy)?;
        Ok(PendingClaim(&self.pending))
    }
}

/// Releases the pending flag on every exit path, including cancellation of the future.
struct PendingClaim<'a>(&'a AtomicBool);

impl Drop for PendingClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
