use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::workforce::domain::{
    AttritionPrediction, EmployeeProfile, PerformancePrediction, RetentionPrediction,
};
use crate::workforce::explanations::RuleBook;
use crate::workforce::history::{
    HistoryStorage, InMemoryHistoryStorage, PredictionHistoryStore, StorageError,
};
use crate::workforce::import::BulkUpload;
use crate::workforce::predictions::{Endpoint, PredictionService, ServiceError};
use crate::workforce::service::WorkforceInsightsService;

pub(super) const CSV_HEADER: &str = "Age,Gender,Department,JobRole,MonthlyIncome,YearsAtCompany,\
OverTime,JobSatisfaction,WorkLifeBalance,TotalWorkingYears,TrainingTimesLastYear,JobInvolvement,\
EnvironmentSatisfaction,RelationshipSatisfaction";

/// Three valid rows with distinct satisfaction values.
pub(super) fn three_row_csv() -> String {
    format!(
        "{CSV_HEADER}\n\
         29,Female,Sales,Sales Executive,4200,2,Yes,2,2,5,1,3,2,3\n\
         45,Male,Research & Development,Research Scientist,9100,12,No,4,4,20,3,4,4,4\n\
         38,Female,Human Resources,Manager,15000,8,No,5,3,14,4,5,5,5\n"
    )
}

pub(super) fn upload() -> BulkUpload {
    BulkUpload::from_bytes(three_row_csv()).expect("fixture csv is valid")
}

pub(super) fn attrition(risk: u8, probability: f64) -> AttritionPrediction {
    AttritionPrediction { risk, probability }
}

pub(super) fn performance(rating: u8) -> PerformancePrediction {
    PerformancePrediction { rating }
}

pub(super) fn retention(risk: u8, probability: f64) -> RetentionPrediction {
    RetentionPrediction { risk, probability }
}

/// Holds a call open until released, so tests can observe the pending state.
#[derive(Default)]
pub(super) struct Gate {
    pub(super) entered: Notify,
    pub(super) release: Notify,
}

/// Scripted prediction service that records the order of calls.
pub(super) struct FakePredictions {
    pub(super) attrition: AttritionPrediction,
    pub(super) performance: PerformancePrediction,
    pub(super) retention: RetentionPrediction,
    pub(super) attrition_bulk: Vec<AttritionPrediction>,
    pub(super) performance_bulk: Vec<PerformancePrediction>,
    pub(super) retention_bulk: Vec<RetentionPrediction>,
    pub(super) fail_on: Option<Endpoint>,
    pub(super) gate: Option<Arc<Gate>>,
    calls: Mutex<Vec<Endpoint>>,
}

impl Default for FakePredictions {
    fn default() -> Self {
        Self {
            attrition: attrition(0, 0.12),
            performance: performance(4),
            retention: retention(0, 0.2),
            attrition_bulk: vec![attrition(1, 0.81), attrition(1, 0.66), attrition(0, 0.1)],
            performance_bulk: vec![performance(2), performance(4), performance(5)],
            retention_bulk: vec![retention(1, 0.7), retention(0, 0.3), retention(0, 0.2)],
            fail_on: None,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakePredictions {
    pub(super) fn failing_on(endpoint: Endpoint) -> Self {
        Self {
            fail_on: Some(endpoint),
            ..Self::default()
        }
    }

    pub(super) fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ServiceError> {
        self.calls.lock().expect("calls mutex poisoned").push(endpoint);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.fail_on == Some(endpoint) {
            return Err(ServiceError::Status {
                endpoint,
                status: 503,
                status_text: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PredictionService for FakePredictions {
    async fn predict_attrition(
        &self,
        _profile: &EmployeeProfile,
    ) -> Result<AttritionPrediction, ServiceError> {
        self.enter(Endpoint::Attrition).await?;
        Ok(self.attrition)
    }

    async fn predict_performance(
        &self,
        _profile: &EmployeeProfile,
    ) -> Result<PerformancePrediction, ServiceError> {
        self.enter(Endpoint::Performance).await?;
        Ok(self.performance)
    }

    async fn predict_retention(
        &self,
        _profile: &EmployeeProfile,
    ) -> Result<RetentionPrediction, ServiceError> {
        self.enter(Endpoint::Retention).await?;
        Ok(self.retention)
    }

    async fn predict_attrition_bulk(
        &self,
        _upload: &BulkUpload,
    ) -> Result<Vec<AttritionPrediction>, ServiceError> {
        self.enter(Endpoint::AttritionBulk).await?;
        Ok(self.attrition_bulk.clone())
    }

    async fn predict_performance_bulk(
        &self,
        _upload: &BulkUpload,
    ) -> Result<Vec<PerformancePrediction>, ServiceError> {
        self.enter(Endpoint::PerformanceBulk).await?;
        Ok(self.performance_bulk.clone())
    }

    async fn predict_retention_bulk(
        &self,
        _upload: &BulkUpload,
    ) -> Result<Vec<RetentionPrediction>, ServiceError> {
        self.enter(Endpoint::RetentionBulk).await?;
        Ok(self.retention_bulk.clone())
    }
}

pub(super) type TestService = WorkforceInsightsService<FakePredictions, InMemoryHistoryStorage>;

pub(super) fn build_service(
    predictions: FakePredictions,
) -> (
    Arc<TestService>,
    Arc<FakePredictions>,
    Arc<PredictionHistoryStore<InMemoryHistoryStorage>>,
) {
    let predictions = Arc::new(predictions);
    let history = Arc::new(PredictionHistoryStore::load(InMemoryHistoryStorage::new()));
    let service = Arc::new(WorkforceInsightsService::new(
        predictions.clone(),
        history.clone(),
        RuleBook::standard(),
    ));
    (service, predictions, history)
}

/// Storage that reads as empty and refuses every write.
pub(super) struct UnavailableStorage;

impl HistoryStorage for UnavailableStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, _document: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }
}

/// Storage whose write waits for the test to release it, so a write made on the async
/// runtime thread itself would stall until the timeout.
pub(super) struct HandshakeStorage {
    entered: AtomicBool,
    released: AtomicBool,
    release: Mutex<Receiver<()>>,
}

impl HandshakeStorage {
    pub(super) fn new(release: Receiver<()>) -> Self {
        Self {
            entered: AtomicBool::new(false),
            released: AtomicBool::new(false),
            release: Mutex::new(release),
        }
    }

    pub(super) fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    pub(super) fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl HistoryStorage for HandshakeStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, _document: &str) -> Result<(), StorageError> {
        self.entered.store(true, Ordering::SeqCst);
        let release = self.release.lock().expect("release mutex poisoned");
        let released = release.recv_timeout(Duration::from_secs(5)).is_ok();
        self.released.store(released, Ordering::SeqCst);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
