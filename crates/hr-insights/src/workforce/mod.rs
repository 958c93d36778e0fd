//! Workforce prediction insights: typed profiles and results, the history store, chart
//! aggregation, heuristic explanations, bulk import, remote prediction calls, and reporting.

pub mod analytics;
pub mod domain;
pub mod explanations;
pub mod history;
pub mod import;
pub mod predictions;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    format_percentage, form_fields, AttritionPrediction, BulkPredictions, Department,
    EmployeeProfile, FieldDescriptor, Gender, JobRole, OverTime, PerformancePrediction,
    PredictionResult, ProfileField, ProfileValidationError, RetentionPrediction,
};
pub use history::{
    FileHistoryStorage, HistoryEntry, HistoryError, HistoryStorage, InMemoryHistoryStorage,
    InsertPosition, PredictionHistoryStore,
};
pub use import::{BulkImportError, BulkUpload};
pub use predictions::{
    BatchError, BatchStatus, HttpPredictionClient, PredictionBatch, PredictionService,
    ServiceError,
};
pub use router::insights_router;
pub use service::{
    BulkInsights, HistoryAnalytics, IndividualInsights, InsightsError, WorkforceInsightsService,
};
