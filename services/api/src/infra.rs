use hr_insights::config::AppConfig;
use hr_insights::error::AppError;
use hr_insights::workforce::explanations::RuleBook;
use hr_insights::workforce::{
    EmployeeProfile, FileHistoryStorage, HttpPredictionClient, PredictionHistoryStore,
    PredictionResult, WorkforceInsightsService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type LiveInsightsService =
    WorkforceInsightsService<HttpPredictionClient, FileHistoryStorage>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Rule book override from `HR_RULEBOOK_PATH`, otherwise the standard chains.
pub(crate) fn load_rules(config: &AppConfig) -> Result<RuleBook, AppError> {
    match &config.history.rulebook_path {
        Some(path) => {
            let rules = RuleBook::from_path(path)?;
            info!(path = %path.display(), "loaded rule book override");
            Ok(rules)
        }
        None => Ok(RuleBook::standard()),
    }
}

pub(crate) fn build_insights_service(config: &AppConfig) -> Result<LiveInsightsService, AppError> {
    let client = Arc::new(HttpPredictionClient::new(&config.predictions)?);
    let history = Arc::new(PredictionHistoryStore::load(FileHistoryStorage::new(
        config.history.path.clone(),
    )));
    let rules = load_rules(config)?;
    Ok(WorkforceInsightsService::new(client, history, rules))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)?;
    let value = serde_json::from_str(&raw).map_err(std::io::Error::from)?;
    Ok(value)
}

pub(crate) fn read_profile(path: &Path) -> Result<EmployeeProfile, AppError> {
    read_json(path)
}

pub(crate) fn read_results(path: &Path) -> Result<PredictionResult, AppError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_insights::workforce::OverTime;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn profiles_read_from_wire_keys() {
        let file = temp_file(
            r#"{"Age":41,"Gender":"Female","Department":"Human Resources","JobRole":"Manager",
            "MonthlyIncome":8000,"YearsAtCompany":6,"OverTime":"Yes","JobSatisfaction":3,
            "WorkLifeBalance":2,"TotalWorkingYears":18,"TrainingTimesLastYear":2,
            "JobInvolvement":4,"EnvironmentSatisfaction":3,"RelationshipSatisfaction":4}"#,
        );

        let profile = read_profile(file.path()).expect("profile parses");

        assert_eq!(profile.age, 41);
        assert_eq!(profile.over_time, OverTime::Yes);
    }

    #[test]
    fn malformed_json_surfaces_as_io_error() {
        let file = temp_file("{");

        let err = read_results(file.path()).expect_err("invalid json");

        assert!(matches!(err, AppError::Io(_)));
    }
}
