use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::analytics::{bulk_series, history_series, individual_series, ChartSeries};
use super::domain::{BulkPredictions, EmployeeProfile, PredictionResult};
use super::explanations::{
    bulk_watchlists, explain, history_watchlists, Explanations, RuleBook, Watchlists,
};
use super::history::{HistoryEntry, HistoryError, HistoryStorage, PredictionHistoryStore};
use super::import::{BulkImportError, BulkUpload};
use super::predictions::{BatchError, BatchStatus, PredictionBatch, PredictionService};
use super::report::BulkSummary;

/// Outcome of one individual prediction run.
#[derive(Debug, Clone, Serialize)]
pub struct IndividualInsights {
    pub profile: EmployeeProfile,
    pub results: PredictionResult,
    pub explanations: Explanations,
    pub series: ChartSeries,
}

/// Outcome of one bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkInsights {
    pub predictions: BulkPredictions,
    pub summary: BulkSummary,
    pub series: ChartSeries,
    pub watchlists: Watchlists,
}

/// History-wide analytics. Empty history yields zero counts and empty lists.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryAnalytics {
    pub entries: usize,
    pub series: ChartSeries,
    pub watchlists: Watchlists,
}

#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Import(#[from] BulkImportError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Facade composing the prediction batch, the history store, and the rule book.
pub struct WorkforceInsightsService<P, S> {
    batch: PredictionBatch<P>,
    history: Arc<PredictionHistoryStore<S>>,
    rules: Arc<RuleBook>,
    context: EmployeeProfile,
}

impl<P, S> WorkforceInsightsService<P, S>
where
    P: PredictionService + 'static,
    S: HistoryStorage + 'static,
{
    pub fn new(
        predictions: Arc<P>,
        history: Arc<PredictionHistoryStore<S>>,
        rules: RuleBook,
    ) -> Self {
        Self {
            batch: PredictionBatch::new(predictions),
            history,
            rules: Arc::new(rules),
            context: EmployeeProfile::default(),
        }
    }

    /// Profile read for bulk rows that carry no profile of their own.
    pub fn with_context_profile(mut self, context: EmployeeProfile) -> Self {
        self.context = context;
        self
    }

    pub fn status(&self) -> BatchStatus {
        self.batch.status()
    }

    /// Validates, runs the three calls, and records the run at the front of the history.
    pub async fn predict(
        &self,
        profile: EmployeeProfile,
    ) -> Result<IndividualInsights, InsightsError> {
        let results = self.batch.run(&profile).await?;
        self.record(HistoryEntry::individual(profile.clone(), results))
            .await?;

        Ok(IndividualInsights {
            explanations: explain(&profile, &results),
            series: individual_series(&profile, &results),
            profile,
            results,
        })
    }

    /// Runs the bulk calls, keeps the parsed row profiles on the results, and records the run
    /// at the back of the history.
    pub async fn predict_bulk(&self, upload: &BulkUpload) -> Result<BulkInsights, InsightsError> {
        let mut predictions = self.batch.run_bulk(upload).await?;
        predictions.profiles = upload.profiles().to_vec();
        self.record(HistoryEntry::bulk(predictions.clone())).await?;
        info!(rows = predictions.len(), "bulk run recorded");

        Ok(self.bulk_insights(predictions))
    }

    pub async fn predict_bulk_csv(&self, csv: &str) -> Result<BulkInsights, InsightsError> {
        let upload = BulkUpload::from_bytes(csv.as_bytes())?;
        self.predict_bulk(&upload).await
    }

    /// Summary, series, and watchlists for results already in hand.
    pub fn bulk_insights(&self, predictions: BulkPredictions) -> BulkInsights {
        BulkInsights {
            summary: BulkSummary::from_predictions(&predictions),
            series: bulk_series(&predictions, &self.context),
            watchlists: bulk_watchlists(&predictions, &self.context, &self.rules),
            predictions,
        }
    }

    pub fn analytics(&self) -> Result<HistoryAnalytics, InsightsError> {
        self.analytics_for(&self.context)
    }

    pub fn analytics_for(
        &self,
        context: &EmployeeProfile,
    ) -> Result<HistoryAnalytics, InsightsError> {
        let entries = self.history.all()?;
        Ok(HistoryAnalytics {
            entries: entries.len(),
            series: history_series(&entries, context),
            watchlists: history_watchlists(&entries, context, &self.rules),
        })
    }

    /// Narratives only; never calls the remote services.
    pub fn explain(&self, profile: &EmployeeProfile, results: &PredictionResult) -> Explanations {
        explain(profile, results)
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, InsightsError> {
        Ok(self.history.all()?)
    }

    pub async fn clear_history(&self) -> Result<(), InsightsError> {
        let history = Arc::clone(&self.history);
        tokio::task::spawn_blocking(move || history.clear())
            .await
            .map_err(HistoryError::from)??;
        info!("prediction history cleared");
        Ok(())
    }

    /// The store holds its lock across the storage write, so the write runs on the blocking pool.
    async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let history = Arc::clone(&self.history);
        tokio::task::spawn_blocking(move || history.record(entry)).await?
    }
}
