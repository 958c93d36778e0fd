use serde::Serialize;

use crate::workforce::domain::BulkPredictions;

/// Headline numbers for one bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BulkSummary {
    pub total_employees: usize,
    pub high_attrition_count: usize,
    /// Mean rating rounded to two decimals, `None` without performance results.
    pub average_performance: Option<f64>,
    pub high_retention_risk_count: usize,
}

impl BulkSummary {
    pub fn from_predictions(bulk: &BulkPredictions) -> Self {
        let average_performance = if bulk.performance.is_empty() {
            None
        } else {
            let sum: u32 = bulk
                .performance
                .iter()
                .map(|performance| u32::from(performance.rating))
                .sum();
            let mean = f64::from(sum) / bulk.performance.len() as f64;
            Some((mean * 100.0).round() / 100.0)
        };

        Self {
            total_employees: bulk.len(),
            high_attrition_count: bulk
                .attrition
                .iter()
                .filter(|attrition| attrition.is_high_risk())
                .count(),
            average_performance,
            high_retention_risk_count: bulk
                .retention
                .iter()
                .filter(|retention| retention.is_high_risk())
                .count(),
        }
    }

    pub fn average_performance_label(&self) -> String {
        self.average_performance
            .map(|average| format!("{average:.2}"))
            .unwrap_or_else(|| "n/a".to_string())
    }
}
