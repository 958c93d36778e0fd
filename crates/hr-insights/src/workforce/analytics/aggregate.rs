use super::series::{ChartSeries, EngagementPoint, Mean, TrendPoint};
use crate::workforce::domain::{BulkPredictions, EmployeeProfile, PredictionResult};
use crate::workforce::history::HistoryEntry;

const HIGH_SATISFACTION: u8 = 4;

/// Probability in [0, 1] as a percentage rounded to two decimals.
pub fn percentage(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 100.0
}

/// Series for a single employee's results.
pub fn individual_series(profile: &EmployeeProfile, results: &PredictionResult) -> ChartSeries {
    let mut builder = SeriesBuilder::default();
    builder.employee(profile, results.performance.rating);
    builder.attrition(results.attrition.is_high_risk());
    builder.series.retention_trend.push(TrendPoint {
        label: "Emp 1".to_string(),
        value: percentage(results.retention.probability),
    });
    builder.finish()
}

/// Series for one bulk run. Profile-dependent series read each row's own profile and fall back
/// to `context` for rows without one.
pub fn bulk_series(bulk: &BulkPredictions, context: &EmployeeProfile) -> ChartSeries {
    let mut builder = SeriesBuilder::default();
    builder.bulk(bulk, context);
    builder.series.retention_trend = bulk
        .retention
        .iter()
        .enumerate()
        .map(|(index, retention)| TrendPoint {
            label: format!("Emp {}", index + 1),
            value: percentage(retention.probability),
        })
        .collect();
    builder.finish()
}

/// Series across the whole history. Individual entries count once, bulk entries contribute
/// every row, and the retention trend holds one point per entry in stored order.
pub fn history_series(entries: &[HistoryEntry], context: &EmployeeProfile) -> ChartSeries {
    let mut builder = SeriesBuilder::default();
    for (index, entry) in entries.iter().enumerate() {
        let trend_value = match entry {
            HistoryEntry::Individual {
                profile, results, ..
            } => {
                builder.employee(profile, results.performance.rating);
                builder.attrition(results.attrition.is_high_risk());
                percentage(results.retention.probability)
            }
            HistoryEntry::Bulk { bulk_results, .. } => {
                builder.bulk(bulk_results, context);
                mean_retention_percentage(bulk_results)
            }
        };
        builder.series.retention_trend.push(TrendPoint {
            label: format!("Prediction {}", index + 1),
            value: trend_value,
        });
    }
    builder.finish()
}

fn mean_retention_percentage(bulk: &BulkPredictions) -> f64 {
    let mut mean = Mean::default();
    for retention in &bulk.retention {
        mean.push(retention.probability);
    }
    mean.value().map(percentage).unwrap_or(0.0)
}

#[derive(Default)]
struct SeriesBuilder {
    series: ChartSeries,
    work_life_balance: Mean,
}

impl SeriesBuilder {
    fn employee(&mut self, profile: &EmployeeProfile, rating: u8) {
        self.series.performance_distribution.record(rating);
        self.series
            .satisfaction_split
            .record(profile.job_satisfaction >= HIGH_SATISFACTION);
        self.work_life_balance
            .push(f64::from(profile.work_life_balance));
        self.series.engagement.push(EngagementPoint {
            involvement: profile.job_involvement,
            rating,
        });
    }

    fn attrition(&mut self, high_risk: bool) {
        self.series.attrition_split.record(high_risk);
    }

    fn bulk(&mut self, bulk: &BulkPredictions, context: &EmployeeProfile) {
        for (index, performance) in bulk.performance.iter().enumerate() {
            self.employee(bulk.profile_at(index, context), performance.rating);
        }
        for attrition in &bulk.attrition {
            self.attrition(attrition.is_high_risk());
        }
    }

    fn finish(mut self) -> ChartSeries {
        self.series.work_life_balance_average = self.work_life_balance.value();
        self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(0.8765), 87.65);
        assert_eq!(percentage(0.123456), 12.35);
        assert_eq!(percentage(1.0), 100.0);
    }

    #[test]
    fn empty_bulk_has_no_average() {
        let series = bulk_series(&BulkPredictions::default(), &EmployeeProfile::default());
        assert!(series.is_empty());
        assert_eq!(series.work_life_balance_average, None);
        assert_eq!(series.satisfaction_split.total(), 0);
    }
}
