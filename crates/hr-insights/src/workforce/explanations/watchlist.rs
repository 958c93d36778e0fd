use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rules::{Finding, RuleBook, RuleSubject, ViewContext};
use crate::workforce::domain::{
    format_percentage, BulkPredictions, EmployeeProfile, PredictionResult,
};
use crate::workforce::history::HistoryEntry;

const TOP_PERFORMER: u8 = 4;
const UNDERPERFORMER_BELOW: u8 = 3;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One flagged employee with the rendered recommendation sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistEntry {
    pub context: ViewContext,
    /// 1-based row within a bulk run, `None` for individual runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<usize>,
    /// 1-based history position, `None` outside the history view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<usize>,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attrition_probability: Option<f64>,
    pub finding: Finding,
    pub summary: String,
}

/// At-risk top performers and underperformers for one view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Watchlists {
    pub at_risk: Vec<WatchlistEntry>,
    pub underperformers: Vec<WatchlistEntry>,
}

impl Watchlists {
    pub fn is_empty(&self) -> bool {
        self.at_risk.is_empty() && self.underperformers.is_empty()
    }

    fn extend(&mut self, other: Watchlists) {
        self.at_risk.extend(other.at_risk);
        self.underperformers.extend(other.underperformers);
    }
}

/// Flags employees of one bulk run. Rows without a retained profile read `context`.
pub fn bulk_watchlists(
    bulk: &BulkPredictions,
    context: &EmployeeProfile,
    rules: &RuleBook,
) -> Watchlists {
    let chains = rules.for_context(ViewContext::Bulk);
    let mut lists = Watchlists::default();

    for (index, rating, probability) in at_risk_rows(bulk) {
        let profile = bulk.profile_at(index, context);
        let finding = chains.at_risk.evaluate(&RuleSubject { profile, rating });
        let summary = format!(
            "Employee {number} ({role} in {department}): A top performer (Rating: {rating}/5) \
             with {tenure} years tenure and ${income} income is at high risk of leaving \
             ({probability}% probability). Likely reason: {reason}. Recommended action: \
             {action} to retain this valuable asset.",
            number = index + 1,
            role = profile.job_role,
            department = profile.department,
            tenure = profile.years_at_company,
            income = profile.monthly_income,
            probability = format_percentage(probability),
            reason = finding.reason,
            action = finding.action,
        );
        lists.at_risk.push(WatchlistEntry {
            context: ViewContext::Bulk,
            employee: Some(index + 1),
            prediction: None,
            rating,
            attrition_probability: Some(probability),
            finding,
            summary,
        });
    }

    for (index, rating) in underperforming_rows(bulk) {
        let profile = bulk.profile_at(index, context);
        let finding = chains
            .underperformer
            .evaluate(&RuleSubject { profile, rating });
        let summary = format!(
            "Employee {number} ({role} in {department}): Underperforming with a rating of \
             {rating}/5. Likely reason: {reason}. Recommended action: {action} to improve \
             output or consider termination if no progress is made.",
            number = index + 1,
            role = profile.job_role,
            department = profile.department,
            reason = finding.reason,
            action = finding.action,
        );
        lists.underperformers.push(WatchlistEntry {
            context: ViewContext::Bulk,
            employee: Some(index + 1),
            prediction: None,
            rating,
            attrition_probability: None,
            finding,
            summary,
        });
    }

    lists
}

/// Flags employees across the whole history in stored order.
pub fn history_watchlists(
    entries: &[HistoryEntry],
    context: &EmployeeProfile,
    rules: &RuleBook,
) -> Watchlists {
    let mut lists = Watchlists::default();
    for (index, entry) in entries.iter().enumerate() {
        let prediction = index + 1;
        let timestamp = entry.timestamp();
        let flagged = match entry {
            HistoryEntry::Bulk { bulk_results, .. } => {
                history_bulk_entry(bulk_results, context, rules, prediction, timestamp)
            }
            HistoryEntry::Individual {
                profile, results, ..
            } => history_individual_entry(profile, results, rules, prediction, timestamp),
        };
        lists.extend(flagged);
    }
    lists
}

fn history_bulk_entry(
    bulk: &BulkPredictions,
    context: &EmployeeProfile,
    rules: &RuleBook,
    prediction: usize,
    timestamp: DateTime<Utc>,
) -> Watchlists {
    let chains = rules.for_context(ViewContext::HistoryBulk);
    let stamp = timestamp.format(TIMESTAMP_FORMAT);
    let mut lists = Watchlists::default();

    for (index, rating, probability) in at_risk_rows(bulk) {
        let profile = bulk.profile_at(index, context);
        let finding = chains.at_risk.evaluate(&RuleSubject { profile, rating });
        let summary = format!(
            "Bulk Employee {number} (Prediction {prediction}, {stamp}): {role} in {department} \
             with {rating}/5 performance and {tenure} years tenure is at risk ({probability}%). \
             Reason: {reason}. Action: {action} to prevent turnover.",
            number = index + 1,
            role = profile.job_role,
            department = profile.department,
            tenure = profile.years_at_company,
            probability = format_percentage(probability),
            reason = finding.reason,
            action = finding.action,
        );
        lists.at_risk.push(WatchlistEntry {
            context: ViewContext::HistoryBulk,
            employee: Some(index + 1),
            prediction: Some(prediction),
            rating,
            attrition_probability: Some(probability),
            finding,
            summary,
        });
    }

    for (index, rating) in underperforming_rows(bulk) {
        let profile = bulk.profile_at(index, context);
        let finding = chains
            .underperformer
            .evaluate(&RuleSubject { profile, rating });
        let summary = format!(
            "Bulk Employee {number} (Prediction {prediction}, {stamp}): {role} in {department} \
             with {rating}/5 rating. Reason: {reason}. Action: {action} or consider termination \
             if no improvement.",
            number = index + 1,
            role = profile.job_role,
            department = profile.department,
            reason = finding.reason,
            action = finding.action,
        );
        lists.underperformers.push(WatchlistEntry {
            context: ViewContext::HistoryBulk,
            employee: Some(index + 1),
            prediction: Some(prediction),
            rating,
            attrition_probability: None,
            finding,
            summary,
        });
    }

    lists
}

fn history_individual_entry(
    profile: &EmployeeProfile,
    results: &PredictionResult,
    rules: &RuleBook,
    prediction: usize,
    timestamp: DateTime<Utc>,
) -> Watchlists {
    let chains = rules.for_context(ViewContext::HistoryIndividual);
    let stamp = timestamp.format(TIMESTAMP_FORMAT);
    let rating = results.performance.rating;
    let subject = RuleSubject { profile, rating };
    let mut lists = Watchlists::default();

    if results.attrition.is_high_risk() && rating >= TOP_PERFORMER {
        let probability = results.attrition.probability;
        let finding = chains.at_risk.evaluate(&subject);
        let summary = format!(
            "Individual Prediction {prediction} ({stamp}): {role} in {department} with \
             {rating}/5 performance and ${income} income is at risk ({percent}%). Reason: \
             {reason}. Action: {action} to retain talent.",
            role = profile.job_role,
            department = profile.department,
            income = profile.monthly_income,
            percent = format_percentage(probability),
            reason = finding.reason,
            action = finding.action,
        );
        lists.at_risk.push(WatchlistEntry {
            context: ViewContext::HistoryIndividual,
            employee: None,
            prediction: Some(prediction),
            rating,
            attrition_probability: Some(probability),
            finding,
            summary,
        });
    }

    if rating < UNDERPERFORMER_BELOW {
        let finding = chains.underperformer.evaluate(&subject);
        let summary = format!(
            "Individual Prediction {prediction} ({stamp}): {role} in {department} with \
             {rating}/5 rating. Reason: {reason}. Action: {action} or evaluate role fit.",
            role = profile.job_role,
            department = profile.department,
            reason = finding.reason,
            action = finding.action,
        );
        lists.underperformers.push(WatchlistEntry {
            context: ViewContext::HistoryIndividual,
            employee: None,
            prediction: Some(prediction),
            rating,
            attrition_probability: None,
            finding,
            summary,
        });
    }

    lists
}

/// Rows whose attrition flag is set and whose rating at the same index is a top rating.
fn at_risk_rows(bulk: &BulkPredictions) -> impl Iterator<Item = (usize, u8, f64)> + '_ {
    bulk.attrition
        .iter()
        .enumerate()
        .filter(|(_, attrition)| attrition.is_high_risk())
        .filter_map(|(index, attrition)| {
            let rating = bulk.performance.get(index)?.rating;
            (rating >= TOP_PERFORMER).then_some((index, rating, attrition.probability))
        })
}

fn underperforming_rows(bulk: &BulkPredictions) -> impl Iterator<Item = (usize, u8)> + '_ {
    bulk.performance
        .iter()
        .enumerate()
        .filter(|(_, performance)| performance.rating < UNDERPERFORMER_BELOW)
        .map(|(index, performance)| (index, performance.rating))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workforce::domain::{AttritionPrediction, PerformancePrediction};

    fn bulk(rows: &[(u8, u8)]) -> BulkPredictions {
        BulkPredictions {
            attrition: rows
                .iter()
                .map(|(risk, _)| AttritionPrediction {
                    risk: *risk,
                    probability: 0.9,
                })
                .collect(),
            performance: rows
                .iter()
                .map(|(_, rating)| PerformancePrediction { rating: *rating })
                .collect(),
            ..BulkPredictions::default()
        }
    }

    #[test]
    fn at_risk_joins_attrition_and_performance_by_index() {
        let lists = bulk_watchlists(
            &bulk(&[(1, 5), (1, 3), (0, 5), (1, 4)]),
            &EmployeeProfile::default(),
            &RuleBook::standard(),
        );
        let employees: Vec<_> = lists.at_risk.iter().map(|entry| entry.employee).collect();
        assert_eq!(employees, vec![Some(1), Some(4)]);
        assert!(lists.at_risk[0]
            .summary
            .starts_with("Employee 1 (Manager in Sales): A top performer (Rating: 5/5)"));
        assert!(lists.at_risk[0].summary.contains("(90.00% probability)"));
    }

    #[test]
    fn missing_performance_row_is_not_flagged() {
        let mut predictions = bulk(&[(1, 5)]);
        predictions.attrition.push(AttritionPrediction {
            risk: 1,
            probability: 0.7,
        });
        let lists = bulk_watchlists(
            &predictions,
            &EmployeeProfile::default(),
            &RuleBook::standard(),
        );
        assert_eq!(lists.at_risk.len(), 1);
    }

    #[test]
    fn underperformers_use_strict_threshold() {
        let lists = bulk_watchlists(
            &bulk(&[(0, 2), (0, 3), (0, 1)]),
            &EmployeeProfile::default(),
            &RuleBook::standard(),
        );
        let ratings: Vec<_> = lists.underperformers.iter().map(|entry| entry.rating).collect();
        assert_eq!(ratings, vec![2, 1]);
    }
}
