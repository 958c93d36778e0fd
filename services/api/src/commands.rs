use crate::infra::{build_insights_service, read_profile, read_results};
use chrono::Utc;
use clap::Args;
use hr_insights::config::AppConfig;
use hr_insights::error::AppError;
use hr_insights::workforce::analytics::ChartSeries;
use hr_insights::workforce::explanations::{
    explain, Explanations, ViewContext, WatchlistEntry, Watchlists,
};
use hr_insights::workforce::report::{individual_report, summary_report, write_bulk_csv};
use hr_insights::workforce::{format_percentage, BulkUpload, HistoryEntry};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON file holding one employee profile (wire keys such as `Age`, `MonthlyIncome`)
    #[arg(long)]
    pub(crate) profile: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct BulkArgs {
    /// CSV file with one employee per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Write the per-employee results as CSV to this path
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// JSON file holding the employee profile
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// JSON file holding `attrition`, `performance`, and `retention` results
    #[arg(long)]
    pub(crate) results: PathBuf,
}

pub(crate) async fn run_predict(config: &AppConfig, args: PredictArgs) -> Result<(), AppError> {
    let service = build_insights_service(config)?;
    let profile = read_profile(&args.profile)?;

    let insights = service.predict(profile).await?;
    println!(
        "{}",
        individual_report(&insights.profile, &insights.results, Utc::now()).render()
    );
    render_explanations(&insights.explanations);
    Ok(())
}

pub(crate) async fn run_bulk(config: &AppConfig, args: BulkArgs) -> Result<(), AppError> {
    let service = build_insights_service(config)?;
    let upload = BulkUpload::from_path(&args.csv)?;

    println!("Uploading {} employees from {}", upload.len(), args.csv.display());
    let insights = service.predict_bulk(&upload).await?;
    println!("{}", summary_report(&insights.summary, Utc::now()).render());
    render_series(&insights.series);
    render_watchlists(&insights.watchlists);

    if let Some(path) = args.export {
        let writer = BufWriter::new(File::create(&path)?);
        write_bulk_csv(&insights.predictions, writer)?;
        println!("\nResults exported to {}", path.display());
    }
    Ok(())
}

pub(crate) fn run_analytics(config: &AppConfig) -> Result<(), AppError> {
    let service = build_insights_service(config)?;

    let analytics = service.analytics()?;
    println!("History analytics ({} stored predictions)", analytics.entries);
    render_series(&analytics.series);
    render_watchlists(&analytics.watchlists);
    Ok(())
}

pub(crate) fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let profile = read_profile(&args.profile)?;
    let results = read_results(&args.results)?;
    render_explanations(&explain(&profile, &results));
    Ok(())
}

pub(crate) fn run_history_list(config: &AppConfig) -> Result<(), AppError> {
    let service = build_insights_service(config)?;

    let entries = service.history()?;
    if entries.is_empty() {
        println!("No predictions stored in {}", config.history.path.display());
        return Ok(());
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{}", describe_entry(index, entry));
    }
    Ok(())
}

pub(crate) async fn run_history_clear(config: &AppConfig) -> Result<(), AppError> {
    let service = build_insights_service(config)?;
    service.clear_history().await?;
    println!("Prediction history cleared");
    Ok(())
}

fn describe_entry(index: usize, entry: &HistoryEntry) -> String {
    let stamp = entry.timestamp().format("%Y-%m-%d %H:%M:%S UTC");
    match entry {
        HistoryEntry::Individual {
            profile, results, ..
        } => format!(
            "{}. [{stamp}] {} {} in {}: attrition {}%, rating {}/5, retention {}%",
            index + 1,
            entry.kind_label(),
            profile.job_role,
            profile.department,
            format_percentage(results.attrition.probability),
            results.performance.rating,
            format_percentage(results.retention.probability),
        ),
        HistoryEntry::Bulk { bulk_results, .. } => format!(
            "{}. [{stamp}] {} upload of {} employees",
            index + 1,
            entry.kind_label(),
            bulk_results.len(),
        ),
    }
}

fn render_explanations(explanations: &Explanations) {
    println!("Performance insight:\n  {}", explanations.performance.text);
    println!("Attrition insight:\n  {}", explanations.attrition.text);
    println!("Retention insight:\n  {}", explanations.retention.text);
}

fn render_series(series: &ChartSeries) {
    println!("\nPerformance distribution:");
    for (rating, count) in series.performance_distribution.entries() {
        println!("  - Rating {rating}: {count}");
    }
    println!(
        "Job satisfaction: {} high / {} low",
        series.satisfaction_split.high, series.satisfaction_split.low
    );
    match series.work_life_balance_average {
        Some(average) => println!("Average work-life balance: {average:.2}/5"),
        None => println!("Average work-life balance: n/a"),
    }
    println!(
        "Attrition risk: {} high / {} low",
        series.attrition_split.high, series.attrition_split.low
    );
    if !series.retention_trend.is_empty() {
        println!("Retention risk trend:");
        for point in &series.retention_trend {
            println!("  - {}: {:.2}%", point.label, point.value);
        }
    }
}

fn render_watchlists(watchlists: &Watchlists) {
    print!("{}", watchlist_text(watchlists));
}

/// Watchlists grouped by view, so mixed history runs read under their own heading.
fn watchlist_text(watchlists: &Watchlists) -> String {
    if watchlists.is_empty() {
        return "\nNo employees flagged.\n".to_string();
    }

    let mut text = String::new();
    for context in ViewContext::ordered() {
        let at_risk = in_context(&watchlists.at_risk, context);
        let underperformers = in_context(&watchlists.underperformers, context);
        if at_risk.is_empty() && underperformers.is_empty() {
            continue;
        }
        text.push_str(&format!("\n{}\n", context.label()));
        for (heading, entries) in [
            ("At-risk top performers", at_risk),
            ("Underperformers", underperformers),
        ] {
            if entries.is_empty() {
                continue;
            }
            text.push_str(&format!("  {heading}:\n"));
            for entry in entries {
                text.push_str(&format!("    - {}\n", entry.summary));
            }
        }
    }
    text
}

fn in_context(entries: &[WatchlistEntry], context: ViewContext) -> Vec<&WatchlistEntry> {
    entries
        .iter()
        .filter(|entry| entry.context == context)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_insights::workforce::explanations::Finding;
    use hr_insights::workforce::{
        AttritionPrediction, BulkPredictions, EmployeeProfile, PerformancePrediction,
        PredictionResult, RetentionPrediction,
    };

    #[test]
    fn individual_entries_describe_role_and_probabilities() {
        let entry = HistoryEntry::individual(
            EmployeeProfile::default(),
            PredictionResult {
                attrition: AttritionPrediction {
                    risk: 0,
                    probability: 0.12,
                },
                performance: PerformancePrediction { rating: 4 },
                retention: RetentionPrediction {
                    risk: 0,
                    probability: 0.305,
                },
            },
        );

        let line = describe_entry(0, &entry);

        assert!(line.starts_with("1. ["));
        assert!(line.ends_with(
            "individual Manager in Sales: attrition 12.00%, rating 4/5, retention 30.50%"
        ));
    }

    #[test]
    fn bulk_entries_report_row_count() {
        let entry = HistoryEntry::bulk(BulkPredictions {
            attrition: vec![
                AttritionPrediction {
                    risk: 1,
                    probability: 0.9,
                };
                4
            ],
            ..BulkPredictions::default()
        });

        assert!(describe_entry(2, &entry).ends_with("bulk upload of 4 employees"));
    }

    fn flagged(context: ViewContext, summary: &str) -> WatchlistEntry {
        WatchlistEntry {
            context,
            employee: None,
            prediction: Some(1),
            rating: 2,
            attrition_probability: None,
            finding: Finding {
                rule: None,
                reason: "review".to_string(),
                action: "coach".to_string(),
            },
            summary: summary.to_string(),
        }
    }

    #[test]
    fn watchlists_are_grouped_under_their_view_heading() {
        let watchlists = Watchlists {
            at_risk: vec![flagged(ViewContext::HistoryBulk, "bulk row at risk")],
            underperformers: vec![
                flagged(ViewContext::HistoryIndividual, "individual run lagging"),
                flagged(ViewContext::HistoryBulk, "bulk row lagging"),
            ],
        };

        let text = watchlist_text(&watchlists);

        let bulk = text.find("History (bulk runs)").expect("bulk heading");
        let individual = text
            .find("History (individual runs)")
            .expect("individual heading");
        assert!(bulk < individual);
        assert!(text[bulk..individual].contains("bulk row at risk"));
        assert!(text[bulk..individual].contains("bulk row lagging"));
        assert!(text[individual..].contains("individual run lagging"));
        assert!(!text.contains("Bulk upload"));
    }

    #[test]
    fn empty_watchlists_say_so() {
        assert_eq!(
            watchlist_text(&Watchlists::default()),
            "\nNo employees flagged.\n"
        );
    }
}
