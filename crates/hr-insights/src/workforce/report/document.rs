use chrono::{DateTime, Utc};
use serde::Serialize;

use super::summary::BulkSummary;
use crate::workforce::domain::{
    format_percentage, EmployeeProfile, PredictionResult, ProfileField,
};

/// Lines per rendered page.
pub const PAGE_LINES: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Paginated plain-text report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    fn body(&self) -> Vec<String> {
        let mut lines = vec![
            self.title.clone(),
            format!("Date: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ];
        for section in &self.sections {
            lines.push(String::new());
            lines.push(format!("{}:", section.heading));
            lines.extend(section.lines.iter().cloned());
        }
        lines
    }

    /// Splits the body into pages of at most `lines_per_page` lines (minimum 1).
    pub fn pages(&self, lines_per_page: usize) -> Vec<Vec<String>> {
        self.body()
            .chunks(lines_per_page.max(1))
            .map(<[String]>::to_vec)
            .collect()
    }

    pub fn render(&self) -> String {
        let pages = self.pages(PAGE_LINES);
        let count = pages.len();
        pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                let mut text = page.join("\n");
                text.push_str(&format!("\n\n-- Page {} of {count} --\n", index + 1));
                text
            })
            .collect::<Vec<_>>()
            .join("\u{c}")
    }
}

fn risk_label(high: bool) -> &'static str {
    if high {
        "High"
    } else {
        "Low"
    }
}

pub fn individual_report(
    profile: &EmployeeProfile,
    results: &PredictionResult,
    generated_at: DateTime<Utc>,
) -> ReportDocument {
    let details = ProfileField::ordered()
        .into_iter()
        .map(|field| format!("{}: {}", field.label(), profile.display_value(field)))
        .collect();

    let predictions = vec![
        format!(
            "Attrition Risk: {} (Probability: {}%)",
            risk_label(results.attrition.is_high_risk()),
            format_percentage(results.attrition.probability)
        ),
        format!("Performance Rating: {}/5", results.performance.rating),
        format!(
            "Retention Risk: {} (Probability: {}%)",
            risk_label(results.retention.is_high_risk()),
            format_percentage(results.retention.probability)
        ),
    ];

    ReportDocument {
        title: "Employee Prediction Report".to_string(),
        generated_at,
        sections: vec![
            ReportSection {
                heading: "Employee Details".to_string(),
                lines: details,
            },
            ReportSection {
                heading: "Predictions".to_string(),
                lines: predictions,
            },
        ],
    }
}

pub fn summary_report(summary: &BulkSummary, generated_at: DateTime<Utc>) -> ReportDocument {
    ReportDocument {
        title: "Bulk Analytics Summary".to_string(),
        generated_at,
        sections: vec![ReportSection {
            heading: "Summary Statistics".to_string(),
            lines: vec![
                format!("Total Employees: {}", summary.total_employees),
                format!("High Attrition Risk: {}", summary.high_attrition_count),
                format!(
                    "Average Performance: {}",
                    summary.average_performance_label()
                ),
                format!(
                    "High Retention Risk: {}",
                    summary.high_retention_risk_count
                ),
            ],
        }],
    }
}
