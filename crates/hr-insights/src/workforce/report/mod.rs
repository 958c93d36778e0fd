//! Summary numbers, paginated text reports, and tabular export for prediction runs.

mod document;
mod export;
mod summary;

pub use document::{individual_report, summary_report, ReportDocument, ReportSection, PAGE_LINES};
pub use export::{bulk_csv, profile_template_csv, write_bulk_csv, write_profile_template};
pub use summary::BulkSummary;
