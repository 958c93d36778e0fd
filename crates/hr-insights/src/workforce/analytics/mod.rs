//! Pure aggregation of prediction results into chart-ready series.

mod aggregate;
mod series;

pub use aggregate::{bulk_series, history_series, individual_series, percentage};
pub use series::{ChartSeries, EngagementPoint, PerformanceDistribution, SplitCount, TrendPoint};
