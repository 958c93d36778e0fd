use serde::Serialize;

/// Count of results per performance rating, index 0 holding rating 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceDistribution {
    pub counts: [usize; 5],
}

impl PerformanceDistribution {
    pub fn record(&mut self, rating: u8) {
        if let Some(slot) = usize::from(rating)
            .checked_sub(1)
            .and_then(|index| self.counts.get_mut(index))
        {
            *slot += 1;
        }
    }

    /// Count for `rating` in 1..=5, zero outside that range.
    pub fn count(&self, rating: u8) -> usize {
        usize::from(rating)
            .checked_sub(1)
            .and_then(|index| self.counts.get(index))
            .copied()
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(rating, count)` pairs in ascending rating order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (1u8..=5).zip(self.counts.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitCount {
    pub high: usize,
    pub low: usize,
}

impl SplitCount {
    pub fn record(&mut self, high: bool) {
        if high {
            self.high += 1;
        } else {
            self.low += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementPoint {
    pub involvement: u8,
    pub rating: u8,
}

/// Chart-ready series for one bulk run or the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub performance_distribution: PerformanceDistribution,
    pub satisfaction_split: SplitCount,
    /// `None` when no employees contributed.
    pub work_life_balance_average: Option<f64>,
    pub attrition_split: SplitCount,
    pub retention_trend: Vec<TrendPoint>,
    pub engagement: Vec<EngagementPoint>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.performance_distribution.total() == 0
            && self.attrition_split.total() == 0
            && self.retention_trend.is_empty()
    }
}

/// Running mean that reports `None` instead of dividing by zero.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_ignores_out_of_range_ratings() {
        let mut distribution = PerformanceDistribution::default();
        distribution.record(0);
        distribution.record(6);
        distribution.record(3);
        assert_eq!(distribution.counts, [0, 0, 1, 0, 0]);
        assert_eq!(distribution.count(9), 0);
    }

    #[test]
    fn empty_mean_is_none() {
        assert_eq!(Mean::default().value(), None);
        let mut mean = Mean::default();
        mean.push(2.0);
        mean.push(5.0);
        assert_eq!(mean.value(), Some(3.5));
    }
}
