//! Per-query running statistics
//!
//! Accumulators keep raw (unscaled) values for `sum` and scaled values for
//! `min`/`max`; averages are scaled at read time.

use crate::services::metrics_analyzer::models::{CanonicalRow, MetricKind, SortMetric};

// ============================================================================
// Metric Accumulator
// ============================================================================

/// Running min/max/sum/count of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAccumulator {
    pub kind: MetricKind,
    /// Scaled minimum, `+inf` until a Min value is seen
    pub min: f64,
    /// Scaled maximum
    pub max: f64,
    /// Raw sum
    pub sum: f64,
    /// Sum of row weights
    pub total_count: f64,
}

impl MetricAccumulator {
    pub fn new(kind: MetricKind) -> Self {
        Self { kind, min: f64::INFINITY, max: 0.0, sum: 0.0, total_count: 0.0 }
    }

    /// Feed one row's Min/Max/Sum triple with the given weight
    pub fn update(&mut self, weight: f64, min: Option<f64>, max: Option<f64>, sum: Option<f64>) {
        let scale = self.kind.scale();
        self.total_count += weight;

        if let Some(v) = min {
            self.min = self.min.min(v / scale);
        }
        if let Some(v) = max {
            self.max = self.max.max(v / scale);
        }
        if let Some(v) = sum {
            self.sum += v;
        }
    }

    /// Scaled average, 0 when nothing has been counted
    pub fn avg(&self) -> f64 {
        if self.total_count > 0.0 {
            self.sum / (self.total_count * self.kind.scale())
        } else {
            0.0
        }
    }

    /// Combine with an accumulator of the same metric built over another partition
    pub fn merge(&mut self, other: &MetricAccumulator) {
        debug_assert_eq!(self.kind, other.kind);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.total_count += other.total_count;
    }
}

// ============================================================================
// Query Statistics
// ============================================================================

/// Statistics for one distinct query text
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatistics {
    pub row_count: u64,
    pub total_count: f64,
    accumulators: [MetricAccumulator; MetricKind::COUNT],
}

impl Default for QueryStatistics {
    fn default() -> Self {
        Self {
            row_count: 0,
            total_count: 0.0,
            accumulators: MetricKind::ALL.map(MetricAccumulator::new),
        }
    }
}

impl QueryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_row(&mut self, row: &CanonicalRow) {
        let weight = row.count;
        self.row_count += 1;
        self.total_count += weight;

        for acc in &mut self.accumulators {
            let sample = row.sample(acc.kind);
            acc.update(weight, sample.min, sample.max, sample.sum);
        }
    }

    pub fn metric(&self, kind: MetricKind) -> &MetricAccumulator {
        &self.accumulators[kind.index()]
    }

    /// Accumulators in report order
    pub fn metrics(&self) -> impl Iterator<Item = &MetricAccumulator> {
        self.accumulators.iter()
    }

    pub fn duration(&self) -> &MetricAccumulator {
        self.metric(MetricKind::Duration)
    }

    pub fn cpu_time(&self) -> &MetricAccumulator {
        self.metric(MetricKind::CpuTime)
    }

    /// Average rows read per second of average duration
    pub fn rows_per_second(&self) -> f64 {
        let duration = self.duration().avg();
        if duration > 0.0 {
            self.metric(MetricKind::ReadRows).avg() / duration
        } else {
            0.0
        }
    }

    /// Average bytes read per average row read
    pub fn bytes_per_row(&self) -> f64 {
        let rows = self.metric(MetricKind::ReadRows).avg();
        if rows > 0.0 {
            self.metric(MetricKind::ReadBytes).avg() / rows
        } else {
            0.0
        }
    }

    /// Value used to rank this query in the report
    pub fn sort_value(&self, metric: SortMetric) -> f64 {
        match metric {
            SortMetric::MaxDuration => self.duration().max,
            SortMetric::AvgDuration => self.duration().avg(),
            SortMetric::MaxCpuTime => self.cpu_time().max,
            SortMetric::AvgCpuTime => self.cpu_time().avg(),
        }
    }

    pub fn merge(&mut self, other: &QueryStatistics) {
        self.row_count += other.row_count;
        self.total_count += other.total_count;
        for (acc, other_acc) in self.accumulators.iter_mut().zip(&other.accumulators) {
            acc.merge(other_acc);
        }
    }
}
