//! Per-event filter statistics.
#![allow(clippy::cast_precision_loss)]

use crate::filter::{Decision, DropReason};
use std::fmt;

/// Tally of filter decisions for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStatistics {
    /// Hits in the input collection.
    pub input: usize,
    /// Hits written to the output collection.
    pub kept: usize,
    /// Hits dropped because their layer is excluded.
    pub excluded_layer: usize,
    /// Hits dropped because no zone contains them.
    pub no_zone: usize,
    /// Hits dropped by their zone's cluster-size cut.
    pub too_large: usize,
}

impl FilterStatistics {
    /// Creates empty statistics for `input` hits.
    #[must_use]
    pub fn new(input: usize) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    /// Counts one decision.
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Keep { .. } => self.kept += 1,
            Decision::Drop(DropReason::ExcludedLayer { .. }) => self.excluded_layer += 1,
            Decision::Drop(DropReason::NoMatchingZone) => self.no_zone += 1,
            Decision::Drop(DropReason::ClusterTooLarge { .. }) => self.too_large += 1,
        }
    }

    /// Hits removed by the filter.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.excluded_layer + self.no_zone + self.too_large
    }

    /// Percentage of input hits kept.
    ///
    /// An empty input retains nothing and reports 0%.
    #[must_use]
    pub fn retention_percent(&self) -> f64 {
        if self.input == 0 {
            0.0
        } else {
            self.kept as f64 / self.input as f64 * 100.0
        }
    }
}

impl fmt::Display for FilterStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of elements in input hit collection: {}", self.input)?;
        writeln!(f, "Number of elements in output hit collection: {}", self.kept)?;
        write!(f, "Percentage of hits retained: {:.2}", self.retention_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_retention() {
        let stats = FilterStatistics {
            input: 100,
            kept: 40,
            ..FilterStatistics::default()
        };
        assert_relative_eq!(stats.retention_percent(), 40.0);
    }

    #[test]
    fn test_retention_empty_input() {
        let stats = FilterStatistics::new(0);
        assert_relative_eq!(stats.retention_percent(), 0.0);
        assert!(stats.to_string().contains("Percentage of hits retained: 0.00"));
    }

    #[test]
    fn test_record() {
        let mut stats = FilterStatistics::new(4);
        stats.record(Decision::Keep { zone: 0 });
        stats.record(Decision::Drop(DropReason::ExcludedLayer { layer: 1 }));
        stats.record(Decision::Drop(DropReason::NoMatchingZone));
        stats.record(Decision::Drop(DropReason::ClusterTooLarge { zone: 2 }));
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.dropped(), 3);
        assert_relative_eq!(stats.retention_percent(), 25.0);
    }
}
