//! Zone-dependent cluster-size filter.
//!
//! Each hit is classified independently:
//! 1. Incident angle and radius from the global position
//! 2. Bounding-box cluster shape from the constituent local positions
//! 3. Layer decoded from the cell ID; excluded layers are dropped
//! 4. First zone (in configuration order) containing theta (barrel) or r (endcap)
//! 5. Keep if the cluster y extent (barrel) or constituent count (endcap)
//!    is below the zone's cut
//!
//! A hit that matches a zone but fails its cut is dropped; later zones are
//! never consulted.
#![allow(clippy::cast_precision_loss)]

use crate::statistics::FilterStatistics;
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;
use trackfilter_core::config::{DetectorType, FilterConfig};
use trackfilter_core::error::FilterError;
use trackfilter_core::geometry::{ClusterShape, HitGeometry};
use trackfilter_core::hit::{SimTrackerHit, TrackerHit};
use trackfilter_core::relation::Relation;

/// Why a hit was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The hit lies on an excluded layer.
    ExcludedLayer {
        /// Decoded layer index.
        layer: u32,
    },
    /// No configured zone contains the hit.
    NoMatchingZone,
    /// The hit's zone rejected its cluster size.
    ClusterTooLarge {
        /// Index of the matching zone.
        zone: usize,
    },
}

/// Per-hit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The hit passes the cut of this zone.
    Keep {
        /// Index of the matching zone.
        zone: usize,
    },
    /// The hit is removed.
    Drop(DropReason),
}

impl Decision {
    /// True for [`Decision::Keep`].
    #[inline]
    #[must_use]
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep { .. })
    }
}

/// Result of filtering one event.
#[derive(Debug, Clone, Default)]
pub struct FilterOutput {
    /// Kept hits, in input order.
    pub hits: Vec<Arc<TrackerHit>>,
    /// Relations of the kept hits, aligned with `hits`.
    pub relations: Vec<Arc<Relation>>,
    /// Decision tallies.
    pub statistics: FilterStatistics,
}

/// Cluster-size filter over a validated configuration.
#[derive(Debug, Clone)]
pub struct ClusterFilter {
    config: FilterConfig,
    parallel: bool,
}

impl ClusterFilter {
    /// Creates a filter. Hits are classified in parallel by default.
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    /// Set whether to classify hits in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Computes the cluster shape of a hit from its constituents.
    ///
    /// # Errors
    /// Returns [`FilterError::MalformedConstituent`] if a constituent is not
    /// a simulated tracker hit.
    pub fn cluster_shape(hit: &TrackerHit) -> Result<ClusterShape, FilterError> {
        let constituents = hit
            .raw_hits
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                raw.as_sim_tracker_hit()
                    .ok_or_else(|| FilterError::MalformedConstituent {
                        hit: hit.id,
                        index,
                        found: raw.type_name().to_string(),
                    })
            })
            .collect::<Result<Vec<&SimTrackerHit>, _>>()?;

        debug!("Number of raw hits: {}", constituents.len());
        Ok(ClusterShape::from_sim_hits(constituents))
    }

    /// Classifies one hit.
    ///
    /// # Errors
    /// Returns [`FilterError::MalformedConstituent`] if the cluster shape
    /// cannot be computed.
    pub fn classify(&self, hit: &TrackerHit) -> Result<Decision, FilterError> {
        let geometry = HitGeometry::from_position(&hit.position);
        let shape = Self::cluster_shape(hit)?;
        let layer = self.config.layer_of(hit.cell_id);

        debug!(
            "hit {}: system {:?}, layer {}, theta {:.4}, r {:.3}, size_x {}, size_y {}, size_total {}",
            hit.id,
            self.config.system_of(hit.cell_id),
            layer,
            geometry.theta,
            geometry.r,
            shape.size_x,
            shape.size_y,
            shape.size_total
        );

        if let Ok(layer) = u32::try_from(layer) {
            if self.config.excluded_layers().contains(layer) {
                return Ok(Decision::Drop(DropReason::ExcludedLayer { layer }));
            }
        }

        let (value, size) = match self.config.detector_type() {
            DetectorType::Barrel => (geometry.theta, shape.size_y),
            DetectorType::Endcap => (geometry.r, shape.size_total as f64),
        };

        let decision = match self.config.zones().find_first(value) {
            None => Decision::Drop(DropReason::NoMatchingZone),
            Some(zone) => {
                debug!(
                    "zone {} ({}, {}]: cluster size {} against cut {}",
                    zone.index, zone.min, zone.max, size, zone.threshold
                );
                if zone.accepts(size) {
                    Decision::Keep { zone: zone.index }
                } else {
                    Decision::Drop(DropReason::ClusterTooLarge { zone: zone.index })
                }
            }
        };
        Ok(decision)
    }

    /// Filters positionally paired hits and relations.
    ///
    /// Output order follows input order and `relations[i]` stays paired
    /// with `hits[i]`. Records are shared, not copied.
    ///
    /// # Errors
    /// Returns [`FilterError::RelationCountMismatch`] if the inputs differ in
    /// length, or the error of the lowest-indexed hit that failed to classify.
    pub fn filter(
        &self,
        hits: &[Arc<TrackerHit>],
        relations: &[Arc<Relation>],
    ) -> Result<FilterOutput, FilterError> {
        if hits.len() != relations.len() {
            return Err(FilterError::RelationCountMismatch {
                hits: hits.len(),
                relations: relations.len(),
            });
        }

        let decisions: Vec<Result<Decision, FilterError>> = if self.parallel {
            hits.par_iter().map(|hit| self.classify(hit)).collect()
        } else {
            hits.iter().map(|hit| self.classify(hit)).collect()
        };

        let mut output = FilterOutput {
            statistics: FilterStatistics::new(hits.len()),
            ..FilterOutput::default()
        };

        for ((decision, hit), relation) in decisions.into_iter().zip(hits).zip(relations) {
            let decision = decision?;
            output.statistics.record(decision);
            if decision.is_keep() {
                output.hits.push(Arc::clone(hit));
                output.relations.push(Arc::clone(relation));
            }
        }

        Ok(output)
    }
}
