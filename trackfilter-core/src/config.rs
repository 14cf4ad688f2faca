//! Filter configuration.
//!
//! [`FilterParameters`] holds steering values as the host supplies them
//! (text). [`FilterParameters::validate`] turns them into an immutable
//! [`FilterConfig`], rejecting malformed input before any event is seen.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

use crate::cell_id::{CellIdDecoder, TRACKER_CELL_ID_ENCODING};
use crate::error::ConfigError;
use log::warn;
use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default name of the filtered hit collection.
pub const DEFAULT_OUT_TRACKER_HIT_COLLECTION: &str = "FilteredVBTrackerHits";
/// Default name of the filtered relation collection.
pub const DEFAULT_OUT_RELATION_COLLECTION: &str = "FilteredVBTrackerHitsRelations";

/// Raw steering parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(default, rename_all = "PascalCase")
)]
pub struct FilterParameters {
    /// `"Barrel"` selects barrel mode; any other value selects endcap mode.
    pub detector_type: String,
    /// Zone boundaries in theta (barrel) or r (endcap).
    pub input_ranges: Vec<String>,
    /// Cluster-size cut for each zone.
    pub cluster_size: Vec<String>,
    /// Layers exempt from filtering (hits on them are dropped).
    pub layers: Vec<String>,
    /// Name of the input hit collection.
    pub in_tracker_hit_collection: String,
    /// Name of the input relation collection.
    pub in_relation_collection: String,
    /// Name of the output hit collection.
    pub out_tracker_hit_collection: String,
    /// Name of the output relation collection.
    pub out_relation_collection: String,
    /// Cell-ID encoding used to decode the hit layer.
    pub cell_id_encoding: String,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            detector_type: String::new(),
            input_ranges: Vec::new(),
            cluster_size: Vec::new(),
            layers: Vec::new(),
            in_tracker_hit_collection: String::new(),
            in_relation_collection: String::new(),
            out_tracker_hit_collection: DEFAULT_OUT_TRACKER_HIT_COLLECTION.to_string(),
            out_relation_collection: DEFAULT_OUT_RELATION_COLLECTION.to_string(),
            cell_id_encoding: TRACKER_CELL_ID_ENCODING.to_string(),
        }
    }
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    values.into_iter().map(|v| v.to_string()).collect()
}

impl FilterParameters {
    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the detector type.
    #[must_use]
    pub fn with_detector_type(mut self, detector_type: impl Into<String>) -> Self {
        self.detector_type = detector_type.into();
        self
    }

    /// Sets the zone boundaries.
    #[must_use]
    pub fn with_input_ranges<I: IntoIterator<Item = S>, S: ToString>(mut self, ranges: I) -> Self {
        self.input_ranges = strings(ranges);
        self
    }

    /// Sets the per-zone cluster-size cuts.
    #[must_use]
    pub fn with_cluster_size<I: IntoIterator<Item = S>, S: ToString>(mut self, sizes: I) -> Self {
        self.cluster_size = strings(sizes);
        self
    }

    /// Sets the excluded layers.
    #[must_use]
    pub fn with_layers<I: IntoIterator<Item = S>, S: ToString>(mut self, layers: I) -> Self {
        self.layers = strings(layers);
        self
    }

    /// Sets the input collection names.
    #[must_use]
    pub fn with_inputs(mut self, hits: impl Into<String>, relations: impl Into<String>) -> Self {
        self.in_tracker_hit_collection = hits.into();
        self.in_relation_collection = relations.into();
        self
    }

    /// Sets the output collection names.
    #[must_use]
    pub fn with_outputs(mut self, hits: impl Into<String>, relations: impl Into<String>) -> Self {
        self.out_tracker_hit_collection = hits.into();
        self.out_relation_collection = relations.into();
        self
    }

    /// Sets the cell-ID encoding.
    #[must_use]
    pub fn with_cell_id_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.cell_id_encoding = encoding.into();
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<FilterConfig, ConfigError> {
        let boundaries = parse_numbers("InputRanges", &self.input_ranges)?;
        let thresholds = parse_numbers("ClusterSize", &self.cluster_size)?;
        let zones = ZoneConfig::new(boundaries, thresholds)?;
        let excluded_layers = LayerExclusionSet::parse(&self.layers)?;

        let in_hits = required("InTrackerHitCollection", &self.in_tracker_hit_collection)?;
        let in_relations = required("InRelationCollection", &self.in_relation_collection)?;
        let out_hits = required("OutTrackerHitCollection", &self.out_tracker_hit_collection)?;
        let out_relations = required("OutRelationCollection", &self.out_relation_collection)?;
        if out_hits == out_relations {
            return Err(ConfigError::DuplicateOutputName(out_hits));
        }
        for output in [&out_hits, &out_relations] {
            if *output == in_hits || *output == in_relations {
                return Err(ConfigError::DuplicateOutputName(output.clone()));
            }
        }

        let decoder = CellIdDecoder::new(&self.cell_id_encoding)?;
        let layer_field = decoder.field_index("layer")?;
        let system_field = decoder.field_index("system").ok();

        let detector_type = DetectorType::from_parameter(&self.detector_type);
        if detector_type == DetectorType::Endcap && self.detector_type != "Endcap" {
            warn!(
                "DetectorType '{}' is not \"Barrel\"; using endcap geometry",
                self.detector_type
            );
        }

        Ok(FilterConfig {
            detector_type,
            zones,
            excluded_layers,
            decoder,
            layer_field,
            system_field,
            in_hits,
            in_relations,
            out_hits,
            out_relations,
        })
    }
}

fn required(parameter: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::MissingParameter(parameter))
    } else {
        Ok(value.to_string())
    }
}

fn parse_number(parameter: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ConfigError::InvalidNumber {
            parameter,
            value: value.to_string(),
        }),
    }
}

fn parse_numbers(parameter: &'static str, values: &[String]) -> Result<Vec<f64>, ConfigError> {
    values.iter().map(|v| parse_number(parameter, v)).collect()
}

/// Detector geometry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DetectorType {
    /// Zones in polar angle, cut on the y extent.
    Barrel,
    /// Zones in radius, cut on the constituent count.
    Endcap,
}

impl DetectorType {
    /// Interprets the `DetectorType` steering value.
    #[must_use]
    pub fn from_parameter(value: &str) -> Self {
        if value == "Barrel" {
            Self::Barrel
        } else {
            Self::Endcap
        }
    }
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Barrel => f.write_str("Barrel"),
            Self::Endcap => f.write_str("Endcap"),
        }
    }
}

/// One zone `(min, max]` with its cluster-size cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    /// Position in configuration order.
    pub index: usize,
    /// Exclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Clusters must be strictly smaller than this to pass.
    pub threshold: f64,
}

impl Zone {
    /// True if `value` lies in `(min, max]`.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value > self.min && value <= self.max
    }

    /// True if a cluster of this size passes the cut.
    #[inline]
    #[must_use]
    pub fn accepts(&self, size: f64) -> bool {
        size < self.threshold
    }
}

/// Ordered zone boundaries and thresholds.
///
/// Zones are examined in configuration order. Boundaries are not required
/// to be sorted; an inverted pair simply forms a zone nothing falls into.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    boundaries: Vec<f64>,
    thresholds: Vec<f64>,
}

impl ZoneConfig {
    /// Builds a zone configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoZones`] if there are no thresholds, or
    /// [`ConfigError::ZoneCountMismatch`] unless there is exactly one more
    /// boundary than thresholds.
    pub fn new(boundaries: Vec<f64>, thresholds: Vec<f64>) -> Result<Self, ConfigError> {
        if thresholds.is_empty() && boundaries.len() < 2 {
            return Err(ConfigError::NoZones);
        }
        if boundaries.len() != thresholds.len() + 1 {
            return Err(ConfigError::ZoneCountMismatch {
                boundaries: boundaries.len(),
                thresholds: thresholds.len(),
                expected: thresholds.len() + 1,
            });
        }
        Ok(Self {
            boundaries,
            thresholds,
        })
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Always false for a validated configuration.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Zones in configuration order.
    pub fn zones(&self) -> impl Iterator<Item = Zone> + '_ {
        self.boundaries
            .windows(2)
            .zip(&self.thresholds)
            .enumerate()
            .map(|(index, (pair, &threshold))| Zone {
                index,
                min: pair[0],
                max: pair[1],
                threshold,
            })
    }

    /// First zone in configuration order containing `value`.
    #[must_use]
    pub fn find_first(&self, value: f64) -> Option<Zone> {
        self.zones().find(|zone| zone.contains(value))
    }
}

/// Layers whose hits are never accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerExclusionSet {
    layers: BTreeSet<u32>,
}

impl LayerExclusionSet {
    /// Builds the set from layer indices.
    pub fn new<I: IntoIterator<Item = u32>>(layers: I) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Parses textual layer indices. `"3"` and `"3.0"` both denote layer 3.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidLayer`] for entries that are not
    /// non-negative whole numbers.
    pub fn parse(values: &[String]) -> Result<Self, ConfigError> {
        let mut layers = BTreeSet::new();
        for value in values {
            let number = parse_number("Layers", value)
                .map_err(|_| ConfigError::InvalidLayer(value.clone()))?;
            if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
                return Err(ConfigError::InvalidLayer(value.clone()));
            }
            layers.insert(number as u32);
        }
        Ok(Self { layers })
    }

    /// True if `layer` is excluded.
    #[inline]
    #[must_use]
    pub fn contains(&self, layer: u32) -> bool {
        self.layers.contains(&layer)
    }

    /// Number of excluded layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if no layer is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Excluded layers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.layers.iter().copied()
    }
}

/// Validated, immutable filter configuration.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    detector_type: DetectorType,
    zones: ZoneConfig,
    excluded_layers: LayerExclusionSet,
    decoder: CellIdDecoder,
    layer_field: usize,
    system_field: Option<usize>,
    in_hits: String,
    in_relations: String,
    out_hits: String,
    out_relations: String,
}

impl FilterConfig {
    /// Geometry mode.
    #[must_use]
    pub fn detector_type(&self) -> DetectorType {
        self.detector_type
    }

    /// Zone configuration.
    #[must_use]
    pub fn zones(&self) -> &ZoneConfig {
        &self.zones
    }

    /// Excluded layers.
    #[must_use]
    pub fn excluded_layers(&self) -> &LayerExclusionSet {
        &self.excluded_layers
    }

    /// Cell-ID decoder.
    #[must_use]
    pub fn decoder(&self) -> &CellIdDecoder {
        &self.decoder
    }

    /// Layer index encoded in a cell ID.
    #[inline]
    #[must_use]
    pub fn layer_of(&self, cell_id: u64) -> i64 {
        self.decoder.get(cell_id, self.layer_field)
    }

    /// Subdetector index encoded in a cell ID, if the encoding has one.
    #[inline]
    #[must_use]
    pub fn system_of(&self, cell_id: u64) -> Option<i64> {
        self.system_field.map(|idx| self.decoder.get(cell_id, idx))
    }

    /// Input hit collection name.
    #[must_use]
    pub fn in_hits(&self) -> &str {
        &self.in_hits
    }

    /// Input relation collection name.
    #[must_use]
    pub fn in_relations(&self) -> &str {
        &self.in_relations
    }

    /// Output hit collection name.
    #[must_use]
    pub fn out_hits(&self) -> &str {
        &self.out_hits
    }

    /// Output relation collection name.
    #[must_use]
    pub fn out_relations(&self) -> &str {
        &self.out_relations
    }
}

impl fmt::Display for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.detector_type {
            DetectorType::Barrel => "theta",
            DetectorType::Endcap => "r",
        };
        writeln!(f, "DetectorType: {}", self.detector_type)?;
        for zone in self.zones.zones() {
            writeln!(
                f,
                "  zone {}: {} in ({}, {}], cluster size < {}",
                zone.index, axis, zone.min, zone.max, zone.threshold
            )?;
        }
        let layers: Vec<String> = self.excluded_layers.iter().map(|l| l.to_string()).collect();
        writeln!(f, "Layers: [{}]", layers.join(", "))?;
        writeln!(f, "CellIdEncoding: {}", self.decoder.encoding())?;
        writeln!(
            f,
            "Inputs: {} / {}",
            self.in_hits, self.in_relations
        )?;
        write!(f, "Outputs: {} / {}", self.out_hits, self.out_relations)
    }
}
