//! Error types for trackfilter-core.

use crate::event::CollectionType;
use crate::hit::ObjectId;
use thiserror::Error;

/// Result type alias for trackfilter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for trackfilter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration was rejected before any event was processed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Event container misuse (missing or duplicate collection).
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Per-event filtering failure.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
}

/// Errors raised while validating steering parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Zone boundaries and thresholds do not describe the same zones.
    #[error("expected {expected} range boundaries for {thresholds} cluster size cuts, got {boundaries}")]
    ZoneCountMismatch {
        boundaries: usize,
        thresholds: usize,
        expected: usize,
    },

    /// No zone could be formed from the configured ranges.
    #[error("at least one zone is required (InputRanges needs two or more entries)")]
    NoZones,

    /// A numeric parameter entry did not parse.
    #[error("parameter {parameter}: '{value}' is not a number")]
    InvalidNumber {
        parameter: &'static str,
        value: String,
    },

    /// A layer entry is not a non-negative integral value.
    #[error("parameter Layers: '{0}' is not a layer index")]
    InvalidLayer(String),

    /// A required parameter was left empty.
    #[error("parameter {0} must be set")]
    MissingParameter(&'static str),

    /// An output collection name is used twice among the inputs and outputs.
    #[error("output collection name '{0}' is already in use")]
    DuplicateOutputName(String),

    /// Cell-ID encoding string could not be parsed.
    #[error("invalid cell ID encoding '{encoding}': {reason}")]
    InvalidEncoding { encoding: String, reason: String },

    /// Requested cell-ID field does not exist in the encoding.
    #[error("cell ID encoding has no field '{0}'")]
    UnknownField(String),
}

/// Errors raised by the event container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Requested collection is not present in the event.
    #[error("collection '{0}' not found in event")]
    MissingCollection(String),

    /// A collection with this name is already present.
    #[error("collection '{0}' already exists in event")]
    DuplicateCollection(String),
}

/// Errors that abort filtering of one event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Input collection holds records of the wrong kind.
    #[error("invalid collection type for '{collection}': expected {expected}, found {found}")]
    InputType {
        collection: String,
        expected: CollectionType,
        found: CollectionType,
    },

    /// A constituent of a hit is not a simulated tracker hit.
    #[error("hit {hit}: constituent {index} is a {found}, expected SimTrackerHit")]
    MalformedConstituent {
        hit: ObjectId,
        index: usize,
        found: String,
    },

    /// Relations are not positionally aligned with the hits.
    #[error("relation count {relations} does not match hit count {hits}")]
    RelationCountMismatch { hits: usize, relations: usize },

    /// Lookup of an input collection failed.
    #[error(transparent)]
    Event(#[from] EventError),
}
