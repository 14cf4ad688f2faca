//! trackfilter-core: Core types for tracker-hit cluster filtering.
//!
//! This crate provides the record model (tracker hits, their constituent
//! simulated hits, relations), the per-event collection container,
//! cell-ID decoding, geometric features and the filter configuration.
//!

pub mod cell_id;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit;
pub mod relation;

pub use cell_id::{CellIdDecoder, FieldDescriptor, TRACKER_CELL_ID_ENCODING};
pub use config::{
    DetectorType, FilterConfig, FilterParameters, LayerExclusionSet, Zone, ZoneConfig,
};
pub use error::{ConfigError, Error, EventError, FilterError, Result};
pub use event::{Collection, CollectionType, Event};
pub use geometry::{ClusterShape, HitGeometry};
pub use hit::{ObjectId, Position3, RawHit, SimTrackerHit, TrackerHit};
pub use relation::Relation;
