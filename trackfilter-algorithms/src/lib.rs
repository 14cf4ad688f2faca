//! trackfilter-algorithms: Cluster-shape filtering of tracker hits.
//!
//! - [`ClusterFilter`] decides, per hit, whether it survives the
//!   zone-dependent cluster-size cut.
//! - [`FilterClusters`] wraps the filter as an event processing stage that
//!   reads input collections and registers the filtered subsets.
//!
#![warn(missing_docs)]

mod filter;
mod processing;
mod statistics;

pub use filter::{ClusterFilter, Decision, DropReason, FilterOutput};
pub use processing::{EventProcessor, FilterClusters};
pub use statistics::FilterStatistics;

// Re-export core configuration types
pub use trackfilter_core::config::{DetectorType, FilterConfig, FilterParameters};
