//! Event processing stage wrapping the cluster filter.

use crate::filter::{ClusterFilter, FilterOutput};
use crate::statistics::FilterStatistics;
use log::info;
use trackfilter_core::config::{FilterConfig, FilterParameters};
use trackfilter_core::error::{EventError, FilterError, Result};
use trackfilter_core::event::{Collection, CollectionType, Event};

/// A stage applied to every event of a run.
pub trait EventProcessor: Send + Sync {
    /// Per-event summary returned by the stage.
    type Output;

    /// Returns the name of the stage.
    fn name(&self) -> &'static str;

    /// Processes one event, adding any output collections to it.
    ///
    /// # Errors
    /// Returns an error if the event cannot be processed; the event's
    /// collections are left unchanged in that case.
    fn process_event(&self, event: &mut Event) -> Result<Self::Output>;
}

/// Filters a tracker-hit collection and its relations by cluster size.
///
/// Reads the configured input collections, keeps the hits accepted by
/// [`ClusterFilter`] and adds two subset collections (hits and relations)
/// under the configured output names.
#[derive(Debug, Clone)]
pub struct FilterClusters {
    filter: ClusterFilter,
}

impl FilterClusters {
    /// Expected type of the input hit collection.
    pub const HIT_COLLECTION_TYPE: CollectionType = CollectionType::TrackerHitPlane;
    /// Expected type of the input relation collection.
    pub const RELATION_COLLECTION_TYPE: CollectionType = CollectionType::Relation;

    /// Creates the stage from a validated configuration.
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        info!("FilterClusters parameters:\n{config}");
        Self {
            filter: ClusterFilter::new(config),
        }
    }

    /// Validates steering parameters and creates the stage.
    ///
    /// # Errors
    /// Returns a configuration error if the parameters are invalid.
    pub fn from_parameters(parameters: &FilterParameters) -> Result<Self> {
        Ok(Self::new(parameters.validate()?))
    }

    /// Set whether hits are classified in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.filter = self.filter.with_parallel(parallel);
        self
    }

    /// The underlying filter.
    #[must_use]
    pub fn filter(&self) -> &ClusterFilter {
        &self.filter
    }

    fn run_filter(&self, event: &Event) -> std::result::Result<FilterOutput, FilterError> {
        let config = self.filter.config();

        let hit_collection = event.collection(config.in_hits())?;
        let hits = match hit_collection.as_tracker_hits() {
            Some(hits) if hit_collection.collection_type() == Self::HIT_COLLECTION_TYPE => hits,
            _ => {
                return Err(FilterError::InputType {
                    collection: config.in_hits().to_string(),
                    expected: Self::HIT_COLLECTION_TYPE,
                    found: hit_collection.collection_type(),
                })
            }
        };

        let relation_collection = event.collection(config.in_relations())?;
        let relations = relation_collection
            .as_relations()
            .ok_or_else(|| FilterError::InputType {
                collection: config.in_relations().to_string(),
                expected: Self::RELATION_COLLECTION_TYPE,
                found: relation_collection.collection_type(),
            })?;

        self.filter.filter(hits, relations)
    }
}

impl EventProcessor for FilterClusters {
    type Output = FilterStatistics;

    fn name(&self) -> &'static str {
        "FilterClusters"
    }

    fn process_event(&self, event: &mut Event) -> Result<FilterStatistics> {
        let output = self.run_filter(event)?;
        let config = self.filter.config();

        // Check both names up front so a failure leaves the event untouched.
        for name in [config.out_hits(), config.out_relations()] {
            if event.collection(name).is_ok() {
                return Err(EventError::DuplicateCollection(name.to_string()).into());
            }
        }

        let statistics = output.statistics;
        event.add_collection(
            config.out_hits(),
            Collection::tracker_hit_planes(output.hits).into_subset(),
        )?;
        event.add_collection(
            config.out_relations(),
            Collection::relations(output.relations).into_subset(),
        )?;

        info!("run {} event {}: {}", event.run, event.number, statistics);
        Ok(statistics)
    }
}
