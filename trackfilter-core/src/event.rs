//! Per-event collection container.
//!
//! An [`Event`] holds named, typed collections of shared records. Subset
//! collections reference the same `Arc`s as the collection they were
//! selected from, so filtering never copies record payloads.

use crate::error::EventError;
use crate::hit::{SimTrackerHit, TrackerHit};
use crate::relation::Relation;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Declared element kind of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    /// Generic reconstructed tracker hits.
    TrackerHit,
    /// Reconstructed hits on planar sensors.
    TrackerHitPlane,
    /// Simulated tracker hits.
    SimTrackerHit,
    /// Relations between records.
    Relation,
}

impl CollectionType {
    /// Canonical type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrackerHit => "TrackerHit",
            Self::TrackerHitPlane => "TrackerHitPlane",
            Self::SimTrackerHit => "SimTrackerHit",
            Self::Relation => "LCRelation",
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Elements {
    TrackerHit(Vec<Arc<TrackerHit>>),
    TrackerHitPlane(Vec<Arc<TrackerHit>>),
    SimTrackerHit(Vec<Arc<SimTrackerHit>>),
    Relation(Vec<Arc<Relation>>),
}

/// A typed collection of shared records.
#[derive(Debug, Clone)]
pub struct Collection {
    elements: Elements,
    subset: bool,
}

impl Collection {
    /// Collection of generic tracker hits.
    #[must_use]
    pub fn tracker_hits(hits: Vec<Arc<TrackerHit>>) -> Self {
        Self::owning(Elements::TrackerHit(hits))
    }

    /// Collection of planar tracker hits.
    #[must_use]
    pub fn tracker_hit_planes(hits: Vec<Arc<TrackerHit>>) -> Self {
        Self::owning(Elements::TrackerHitPlane(hits))
    }

    /// Collection of simulated tracker hits.
    #[must_use]
    pub fn sim_tracker_hits(hits: Vec<Arc<SimTrackerHit>>) -> Self {
        Self::owning(Elements::SimTrackerHit(hits))
    }

    /// Collection of relations.
    #[must_use]
    pub fn relations(relations: Vec<Arc<Relation>>) -> Self {
        Self::owning(Elements::Relation(relations))
    }

    fn owning(elements: Elements) -> Self {
        Self {
            elements,
            subset: false,
        }
    }

    /// Marks the collection as a subset view of records owned elsewhere.
    #[must_use]
    pub fn into_subset(mut self) -> Self {
        self.subset = true;
        self
    }

    /// Declared element kind.
    #[must_use]
    pub fn collection_type(&self) -> CollectionType {
        match &self.elements {
            Elements::TrackerHit(_) => CollectionType::TrackerHit,
            Elements::TrackerHitPlane(_) => CollectionType::TrackerHitPlane,
            Elements::SimTrackerHit(_) => CollectionType::SimTrackerHit,
            Elements::Relation(_) => CollectionType::Relation,
        }
    }

    /// True if the collection references records owned by another collection.
    #[must_use]
    pub fn is_subset(&self) -> bool {
        self.subset
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.elements {
            Elements::TrackerHit(v) | Elements::TrackerHitPlane(v) => v.len(),
            Elements::SimTrackerHit(v) => v.len(),
            Elements::Relation(v) => v.len(),
        }
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracker hits, for either tracker-hit collection type.
    #[must_use]
    pub fn as_tracker_hits(&self) -> Option<&[Arc<TrackerHit>]> {
        match &self.elements {
            Elements::TrackerHit(v) | Elements::TrackerHitPlane(v) => Some(v),
            _ => None,
        }
    }

    /// Simulated tracker hits.
    #[must_use]
    pub fn as_sim_tracker_hits(&self) -> Option<&[Arc<SimTrackerHit>]> {
        match &self.elements {
            Elements::SimTrackerHit(v) => Some(v),
            _ => None,
        }
    }

    /// Relations.
    #[must_use]
    pub fn as_relations(&self) -> Option<&[Arc<Relation>]> {
        match &self.elements {
            Elements::Relation(v) => Some(v),
            _ => None,
        }
    }
}

/// One event: run and event number plus named collections.
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Run number.
    pub run: u32,
    /// Event number within the run.
    pub number: u32,
    collections: BTreeMap<String, Collection>,
}

impl Event {
    /// Creates an empty event.
    #[must_use]
    pub fn new(run: u32, number: u32) -> Self {
        Self {
            run,
            number,
            collections: BTreeMap::new(),
        }
    }

    /// Looks up a collection by name.
    ///
    /// # Errors
    /// Returns [`EventError::MissingCollection`] if no collection has this name.
    pub fn collection(&self, name: &str) -> Result<&Collection, EventError> {
        self.collections
            .get(name)
            .ok_or_else(|| EventError::MissingCollection(name.to_string()))
    }

    /// Adds a collection under a new name.
    ///
    /// # Errors
    /// Returns [`EventError::DuplicateCollection`] if the name is taken.
    pub fn add_collection(
        &mut self,
        name: impl Into<String>,
        collection: Collection,
    ) -> Result<(), EventError> {
        let name = name.into();
        if self.collections.contains_key(&name) {
            return Err(EventError::DuplicateCollection(name));
        }
        self.collections.insert(name, collection);
        Ok(())
    }

    /// Collection names in sorted order.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Iterates over `(name, collection)` pairs in name order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &Collection)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }
}
