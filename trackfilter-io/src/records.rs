//! Serialized form of events.
//!
//! ```json
//! {"run": 1, "event": 4, "collections": {
//!   "VBTrackerHits": {"type": "TrackerHitPlane", "elements": [
//!     {"id": 1, "cell_id": 133, "position": [30.1, 2.4, 12.0],
//!      "raw_hits": [{"type": "SimTrackerHit", "id": 10, "position": [4.0, 7.0, 0.0]}]}]},
//!   "VBTrackerHitsRelations": {"type": "LCRelation", "elements": [
//!     {"from": 1, "to": 10, "weight": 1.0}]}}}
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trackfilter_core::event::{Collection, CollectionType, Event};
use trackfilter_core::hit::{ObjectId, RawHit, SimTrackerHit, TrackerHit};
use trackfilter_core::relation::Relation;

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EventRecord {
    #[serde(default)]
    run: u32,
    #[serde(default)]
    event: u32,
    // Entries stay in file order so repeated names reach `Event::add_collection`.
    #[serde(default, with = "named_collections")]
    collections: Vec<(String, CollectionRecord)>,
}

mod named_collections {
    use super::CollectionRecord;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub(super) fn serialize<S: Serializer>(
        collections: &[(String, CollectionRecord)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(collections.len()))?;
        for (name, record) in collections {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, CollectionRecord)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of collection names to collections")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, CollectionRecord)>, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum CollectionRecord {
    TrackerHit {
        #[serde(default, skip_serializing_if = "is_false")]
        subset: bool,
        elements: Vec<TrackerHitRecord>,
    },
    TrackerHitPlane {
        #[serde(default, skip_serializing_if = "is_false")]
        subset: bool,
        elements: Vec<TrackerHitRecord>,
    },
    SimTrackerHit {
        #[serde(default, skip_serializing_if = "is_false")]
        subset: bool,
        elements: Vec<SimTrackerHit>,
    },
    #[serde(rename = "LCRelation")]
    Relation {
        #[serde(default, skip_serializing_if = "is_false")]
        subset: bool,
        elements: Vec<Relation>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackerHitRecord {
    id: ObjectId,
    #[serde(default)]
    cell_id: u64,
    position: [f64; 3],
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    raw_hits: Vec<RawHitRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawHitRecord {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cell_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<[f64; 3]>,
}

const SIM_TRACKER_HIT: &str = "SimTrackerHit";

impl RawHitRecord {
    fn into_raw_hit(self, owner: ObjectId) -> Result<RawHit> {
        if self.type_name != SIM_TRACKER_HIT {
            return Ok(RawHit::Other {
                id: self.id,
                type_name: self.type_name,
            });
        }
        let position = self.position.ok_or_else(|| {
            Error::InvalidFormat(format!(
                "hit {owner}: SimTrackerHit constituent {} has no position",
                self.id
            ))
        })?;
        Ok(RawHit::SimTrackerHit(SimTrackerHit::new(
            self.id,
            self.cell_id.unwrap_or_default(),
            position,
        )))
    }

    fn from_raw_hit(raw: &RawHit) -> Self {
        match raw {
            RawHit::SimTrackerHit(hit) => Self {
                type_name: SIM_TRACKER_HIT.to_string(),
                id: hit.id,
                cell_id: Some(hit.cell_id),
                position: Some(hit.position),
            },
            RawHit::Other { id, type_name } => Self {
                type_name: type_name.clone(),
                id: *id,
                cell_id: None,
                position: None,
            },
        }
    }
}

impl TrackerHitRecord {
    fn into_hit(self) -> Result<Arc<TrackerHit>> {
        let id = self.id;
        let raw_hits = self
            .raw_hits
            .into_iter()
            .map(|raw| raw.into_raw_hit(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Arc::new(
            TrackerHit::new(id, self.cell_id, self.position.into()).with_raw_hits(raw_hits),
        ))
    }

    fn from_hit(hit: &TrackerHit) -> Self {
        Self {
            id: hit.id,
            cell_id: hit.cell_id,
            position: hit.position.into(),
            raw_hits: hit.raw_hits.iter().map(RawHitRecord::from_raw_hit).collect(),
        }
    }
}

fn hits_from_records(records: Vec<TrackerHitRecord>) -> Result<Vec<Arc<TrackerHit>>> {
    records.into_iter().map(TrackerHitRecord::into_hit).collect()
}

fn hit_records(hits: &[Arc<TrackerHit>]) -> Vec<TrackerHitRecord> {
    hits.iter().map(|h| TrackerHitRecord::from_hit(h)).collect()
}

impl CollectionRecord {
    fn into_collection(self) -> Result<Collection> {
        let (collection, subset) = match self {
            Self::TrackerHit { subset, elements } => {
                (Collection::tracker_hits(hits_from_records(elements)?), subset)
            }
            Self::TrackerHitPlane { subset, elements } => (
                Collection::tracker_hit_planes(hits_from_records(elements)?),
                subset,
            ),
            Self::SimTrackerHit { subset, elements } => (
                Collection::sim_tracker_hits(elements.into_iter().map(Arc::new).collect()),
                subset,
            ),
            Self::Relation { subset, elements } => (
                Collection::relations(elements.into_iter().map(Arc::new).collect()),
                subset,
            ),
        };
        Ok(if subset {
            collection.into_subset()
        } else {
            collection
        })
    }

    fn from_collection(collection: &Collection) -> Result<Self> {
        let subset = collection.is_subset();
        let kind = collection.collection_type();
        let mismatch = || Error::InvalidFormat(format!("collection of type {kind} has no {kind} elements"));

        Ok(match kind {
            CollectionType::TrackerHit => Self::TrackerHit {
                subset,
                elements: hit_records(collection.as_tracker_hits().ok_or_else(mismatch)?),
            },
            CollectionType::TrackerHitPlane => Self::TrackerHitPlane {
                subset,
                elements: hit_records(collection.as_tracker_hits().ok_or_else(mismatch)?),
            },
            CollectionType::SimTrackerHit => Self::SimTrackerHit {
                subset,
                elements: collection
                    .as_sim_tracker_hits()
                    .ok_or_else(mismatch)?
                    .iter()
                    .map(|h| **h)
                    .collect(),
            },
            CollectionType::Relation => Self::Relation {
                subset,
                elements: collection
                    .as_relations()
                    .ok_or_else(mismatch)?
                    .iter()
                    .map(|r| **r)
                    .collect(),
            },
        })
    }
}

impl EventRecord {
    pub(crate) fn into_event(self) -> Result<Event> {
        let mut event = Event::new(self.run, self.event);
        for (name, record) in self.collections {
            event.add_collection(name, record.into_collection()?)?;
        }
        Ok(event)
    }

    pub(crate) fn from_event(event: &Event) -> Result<Self> {
        let collections = event
            .collections()
            .map(|(name, collection)| {
                Ok((name.to_string(), CollectionRecord::from_collection(collection)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            run: event.run,
            event: event.number,
            collections,
        })
    }
}
