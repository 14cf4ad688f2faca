//! Tracker hit records and their constituents.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a record within an event.
pub type ObjectId = u64;

/// Global position in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (along the beam axis).
    pub z: f64,
}

impl Position3 {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the beam axis.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<[f64; 3]> for Position3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Position3> for [f64; 3] {
    fn from(p: Position3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// A simulated hit contributing to a reconstructed tracker hit.
///
/// For constituents of a digitised cluster, `position[0]` and `position[1]`
/// hold the local pixel coordinates on the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimTrackerHit {
    /// Record identifier.
    pub id: ObjectId,
    /// Encoded geometry identifier.
    pub cell_id: u64,
    /// Position (local coordinates for cluster constituents).
    pub position: [f64; 3],
}

impl SimTrackerHit {
    /// Creates a new simulated hit.
    #[must_use]
    pub fn new(id: ObjectId, cell_id: u64, position: [f64; 3]) -> Self {
        Self {
            id,
            cell_id,
            position,
        }
    }

    /// Local x coordinate.
    #[inline]
    #[must_use]
    pub fn local_x(&self) -> f64 {
        self.position[0]
    }

    /// Local y coordinate.
    #[inline]
    #[must_use]
    pub fn local_y(&self) -> f64 {
        self.position[1]
    }
}

/// Handle to a raw constituent of a tracker hit.
///
/// Constituents arrive untyped from upstream producers; only
/// [`RawHit::SimTrackerHit`] carries the local position the filter needs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RawHit {
    /// A simulated tracker hit with a local position.
    SimTrackerHit(SimTrackerHit),
    /// Any other record kind.
    Other {
        /// Record identifier.
        id: ObjectId,
        /// Name of the record kind as declared by the producer.
        type_name: String,
    },
}

impl RawHit {
    /// Returns the simulated hit, if this constituent is one.
    #[inline]
    #[must_use]
    pub fn as_sim_tracker_hit(&self) -> Option<&SimTrackerHit> {
        match self {
            Self::SimTrackerHit(hit) => Some(hit),
            Self::Other { .. } => None,
        }
    }

    /// Record kind name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::SimTrackerHit(_) => "SimTrackerHit",
            Self::Other { type_name, .. } => type_name,
        }
    }

    /// Record identifier.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::SimTrackerHit(hit) => hit.id,
            Self::Other { id, .. } => *id,
        }
    }
}

/// A reconstructed tracker hit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackerHit {
    /// Record identifier.
    pub id: ObjectId,
    /// Encoded geometry identifier (system, side, layer, module, sensor).
    pub cell_id: u64,
    /// Global position.
    pub position: Position3,
    /// Constituents the hit was built from.
    pub raw_hits: Vec<RawHit>,
}

impl TrackerHit {
    /// Creates a hit without constituents.
    #[must_use]
    pub fn new(id: ObjectId, cell_id: u64, position: Position3) -> Self {
        Self {
            id,
            cell_id,
            position,
            raw_hits: Vec::new(),
        }
    }

    /// Sets the constituents.
    #[must_use]
    pub fn with_raw_hits(mut self, raw_hits: Vec<RawHit>) -> Self {
        self.raw_hits = raw_hits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_radius() {
        let p = Position3::new(3.0, 4.0, 100.0);
        assert_relative_eq!(p.radius(), 5.0);
    }

    #[test]
    fn test_raw_hit_access() {
        let sim = RawHit::SimTrackerHit(SimTrackerHit::new(7, 0, [1.0, 2.0, 0.0]));
        assert_eq!(sim.as_sim_tracker_hit().map(SimTrackerHit::local_y), Some(2.0));
        assert_eq!(sim.type_name(), "SimTrackerHit");
        assert_eq!(sim.id(), 7);

        let other = RawHit::Other {
            id: 8,
            type_name: "CalorimeterHit".to_string(),
        };
        assert!(other.as_sim_tracker_hit().is_none());
        assert_eq!(other.type_name(), "CalorimeterHit");
        assert_eq!(other.id(), 8);
    }
}
