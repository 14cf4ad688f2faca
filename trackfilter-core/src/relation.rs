//! Relation records linking reconstructed hits to truth information.

use crate::hit::ObjectId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Weighted link from one record to another.
///
/// The filter never inspects relations; it carries each one along with the
/// hit at the same position in the input.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Relation {
    /// Source record (usually the reconstructed hit).
    pub from: ObjectId,
    /// Target record (usually the simulated hit).
    pub to: ObjectId,
    /// Relation weight.
    pub weight: f32,
}

impl Relation {
    /// Creates a relation with unit weight.
    #[must_use]
    pub fn new(from: ObjectId, to: ObjectId) -> Self {
        Self::with_weight(from, to, 1.0)
    }

    /// Creates a weighted relation.
    #[must_use]
    pub fn with_weight(from: ObjectId, to: ObjectId, weight: f32) -> Self {
        Self { from, to, weight }
    }
}
