//! Geometric features of a tracker hit.

use crate::hit::{Position3, SimTrackerHit};
use std::f64::consts::{FRAC_PI_2, PI};

/// Radial distance and incident angle of a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitGeometry {
    /// Distance from the beam axis.
    pub r: f64,
    /// Polar angle in `[0, π)`.
    pub theta: f64,
}

impl HitGeometry {
    /// Computes `r = sqrt(x² + y²)` and `theta = atan(r / z)` folded into `[0, π)`.
    ///
    /// A hit at `z == 0` sits in the transverse plane through the interaction
    /// point and gets `theta = π/2`, including the degenerate `r == 0` case.
    #[must_use]
    pub fn from_position(position: &Position3) -> Self {
        let r = position.radius();
        let theta = if position.z == 0.0 {
            FRAC_PI_2
        } else {
            let theta = (r / position.z).atan();
            if theta < 0.0 {
                theta + PI
            } else {
                theta
            }
        };
        Self { r, theta }
    }
}

/// Bounding-box extent of a cluster in pixel units.
///
/// Extents count pixels: a single-pixel cluster measures 1 along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusterShape {
    /// Extent along local x.
    pub size_x: f64,
    /// Extent along local y (parallel to the beam axis in the barrel).
    pub size_y: f64,
    /// Number of constituents.
    pub size_total: usize,
}

impl ClusterShape {
    /// Computes the shape from constituent local `(x, y)` positions.
    ///
    /// An empty cluster has all extents zero.
    pub fn from_local_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut count = 0usize;

        for (x, y) in positions {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
            count += 1;
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            size_x: (x_max - x_min) + 1.0,
            size_y: (y_max - y_min) + 1.0,
            size_total: count,
        }
    }

    /// Computes the shape from simulated constituent hits.
    pub fn from_sim_hits<'a, I>(hits: I) -> Self
    where
        I: IntoIterator<Item = &'a SimTrackerHit>,
    {
        Self::from_local_positions(hits.into_iter().map(|h| (h.local_x(), h.local_y())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_theta_forward_and_backward() {
        let forward = HitGeometry::from_position(&Position3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(forward.theta, PI / 4.0);
        assert_relative_eq!(forward.r, 1.0);

        let backward = HitGeometry::from_position(&Position3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(backward.theta, 3.0 * PI / 4.0);
    }

    #[test]
    fn test_theta_transverse_plane() {
        let g = HitGeometry::from_position(&Position3::new(0.0, 30.0, 0.0));
        assert_relative_eq!(g.theta, FRAC_PI_2);
        assert_relative_eq!(g.r, 30.0);

        let origin = HitGeometry::from_position(&Position3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(origin.theta, FRAC_PI_2);
        assert!(origin.theta.is_finite());
    }

    #[test]
    fn test_theta_on_axis() {
        let g = HitGeometry::from_position(&Position3::new(0.0, 0.0, 50.0));
        assert_relative_eq!(g.theta, 0.0);
    }

    #[test]
    fn test_single_pixel_cluster() {
        let shape = ClusterShape::from_local_positions([(4.0, 9.0)]);
        assert_relative_eq!(shape.size_x, 1.0);
        assert_relative_eq!(shape.size_y, 1.0);
        assert_eq!(shape.size_total, 1);
    }

    #[test]
    fn test_bounding_box() {
        let shape = ClusterShape::from_local_positions([(0.0, 2.0), (3.0, 5.0), (1.0, 4.0)]);
        assert_relative_eq!(shape.size_x, 4.0);
        assert_relative_eq!(shape.size_y, 4.0);
        assert_eq!(shape.size_total, 3);
    }

    #[test]
    fn test_empty_cluster() {
        let shape = ClusterShape::from_local_positions(std::iter::empty());
        assert_eq!(shape, ClusterShape::default());
    }
}
