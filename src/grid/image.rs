//! Uniform image grids: implicit geometry from origin, spacing, and an
//! orientation quaternion.

use crate::grid::coords::float_eq;
use crate::grid::extent::Extent;
use serde::{Deserialize, Serialize};

/// Tolerance for unit-quaternion coincidence: `|dot(q1, q2) - 1|` within a
/// few ULP of 1. Axis-angle forms are never compared directly.
pub const QUATERNION_DOT_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// A uniform image grid block. Point coordinates are implicit:
/// `origin + rotate(direction, ijk * spacing)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageGrid {
    pub extent: Extent,
    pub origin: [f64; 3],
    pub spacing: [f64; 3],
    /// Unit quaternion `[w, x, y, z]` orienting the index axes in space.
    pub direction: [f64; 4],
}

impl ImageGrid {
    /// An axis-aligned image with identity orientation.
    pub fn axis_aligned(extent: Extent, origin: [f64; 3], spacing: [f64; 3]) -> Self {
        ImageGrid {
            extent,
            origin,
            spacing,
            direction: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Unit-quaternion equality through the dot product.
pub fn quaternions_coincide(a: &[f64; 4], b: &[f64; 4]) -> bool {
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    (dot - 1.0).abs() < QUATERNION_DOT_TOLERANCE
}

/// Spacing equality: `dot(a, b) == |a|^2` for matching vectors, under the
/// relative float comparator.
pub fn spacings_coincide(a: &[f64; 3], b: &[f64; 3]) -> bool {
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    let norm2 = a[0] * a[0] + a[1] * a[1] + a[2] * a[2];
    float_eq(dot, norm2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_quaternions_coincide() {
        let q = [1.0, 0.0, 0.0, 0.0];
        assert!(quaternions_coincide(&q, &q));
    }

    #[test]
    fn rotated_quaternion_differs() {
        let q = [1.0, 0.0, 0.0, 0.0];
        // 90 degrees about z
        let half = std::f64::consts::FRAC_PI_4;
        let r = [half.cos(), 0.0, 0.0, half.sin()];
        assert!(!quaternions_coincide(&q, &r));
    }

    #[test]
    fn spacing_comparison() {
        assert!(spacings_coincide(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]));
        assert!(!spacings_coincide(&[1.0, 1.0, 1.0], &[1.0, 1.0, 2.0]));
        let nudged = [1.0, 1.0, f64::from_bits(1.0f64.to_bits() + 1)];
        assert!(spacings_coincide(&[1.0, 1.0, 1.0], &nudged));
    }
}
