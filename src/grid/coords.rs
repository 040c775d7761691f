//! Axis coordinate arrays and the dual-mode tick comparator.
//!
//! Rectilinear blocks describe each axis by a monotonically increasing
//! array of tick positions, either integer or floating point. Adjacency
//! detection compares ticks across blocks: integer ticks use exact
//! equality, floating-point ticks a relative epsilon scaled by the larger
//! operand magnitude, floored at the smallest positive normal so the
//! comparison stays sensible near zero.

use serde::{Deserialize, Serialize};

/// Tick value comparison for the coordinate-fitting code.
pub trait TickValue: Copy + PartialOrd {
    /// Type-appropriate equality: exact for integers, relative-epsilon for
    /// floating point.
    fn tick_eq(self, other: Self) -> bool;
}

impl TickValue for i64 {
    #[inline]
    fn tick_eq(self, other: Self) -> bool {
        self == other
    }
}

impl TickValue for f64 {
    #[inline]
    fn tick_eq(self, other: Self) -> bool {
        float_eq(self, other)
    }
}

/// Relative-epsilon float equality, scaled by the larger operand magnitude
/// with a floor at the smallest positive normal.
#[inline]
pub fn float_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < (f64::EPSILON * a.abs().max(b.abs())).max(f64::MIN_POSITIVE)
}

/// A per-axis coordinate array of one of the two supported tick types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CoordArray {
    F64(Vec<f64>),
    I64(Vec<i64>),
}

impl Default for CoordArray {
    fn default() -> Self {
        CoordArray::F64(Vec::new())
    }
}

impl CoordArray {
    pub fn len(&self) -> usize {
        match self {
            CoordArray::F64(v) => v.len(),
            CoordArray::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty array of the same tick type.
    pub fn new_like(&self) -> CoordArray {
        match self {
            CoordArray::F64(_) => CoordArray::F64(Vec::new()),
            CoordArray::I64(_) => CoordArray::I64(Vec::new()),
        }
    }

    /// The sub-range `[start, start + len)` as a new array.
    pub fn sliced(&self, start: usize, len: usize) -> CoordArray {
        match self {
            CoordArray::F64(v) => CoordArray::F64(v[start..start + len].to_vec()),
            CoordArray::I64(v) => CoordArray::I64(v[start..start + len].to_vec()),
        }
    }

    /// Append the sub-range `[start, start + len)` of `src` to `self`.
    /// Both arrays must have the same tick type.
    pub fn extend_from(&mut self, src: &CoordArray, start: usize, len: usize) {
        match (self, src) {
            (CoordArray::F64(dst), CoordArray::F64(s)) => dst.extend_from_slice(&s[start..start + len]),
            (CoordArray::I64(dst), CoordArray::I64(s)) => dst.extend_from_slice(&s[start..start + len]),
            _ => debug_assert!(false, "mixed tick types on one axis"),
        }
    }

    /// Prepend the sub-range `[start, start + len)` of `src` to `self`.
    pub fn prepend_from(&mut self, src: &CoordArray, start: usize, len: usize) {
        match (self, src) {
            (CoordArray::F64(dst), CoordArray::F64(s)) => {
                dst.splice(0..0, s[start..start + len].iter().copied());
            }
            (CoordArray::I64(dst), CoordArray::I64(s)) => {
                dst.splice(0..0, s[start..start + len].iter().copied());
            }
            _ => debug_assert!(false, "mixed tick types on one axis"),
        }
    }

    /// Concatenate `pre`, `self`, `post` into a single array.
    pub fn with_ghosts(&self, pre: Option<&CoordArray>, post: Option<&CoordArray>) -> CoordArray {
        let mut out = self.new_like();
        if let Some(p) = pre {
            out.extend_from(p, 0, p.len());
        }
        out.extend_from(self, 0, self.len());
        if let Some(p) = post {
            out.extend_from(p, 0, p.len());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_ulp_apart_is_equal() {
        let a = 3.0_f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert_ne!(a, b);
        assert!(float_eq(a, b));
    }

    #[test]
    fn distinct_ticks_stay_distinct() {
        assert!(!float_eq(1.0, 1.0 + 1e-9));
        assert!(!float_eq(0.0, 1e-300_f64.max(f64::MIN_POSITIVE) * 2.0));
    }

    #[test]
    fn near_zero_floor() {
        assert!(float_eq(0.0, f64::MIN_POSITIVE / 2.0));
        assert!(float_eq(-f64::MIN_POSITIVE / 4.0, f64::MIN_POSITIVE / 4.0));
    }

    #[test]
    fn integer_ticks_exact() {
        assert!(5_i64.tick_eq(5));
        assert!(!5_i64.tick_eq(6));
    }

    #[test]
    fn slicing_and_ghost_concat() {
        let base = CoordArray::F64(vec![0.0, 1.0, 2.0, 3.0]);
        let pre = CoordArray::F64(vec![-2.0, -1.0]);
        let post = CoordArray::F64(vec![4.0]);
        let full = base.with_ghosts(Some(&pre), Some(&post));
        assert_eq!(
            full,
            CoordArray::F64(vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0])
        );
        assert_eq!(base.sliced(1, 2), CoordArray::F64(vec![1.0, 2.0]));
    }

    proptest! {
        #[test]
        fn float_eq_is_reflexive_and_symmetric(a in -1e12f64..1e12, b in -1e12f64..1e12) {
            prop_assert!(float_eq(a, a));
            prop_assert_eq!(float_eq(a, b), float_eq(b, a));
        }

        #[test]
        fn neighbors_in_ulp_are_equal(a in -1e12f64..1e12) {
            let up = f64::from_bits(a.to_bits() + 1);
            if a > 0.0 {
                prop_assert!(float_eq(a, up));
            }
        }
    }
}
