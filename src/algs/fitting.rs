//! One-dimensional coordinate-array fitting for rectilinear adjacency.
//!
//! Given the tick arrays of two blocks along one axis, decide whether one
//! is a contiguous sub-range of the other under the dual-mode tick
//! comparator, and report where the shared run sits in each array. Two
//! blocks are adjacent only if all three axes fit; a fit of zero width
//! (a single shared tick) carries face, edge, and corner contacts.

use crate::grid::coords::{CoordArray, TickValue};

/// Result of fitting one axis: the shared run's bounds in the remote
/// array (`min_id..=max_id`) and in the local array
/// (`local_min_id..=local_max_id`). `max_id < min_id` means no fit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AxisFit {
    pub min_id: i64,
    pub max_id: i64,
    pub local_min_id: i64,
    pub local_max_id: i64,
    pub overlaps: bool,
}

impl Default for AxisFit {
    fn default() -> Self {
        AxisFit {
            min_id: 0,
            max_id: -1,
            local_min_id: 0,
            local_max_id: -1,
            overlaps: false,
        }
    }
}

impl AxisFit {
    /// A zero-width run: the blocks share exactly one tick on this axis.
    pub fn is_degenerate(&self) -> bool {
        self.min_id == self.max_id
    }
}

/// Fit the local and remote tick arrays of one axis.
pub fn fit_axis(local: &CoordArray, remote: &CoordArray) -> AxisFit {
    match (local, remote) {
        (CoordArray::F64(l), CoordArray::F64(r)) => fit_axis_typed(l, r),
        (CoordArray::I64(l), CoordArray::I64(r)) => fit_axis_typed(l, r),
        // Mixed tick types never fit.
        _ => AxisFit::default(),
    }
}

fn fit_axis_typed<T: TickValue>(local: &[T], remote: &[T]) -> AxisFit {
    if local.is_empty() || remote.is_empty() {
        return AxisFit::default();
    }
    // Orient so `a` is the array that ends lower; the shared run must
    // consume `a` to its end.
    let local_ends_higher = local[local.len() - 1] > remote[remote.len() - 1];
    let (a, b) = if local_ends_higher {
        (remote, local)
    } else {
        (local, remote)
    };

    let fit = match fit_oriented(a, b) {
        Some(f) => f,
        None => return AxisFit::default(),
    };
    // Map the (a, b) runs back onto (remote, local): `a` is the remote
    // array exactly when the local one ends higher.
    let ((r0, r1), (l0, l1)) = if local_ends_higher {
        (fit.0, fit.1)
    } else {
        (fit.1, fit.0)
    };
    AxisFit {
        min_id: r0,
        max_id: r1,
        local_min_id: l0,
        local_max_id: l1,
        overlaps: true,
    }
}

/// Fit `a` (the array ending lower) against `b`. On success returns the
/// inclusive run bounds in `a` and in `b`.
fn fit_oriented<T: TickValue>(a: &[T], b: &[T]) -> Option<((i64, i64), (i64, i64))> {
    // The array that starts lower is scanned for the other's first tick.
    let scan_is_a = !(b[0] < a[0] && !b[0].tick_eq(a[0]));
    let (scan, other) = if scan_is_a { (a, b) } else { (b, a) };

    let mut id = 0usize;
    while id < scan.len() && scan[id] < other[0] && !scan[id].tick_eq(other[0]) {
        id += 1;
    }

    // Walk both until the scan array is consumed; any mismatch kills the
    // fit.
    let mut scan_id = id;
    let mut other_id = 0usize;
    while scan_id < scan.len() && other_id < other.len() && scan[scan_id].tick_eq(other[other_id]) {
        scan_id += 1;
        other_id += 1;
    }
    if scan_id != scan.len() {
        return None;
    }

    let scan_run = (id as i64, scan_id as i64 - 1);
    let other_run = (0, other_id as i64 - 1);
    if scan_is_a {
        Some((scan_run, other_run))
    } else {
        Some((other_run, scan_run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: &[f64]) -> CoordArray {
        CoordArray::F64(v.to_vec())
    }

    #[test]
    fn shared_endpoint_tick() {
        // Ticks [0,1,2,3] and [3,4,5]: blocks abut at tick 3.
        let fit = fit_axis(&f(&[0.0, 1.0, 2.0, 3.0]), &f(&[3.0, 4.0, 5.0]));
        assert!(fit.overlaps);
        assert!(fit.is_degenerate());
        assert_eq!((fit.local_min_id, fit.local_max_id), (3, 3));
        assert_eq!((fit.min_id, fit.max_id), (0, 0));
    }

    #[test]
    fn identical_arrays() {
        let fit = fit_axis(&f(&[0.0, 1.0, 2.0]), &f(&[0.0, 1.0, 2.0]));
        assert!(fit.overlaps);
        assert_eq!((fit.local_min_id, fit.local_max_id), (0, 2));
        assert_eq!((fit.min_id, fit.max_id), (0, 2));
    }

    #[test]
    fn suffix_prefix_overlap() {
        // Local [0..4], remote [2..6]: shared run [2,3,4].
        let fit = fit_axis(
            &f(&[0.0, 1.0, 2.0, 3.0, 4.0]),
            &f(&[2.0, 3.0, 4.0, 5.0, 6.0]),
        );
        assert!(fit.overlaps);
        assert_eq!((fit.local_min_id, fit.local_max_id), (2, 4));
        assert_eq!((fit.min_id, fit.max_id), (0, 2));
    }

    #[test]
    fn one_ulp_on_the_shared_tick() {
        let t = 3.0_f64;
        let t_up = f64::from_bits(t.to_bits() + 1);
        let fit = fit_axis(&f(&[0.0, 1.0, 2.0, t]), &f(&[t_up, 4.0, 5.0]));
        assert!(fit.overlaps);
        assert!(fit.is_degenerate());
    }

    #[test]
    fn mismatched_ticks_do_not_fit() {
        let fit = fit_axis(&f(&[0.0, 1.0, 2.0]), &f(&[0.5, 1.5, 2.5]));
        assert!(!fit.overlaps);
        assert_ne!(fit.min_id, fit.max_id);
    }

    #[test]
    fn equal_endpoints_different_density() {
        // Same first and last tick, different interior: conservative
        // rejection.
        let fit = fit_axis(&f(&[0.0, 1.0, 2.0, 4.0]), &f(&[0.0, 2.0, 4.0]));
        assert!(!fit.overlaps);
    }

    #[test]
    fn strict_interior_containment_is_rejected() {
        // Local sits wholly inside remote without sharing an end.
        let fit = fit_axis(&f(&[1.0, 2.0]), &f(&[0.0, 1.0, 2.0, 3.0]));
        assert!(!fit.overlaps);
    }

    #[test]
    fn integer_ticks() {
        let fit = fit_axis(
            &CoordArray::I64(vec![0, 1, 2]),
            &CoordArray::I64(vec![2, 3]),
        );
        assert!(fit.overlaps);
        assert!(fit.is_degenerate());
        assert_eq!(fit.local_min_id, 2);
    }

    #[test]
    fn single_tick_axes() {
        let fit = fit_axis(&f(&[0.0]), &f(&[0.0]));
        assert!(fit.overlaps);
        assert!(fit.is_degenerate());
    }
}
