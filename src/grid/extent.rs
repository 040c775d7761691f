//! `Extent`: an inclusive integer point-index box in up to three dimensions.
//!
//! An extent is six integers `[ilo, ihi, jlo, jhi, klo, khi]`, inclusive on
//! both ends, describing the point lattice of a structured block. The cell
//! lattice spans `lo..hi-1` per axis. An axis with `lo == hi` is
//! *degenerate* (the data is 2D or 1D); degenerate axes never grow ghosts.
//!
//! Sides are addressed by a *side index* `0..6` (low/high i, low/high j,
//! low/high k), the convention used throughout the adjacency and interface
//! code: `axis = side / 2`, low side iff `side % 2 == 0`, and `side ^ 1` is
//! the opposite side of the same axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Inclusive point-index box `[ilo, ihi, jlo, jhi, klo, khi]`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent(pub [i64; 6]);

impl Extent {
    /// Construct from the six inclusive bounds.
    #[inline]
    pub const fn new(bounds: [i64; 6]) -> Self {
        Extent(bounds)
    }

    /// `lo <= hi` on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0[0] <= self.0[1] && self.0[2] <= self.0[3] && self.0[4] <= self.0[5]
    }

    /// True iff `lo == hi` on the given axis (0, 1, or 2).
    #[inline]
    pub fn is_degenerate(&self, axis: usize) -> bool {
        self.0[2 * axis] == self.0[2 * axis + 1]
    }

    /// Number of non-degenerate axes: 3 for a volume, 2 for a plane, …
    pub fn data_dimension(&self) -> usize {
        (0..3).filter(|&d| !self.is_degenerate(d)).count()
    }

    /// Low bound of the given axis.
    #[inline]
    pub fn lo(&self, axis: usize) -> i64 {
        self.0[2 * axis]
    }

    /// High bound of the given axis.
    #[inline]
    pub fn hi(&self, axis: usize) -> i64 {
        self.0[2 * axis + 1]
    }

    /// Point counts per axis.
    #[inline]
    pub fn point_dims(&self) -> [usize; 3] {
        [
            (self.0[1] - self.0[0] + 1) as usize,
            (self.0[3] - self.0[2] + 1) as usize,
            (self.0[5] - self.0[4] + 1) as usize,
        ]
    }

    /// Cell counts per axis. A degenerate axis contributes one cell layer so
    /// that 2D and 1D data keep a well-defined cell lattice.
    #[inline]
    pub fn cell_dims(&self) -> [usize; 3] {
        [
            ((self.0[1] - self.0[0]).max(1)) as usize,
            ((self.0[3] - self.0[2]).max(1)) as usize,
            ((self.0[5] - self.0[4]).max(1)) as usize,
        ]
    }

    /// Total point count.
    pub fn num_points(&self) -> usize {
        let d = self.point_dims();
        d[0] * d[1] * d[2]
    }

    /// Total cell count.
    pub fn num_cells(&self) -> usize {
        let d = self.cell_dims();
        d[0] * d[1] * d[2]
    }

    /// Row-major point id of `ijk` within this extent.
    #[inline]
    pub fn point_id(&self, ijk: [i64; 3]) -> usize {
        let d = self.point_dims();
        let i = (ijk[0] - self.0[0]) as usize;
        let j = (ijk[1] - self.0[2]) as usize;
        let k = (ijk[2] - self.0[4]) as usize;
        (k * d[1] + j) * d[0] + i
    }

    /// Row-major cell id of cell `ijk` within this extent.
    #[inline]
    pub fn cell_id(&self, ijk: [i64; 3]) -> usize {
        let d = self.cell_dims();
        let i = (ijk[0] - self.0[0]) as usize;
        let j = (ijk[1] - self.0[2]) as usize;
        let k = (ijk[2] - self.0[4]) as usize;
        (k * d[1] + j) * d[0] + i
    }

    /// Inverse of [`point_id`](Self::point_id).
    #[inline]
    pub fn point_ijk(&self, id: usize) -> [i64; 3] {
        let d = self.point_dims();
        let i = id % d[0];
        let j = (id / d[0]) % d[1];
        let k = id / (d[0] * d[1]);
        [
            self.0[0] + i as i64,
            self.0[2] + j as i64,
            self.0[4] + k as i64,
        ]
    }

    /// The extent grown by `thickness[side]` layers on each side.
    pub fn widened(&self, thickness: &[i64; 6]) -> Extent {
        Extent([
            self.0[0] - thickness[0],
            self.0[1] + thickness[1],
            self.0[2] - thickness[2],
            self.0[3] + thickness[3],
            self.0[4] - thickness[4],
            self.0[5] + thickness[5],
        ])
    }

    /// Collapse the extent onto the plane of face `side`: the opposite side
    /// of the same axis is pulled to the face value, leaving a degenerate
    /// axis. Face patches of curvilinear blocks use this form.
    pub fn collapsed_at(&self, side: usize) -> Extent {
        let mut e = *self;
        e.0[side ^ 1] = self.0[side];
        e
    }
}

impl Index<usize> for Extent {
    type Output = i64;
    #[inline]
    fn index(&self, side: usize) -> &i64 {
        &self.0[side]
    }
}

impl IndexMut<usize> for Extent {
    #[inline]
    fn index_mut(&mut self, side: usize) -> &mut i64 {
        &mut self.0[side]
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} {},{} {},{}]",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

/// In-plane side-index pair of a face: `face_axes(side)` returns the two
/// side-index bases (even values) spanning the face, in the cyclic order
/// used by the face-matching sweep.
#[inline]
pub fn face_axes(side: usize) -> (usize, usize) {
    let x = (side + 2) % 6 & !1;
    let y = (side + 4) % 6 & !1;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_and_counts() {
        let e = Extent::new([0, 4, 0, 2, 0, 0]);
        assert_eq!(e.point_dims(), [5, 3, 1]);
        assert_eq!(e.cell_dims(), [4, 2, 1]);
        assert_eq!(e.num_points(), 15);
        assert_eq!(e.num_cells(), 8);
        assert_eq!(e.data_dimension(), 2);
        assert!(e.is_degenerate(2));
    }

    #[test]
    fn ids_round_trip() {
        let e = Extent::new([-2, 3, 1, 4, 0, 2]);
        for id in 0..e.num_points() {
            assert_eq!(e.point_id(e.point_ijk(id)), id);
        }
        assert_eq!(e.point_id([-2, 1, 0]), 0);
        assert_eq!(e.cell_id([-2, 1, 0]), 0);
        assert_eq!(e.cell_id([-1, 1, 0]), 1);
    }

    #[test]
    fn degenerate_cell_ids() {
        // A flat 2D extent still addresses one layer of cells.
        let e = Extent::new([0, 3, 0, 3, 5, 5]);
        assert_eq!(e.num_cells(), 9);
        assert_eq!(e.cell_id([2, 2, 5]), 8);
    }

    #[test]
    fn widened_and_collapsed() {
        let e = Extent::new([0, 4, 0, 4, 0, 4]);
        let w = e.widened(&[1, 2, 0, 0, 3, 0]);
        assert_eq!(w, Extent::new([-1, 6, 0, 4, -3, 4]));
        let f = e.collapsed_at(1);
        assert_eq!(f, Extent::new([4, 4, 0, 4, 0, 4]));
        assert!(f.is_degenerate(0));
    }

    #[test]
    fn face_axis_cycle() {
        assert_eq!(face_axes(0), (2, 4));
        assert_eq!(face_axes(1), (2, 4));
        assert_eq!(face_axes(2), (4, 0));
        assert_eq!(face_axes(4), (0, 2));
    }

    #[test]
    fn validity() {
        assert!(Extent::new([0, 0, 0, 0, 0, 0]).is_valid());
        assert!(!Extent::new([1, 0, 0, 0, 0, 0]).is_valid());
    }
}
