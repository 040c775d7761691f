//! Hidden ghost fill: mark every allocated ghost cell and point HIDDEN
//! before the receive fill overwrites the ones that get a donor.
//!
//! Junctions can carry allocated ghosts with no grid to copy from, for
//! instance when adjacent faces differ in size; those keep the HIDDEN flag
//! so the extent stays rectangular without pretending the data is valid.

use crate::data::ghost_flags::{HIDDEN_CELL, HIDDEN_POINT};
use crate::grid::extent::Extent;

/// Mark the ghost slabs of one block: every cell and point of the output
/// extent outside the true extent becomes HIDDEN. Degenerate axes are
/// never filled.
pub fn fill_hidden_ghosts(
    output_extent: &Extent,
    true_extent: &Extent,
    ghost_cells: &mut [u8],
    ghost_points: &mut [u8],
) {
    let oe = output_extent;
    let te = true_extent;
    let degenerate = [oe[0] == oe[1], oe[2] == oe[3], oe[4] == oe[5]];

    let mut cells = |imin: i64, imax: i64, jmin: i64, jmax: i64, kmin: i64, kmax: i64| {
        for k in kmin..kmax {
            for j in jmin..jmax {
                for i in imin..imax {
                    ghost_cells[oe.cell_id([i, j, k])] |= HIDDEN_CELL;
                }
            }
        }
    };

    if !degenerate[0] {
        cells(
            oe[0],
            te[0],
            oe[2],
            oe[3] + i64::from(degenerate[1]),
            oe[4],
            oe[5] + i64::from(degenerate[2]),
        );
        cells(
            te[1],
            oe[1],
            oe[2],
            oe[3] + i64::from(degenerate[1]),
            oe[4],
            oe[5] + i64::from(degenerate[2]),
        );
    }
    if !degenerate[1] {
        cells(
            oe[0],
            oe[1] + i64::from(degenerate[0]),
            oe[2],
            te[2],
            oe[4],
            oe[5] + i64::from(degenerate[2]),
        );
        cells(
            oe[0],
            oe[1] + i64::from(degenerate[0]),
            te[3],
            oe[3],
            oe[4],
            oe[5] + i64::from(degenerate[2]),
        );
    }
    if !degenerate[2] {
        cells(
            oe[0],
            oe[1] + i64::from(degenerate[0]),
            oe[2],
            oe[3] + i64::from(degenerate[1]),
            oe[4],
            te[4],
        );
        cells(
            oe[0],
            oe[1] + i64::from(degenerate[0]),
            oe[2],
            oe[3] + i64::from(degenerate[1]),
            te[5],
            oe[5],
        );
    }

    let mut points = |imin: i64, imax: i64, jmin: i64, jmax: i64, kmin: i64, kmax: i64| {
        for k in kmin..=kmax {
            for j in jmin..=jmax {
                for i in imin..=imax {
                    ghost_points[oe.point_id([i, j, k])] |= HIDDEN_POINT;
                }
            }
        }
    };

    if !degenerate[0] {
        points(oe[0], te[0] - 1, oe[2], oe[3], oe[4], oe[5]);
        points(te[1] + 1, oe[1], oe[2], oe[3], oe[4], oe[5]);
    }
    if !degenerate[1] {
        points(oe[0], oe[1], oe[2], te[2] - 1, oe[4], oe[5]);
        points(oe[0], oe[1], te[3] + 1, oe[3], oe[4], oe[5]);
    }
    if !degenerate[2] {
        points(oe[0], oe[1], oe[2], oe[3], oe[4], te[4] - 1);
        points(oe[0], oe[1], oe[2], oe[3], te[5] + 1, oe[5]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ghost_column_2d() {
        let true_extent = Extent::new([0, 4, 0, 4, 0, 0]);
        let out = true_extent.widened(&[0, 1, 0, 0, 0, 0]);
        let mut cells = vec![0u8; out.num_cells()];
        let mut pts = vec![0u8; out.num_points()];
        fill_hidden_ghosts(&out, &true_extent, &mut cells, &mut pts);

        // The added cell column at i = 4 is hidden, the rest untouched.
        for j in 0..4 {
            assert_eq!(cells[out.cell_id([4, j, 0])], HIDDEN_CELL);
            assert_eq!(cells[out.cell_id([2, j, 0])], 0);
        }
        // Added points at i = 5.
        for j in 0..=4 {
            assert_eq!(pts[out.point_id([5, j, 0])], HIDDEN_POINT);
            assert_eq!(pts[out.point_id([4, j, 0])], 0);
        }
    }

    #[test]
    fn no_ghosts_no_flags() {
        let e = Extent::new([0, 3, 0, 3, 0, 3]);
        let mut cells = vec![0u8; e.num_cells()];
        let mut pts = vec![0u8; e.num_points()];
        fill_hidden_ghosts(&e, &e, &mut cells, &mut pts);
        assert!(cells.iter().all(|f| *f == 0));
        assert!(pts.iter().all(|f| *f == 0));
    }

    #[test]
    fn corner_regions_are_covered() {
        let true_extent = Extent::new([0, 2, 0, 2, 0, 2]);
        let out = true_extent.widened(&[1; 6]);
        let mut cells = vec![0u8; out.num_cells()];
        let mut pts = vec![0u8; out.num_points()];
        fill_hidden_ghosts(&out, &true_extent, &mut cells, &mut pts);

        // Corner ghost cell, covered by the slabs of several axes.
        assert_eq!(cells[out.cell_id([-1, -1, -1])], HIDDEN_CELL);
        assert_eq!(pts[out.point_id([3, 3, 3])], HIDDEN_POINT);
        // Interior stays clean.
        assert_eq!(cells[out.cell_id([1, 1, 1])], 0);
        let hidden_cells = cells.iter().filter(|f| **f != 0).count();
        assert_eq!(hidden_cells, out.num_cells() - true_extent.num_cells());
    }
}
