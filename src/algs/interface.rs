//! Interface index builder: the cell-id and point-id lists defining what a
//! block sends to a neighbor and where it places what arrives.

use crate::grid::extent::Extent;
use crate::grid::masks::AdjacencyMask;

/// Ids (relative to `grid_extent`) of the cells lying in the intersection
/// of `local_extent` and `other_extent`. Degenerate local axes contribute
/// their single cell layer.
pub fn interface_cell_ids(
    local_extent: &Extent,
    other_extent: &Extent,
    grid_extent: &Extent,
) -> Vec<usize> {
    let imin = other_extent[0].max(local_extent[0]);
    let imax = other_extent[1].min(local_extent[1]) + i64::from(local_extent[0] == local_extent[1]);
    let jmin = other_extent[2].max(local_extent[2]);
    let jmax = other_extent[3].min(local_extent[3]) + i64::from(local_extent[2] == local_extent[3]);
    let kmin = other_extent[4].max(local_extent[4]);
    let kmax = other_extent[5].min(local_extent[5]) + i64::from(local_extent[4] == local_extent[5]);

    let mut ids =
        Vec::with_capacity(((imax - imin).max(0) * (jmax - jmin).max(0) * (kmax - kmin).max(0)) as usize);
    for k in kmin..kmax {
        for j in jmin..jmax {
            for i in imin..imax {
                ids.push(grid_extent.cell_id([i, j, k]));
            }
        }
    }
    ids
}

/// Ids (relative to `grid_extent`) of the points lying in the intersection
/// of `local_extent` and `other_extent`, trimmed on the high side per the
/// adjacency mask: a point on a shared plane belongs to the block on the
/// higher-coordinate side, so a Right/Back/Top neighbor owns it and this
/// block drops the plane from its list.
pub fn interface_point_ids(
    adjacency: AdjacencyMask,
    local_extent: &Extent,
    other_extent: &Extent,
    grid_extent: &Extent,
) -> Vec<usize> {
    let imin = other_extent[0].max(local_extent[0]);
    let mut imax = other_extent[1].min(local_extent[1]);
    let jmin = other_extent[2].max(local_extent[2]);
    let mut jmax = other_extent[3].min(local_extent[3]);
    let kmin = other_extent[4].max(local_extent[4]);
    let mut kmax = other_extent[5].min(local_extent[5]);

    if adjacency.contains(AdjacencyMask::RIGHT) {
        imax -= 1;
    }
    if adjacency.contains(AdjacencyMask::BACK) {
        jmax -= 1;
    }
    if adjacency.contains(AdjacencyMask::TOP) {
        kmax -= 1;
    }

    let mut ids = Vec::new();
    for k in kmin..=kmax {
        for j in jmin..=jmax {
            for i in imin..=imax {
                ids.push(grid_extent.point_id([i, j, k]));
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_ids_of_one_layer() {
        // Local [0,4]^2 (2D), neighbor's grown extent reaching one cell in.
        let local = Extent::new([0, 4, 0, 4, 0, 0]);
        let other = Extent::new([4, 9, 0, 4, 0, 0]).widened(&[1, 0, 0, 0, 0, 0]);
        let ids = interface_cell_ids(&local, &other, &local);
        // One column of 4 cells at i = 3.
        assert_eq!(ids.len(), 4);
        for (row, id) in ids.iter().enumerate() {
            assert_eq!(*id, local.cell_id([3, row as i64, 0]));
        }
    }

    #[test]
    fn point_ids_trimmed_by_right_neighbor() {
        let local = Extent::new([0, 4, 0, 4, 0, 0]);
        let other = Extent::new([3, 9, 0, 4, 0, 0]);
        let mask = AdjacencyMask(AdjacencyMask::RIGHT);
        let ids = interface_point_ids(mask, &local, &other, &local);
        // i in [3, 3] after trimming the shared plane at i = 4.
        assert_eq!(ids.len(), 5);
        for (row, id) in ids.iter().enumerate() {
            assert_eq!(*id, local.point_id([3, row as i64, 0]));
        }
    }

    #[test]
    fn point_ids_untrimmed_for_left_neighbor() {
        let local = Extent::new([0, 4, 0, 4, 0, 0]);
        let other = Extent::new([-5, 1, 0, 4, 0, 0]);
        let mask = AdjacencyMask(AdjacencyMask::LEFT);
        let ids = interface_point_ids(mask, &local, &other, &local);
        // i in [0, 1], including the shared plane this block owns.
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn empty_intersection_yields_no_cells() {
        let local = Extent::new([0, 4, 0, 4, 0, 4]);
        let other = Extent::new([8, 10, 0, 4, 0, 4]);
        assert!(interface_cell_ids(&local, &other, &local).is_empty());
    }
}
