//! Curvilinear structured grids: explicit point positions per index triple.
//!
//! The only adjacency signal between two curvilinear blocks is point
//! coincidence on their boundary faces, so each block also exposes its six
//! *outer point layers*: 2D patches of points forming the boundary faces,
//! extracted once per invocation and shipped inside the block descriptor.

use crate::grid::extent::{face_axes, Extent};
use serde::{Deserialize, Serialize};

/// A curvilinear structured grid block: one explicit point per index
/// triple of the extent, stored row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurvilinearGrid {
    pub extent: Extent,
    pub points: Vec<[f64; 3]>,
}

impl CurvilinearGrid {
    #[inline]
    pub fn point(&self, ijk: [i64; 3]) -> [f64; 3] {
        self.points[self.extent.point_id(ijk)]
    }
}

/// The points of one block face, indexed by a collapsed (degenerate on the
/// face-normal axis) extent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FacePatch {
    pub extent: Extent,
    pub points: Vec<[f64; 3]>,
}

impl FacePatch {
    #[inline]
    pub fn point(&self, ijk: [i64; 3]) -> [f64; 3] {
        self.points[self.extent.point_id(ijk)]
    }
}

/// Extract the outer point layer of face `side` from a grid, restricted to
/// `extent` (the true extent after peeling; `grid.extent` may be wider when
/// the input carried ghosts).
pub fn extract_outer_layer(grid: &CurvilinearGrid, extent: &Extent, side: usize) -> FacePatch {
    let face = extent.collapsed_at(side);
    let (xdim, ydim) = face_axes(side);

    let mut points = vec![[0.0f64; 3]; face.num_points()];
    let mut ijk = [0i64; 3];
    ijk[side / 2] = face[side];
    for y in face[ydim]..=face[ydim + 1] {
        ijk[ydim / 2] = y;
        for x in face[xdim]..=face[xdim + 1] {
            ijk[xdim / 2] = x;
            points[face.point_id(ijk)] = grid.point(ijk);
        }
    }
    FacePatch {
        extent: face,
        points,
    }
}

/// The six face extents of a block extent, each collapsed at its face.
pub fn face_extents(extent: &Extent) -> [Extent; 6] {
    [
        extent.collapsed_at(0),
        extent.collapsed_at(1),
        extent.collapsed_at(2),
        extent.collapsed_at(3),
        extent.collapsed_at(4),
        extent.collapsed_at(5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_grid(extent: Extent) -> CurvilinearGrid {
        let mut points = vec![[0.0; 3]; extent.num_points()];
        for id in 0..extent.num_points() {
            let ijk = extent.point_ijk(id);
            points[id] = [ijk[0] as f64, ijk[1] as f64, ijk[2] as f64];
        }
        CurvilinearGrid { extent, points }
    }

    #[test]
    fn outer_layer_shapes() {
        let e = Extent::new([0, 3, 0, 2, 0, 1]);
        let g = box_grid(e);
        let left = extract_outer_layer(&g, &e, 0);
        assert_eq!(left.extent, Extent::new([0, 0, 0, 2, 0, 1]));
        assert_eq!(left.points.len(), 6);
        for p in &left.points {
            assert_eq!(p[0], 0.0);
        }
        let top = extract_outer_layer(&g, &e, 5);
        assert_eq!(top.extent, Extent::new([0, 3, 0, 2, 1, 1]));
        for p in &top.points {
            assert_eq!(p[2], 1.0);
        }
    }

    #[test]
    fn outer_layer_respects_true_extent() {
        // Extract against a peeled extent narrower than the raw grid.
        let raw = Extent::new([0, 4, 0, 4, 0, 0]);
        let g = box_grid(raw);
        let peeled = Extent::new([1, 3, 1, 3, 0, 0]);
        let right = extract_outer_layer(&g, &peeled, 1);
        assert_eq!(right.extent, Extent::new([3, 3, 1, 3, 0, 0]));
        for p in &right.points {
            assert_eq!(p[0], 3.0);
        }
    }
}
