//! Remote block descriptors.
//!
//! A `BlockStructure` is what one block knows about a remote block after
//! the descriptor exchange: its true extent and dimension, plus the
//! flavor-specific geometry needed to decide adjacency. During adjacency
//! solving the local side annotates the descriptor with the adjacency mask
//! and with `extent_with_new_ghosts`, the remote extent grown by the ghost
//! layers this block will send it.

use crate::grid::coords::CoordArray;
use crate::grid::curvilinear::FacePatch;
use crate::grid::extent::Extent;
use crate::grid::masks::AdjacencyMask;
use serde::{Deserialize, Serialize};

/// Descriptor of a remote block, generic over the flavor extension.
#[derive(Clone, Debug)]
pub struct BlockStructure<X> {
    /// True (post-peel) extent, in the remote block's own frame.
    pub extent: Extent,
    /// Non-degenerate axis count of the remote data.
    pub data_dimension: usize,
    /// Faces of the *local* block this remote touches; filled by the
    /// adjacency solver.
    pub adjacency_mask: AdjacencyMask,
    /// Remote extent grown by the layers we will send it; filled by the
    /// adjacency solver.
    pub extent_with_new_ghosts: Extent,
    /// Flavor-specific payload.
    pub ext: X,
}

impl<X> BlockStructure<X> {
    pub fn new(extent: Extent, data_dimension: usize, ext: X) -> Self {
        BlockStructure {
            extent,
            data_dimension,
            adjacency_mask: AdjacencyMask::default(),
            extent_with_new_ghosts: extent,
            ext,
        }
    }
}

/// Image flavor: implicit geometry.
#[derive(Clone, Debug)]
pub struct ImageExt {
    pub origin: [f64; 3],
    pub spacing: [f64; 3],
    pub direction: [f64; 4],
}

/// Rectilinear flavor: the remote tick arrays.
#[derive(Clone, Debug)]
pub struct RectilinearExt {
    pub x: CoordArray,
    pub y: CoordArray,
    pub z: CoordArray,
}

impl RectilinearExt {
    pub fn axis(&self, axis: usize) -> &CoordArray {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

/// Curvilinear flavor: the six outer point layers, and once adjacency is
/// decided, the interface sub-grid.
#[derive(Clone, Debug)]
pub struct CurvilinearExt {
    pub faces: [FacePatch; 6],
    pub grid_interface: Option<Grid2D>,
}

/// A 2D sub-grid descriptor: where two curvilinear blocks meet, with
/// per-axis sweep orientations and the face it lies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid2D {
    pub start_x: i64,
    pub end_x: i64,
    pub start_y: i64,
    pub end_y: i64,
    /// +1 or -1: sweep direction along the face's first in-plane axis.
    pub x_orientation: i64,
    /// +1 or -1: sweep direction along the second in-plane axis.
    pub y_orientation: i64,
    /// Side index (0..6) of the face the sub-grid lies on.
    pub extent_id: usize,
}

impl Default for Grid2D {
    fn default() -> Self {
        Grid2D {
            start_x: 0,
            end_x: -1,
            start_y: 0,
            end_y: -1,
            x_orientation: 1,
            y_orientation: 1,
            extent_id: 0,
        }
    }
}

impl Grid2D {
    /// Width along the first in-plane axis, in points.
    pub fn span_x(&self) -> i64 {
        (self.end_x - self.start_x).abs()
    }

    /// Width along the second in-plane axis, in points.
    pub fn span_y(&self) -> i64 {
        (self.end_y - self.start_y).abs()
    }
}
