//! Rectilinear grids: per-axis tick arrays, axis-aligned cells.

use crate::grid::coords::CoordArray;
use crate::grid::extent::Extent;
use serde::{Deserialize, Serialize};

/// A rectilinear grid block. Each axis carries one tick per point index, so
/// every coordinate array has exactly `hi - lo + 1` entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RectilinearGrid {
    pub extent: Extent,
    pub x: CoordArray,
    pub y: CoordArray,
    pub z: CoordArray,
}

impl RectilinearGrid {
    /// The coordinate array of the given axis.
    pub fn axis(&self, axis: usize) -> &CoordArray {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_lookup() {
        let g = RectilinearGrid {
            extent: Extent::new([0, 2, 0, 1, 0, 0]),
            x: CoordArray::F64(vec![0.0, 0.5, 1.0]),
            y: CoordArray::F64(vec![0.0, 1.0]),
            z: CoordArray::F64(vec![0.0]),
        };
        assert_eq!(g.axis(0).len(), 3);
        assert_eq!(g.axis(1).len(), 2);
        assert_eq!(g.axis(2).len(), 1);
    }
}
