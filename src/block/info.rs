//! Per-block information: the authoritative local view of a block's true
//! geometry, built by the ghost peeler and annotated by the adjacency
//! solver.

use crate::grid::coords::CoordArray;
use crate::grid::curvilinear::FacePatch;
use crate::grid::extent::Extent;

/// Local truth about one block, generic over the flavor extension.
#[derive(Clone, Debug)]
pub struct BlockInformation<X> {
    /// True extent after removing pre-existing ghost layers.
    pub true_extent: Extent,
    /// Accumulated ghost layers to add per side; starts at zero.
    pub ghost_thickness: [i64; 6],
    /// Flavor-specific extras.
    pub ext: X,
}

impl<X> BlockInformation<X> {
    pub fn new(true_extent: Extent, ext: X) -> Self {
        BlockInformation {
            true_extent,
            ghost_thickness: [0; 6],
            ext,
        }
    }

    /// The output extent: the true extent widened by the accumulated
    /// per-side thickness.
    pub fn output_extent(&self) -> Extent {
        self.true_extent.widened(&self.ghost_thickness)
    }

    /// Assert the structural invariants of a freshly peeled record against
    /// the raw input extent: the true extent is valid, sits inside the raw
    /// extent, keeps its degeneracy pattern, and carries no thickness yet.
    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    pub(crate) fn assert_peel_invariants(&self, raw: &Extent) {
        assert!(
            self.true_extent.is_valid(),
            "peeled extent {:?} is invalid",
            self.true_extent,
        );
        for axis in 0..3 {
            assert!(
                raw.lo(axis) <= self.true_extent.lo(axis)
                    && self.true_extent.hi(axis) <= raw.hi(axis),
                "peeled extent {:?} escapes the raw extent {:?}",
                self.true_extent,
                raw,
            );
            if raw.is_degenerate(axis) {
                assert!(
                    self.true_extent.is_degenerate(axis),
                    "peeling widened the degenerate axis {axis}",
                );
            }
        }
        assert_eq!(self.ghost_thickness, [0; 6], "thickness before linking");
    }
}

/// Image blocks need nothing beyond the true extent.
#[derive(Clone, Debug, Default)]
pub struct ImageInfo;

/// Rectilinear blocks keep their tick arrays trimmed to the true extent
/// plus the ghost segments accumulated per side during adjacency solving.
#[derive(Clone, Debug, Default)]
pub struct RectilinearInfo {
    pub x: CoordArray,
    pub y: CoordArray,
    pub z: CoordArray,
    /// Ghost tick segments per side. Low sides hold ascending ticks ending
    /// just before the block's first tick; high sides hold ticks starting
    /// just after the last.
    pub coordinate_ghosts: [Option<CoordArray>; 6],
}

impl RectilinearInfo {
    pub fn axis(&self, axis: usize) -> &CoordArray {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }
}

/// Curvilinear blocks keep their six outer point layers for the descriptor
/// exchange.
#[derive(Clone, Debug, Default)]
pub struct CurvilinearInfo {
    pub outer_layers: [FacePatch; 6],
}
