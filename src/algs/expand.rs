//! Extent expander: materialize each output block at the widened extent
//! and clone the input data into it at its new offsets.

use crate::block::flavor::GridFlavor;
use crate::block::{Block, OutputBlock};
use crate::data::attributes::AttributeSet;
use crate::grid::extent::Extent;

/// Copy every cell tuple of `src` (laid out over `src_extent`) into `dst`
/// (laid out over `dst_extent`) at its re-indexed position. Only the
/// intersection of the two extents moves, so inputs wider than the output
/// (prior ghosts deeper than the requested level) stay in bounds.
pub fn clone_cell_tuples(
    src_extent: &Extent,
    dst_extent: &Extent,
    src: &AttributeSet,
    dst: &mut AttributeSet,
) {
    let imin = src_extent[0].max(dst_extent[0]);
    let imax = (src_extent[1].min(dst_extent[1])).max(imin + 1);
    let jmin = src_extent[2].max(dst_extent[2]);
    let jmax = (src_extent[3].min(dst_extent[3])).max(jmin + 1);
    let kmin = src_extent[4].max(dst_extent[4]);
    let kmax = (src_extent[5].min(dst_extent[5])).max(kmin + 1);

    for (a_src, a_dst) in src.arrays().iter().zip(dst.arrays_mut()) {
        for k in kmin..kmax {
            for j in jmin..jmax {
                for i in imin..imax {
                    let ijk = [i, j, k];
                    a_dst.copy_tuple(a_src, src_extent.cell_id(ijk), dst_extent.cell_id(ijk));
                }
            }
        }
    }
}

/// Point analog of [`clone_cell_tuples`].
pub fn clone_point_tuples(
    src_extent: &Extent,
    dst_extent: &Extent,
    src: &AttributeSet,
    dst: &mut AttributeSet,
) {
    let imin = src_extent[0].max(dst_extent[0]);
    let imax = src_extent[1].min(dst_extent[1]);
    let jmin = src_extent[2].max(dst_extent[2]);
    let jmax = src_extent[3].min(dst_extent[3]);
    let kmin = src_extent[4].max(dst_extent[4]);
    let kmax = src_extent[5].min(dst_extent[5]);

    for (a_src, a_dst) in src.arrays().iter().zip(dst.arrays_mut()) {
        for k in kmin..=kmax {
            for j in jmin..=jmax {
                for i in imin..=imax {
                    let ijk = [i, j, k];
                    a_dst.copy_tuple(a_src, src_extent.point_id(ijk), dst_extent.point_id(ijk));
                }
            }
        }
    }
}

/// Materialize the output block of `block`: widened extent,
/// flavor-specific coordinate arrays, attribute structure copied and
/// tuple-extended, ghost flag arrays zeroed.
pub fn build_output<G: GridFlavor>(block: &Block<G>) -> OutputBlock<G> {
    let output_extent = block.info.output_extent();
    let grid = block.input.grid.build_output_grid(&block.info, output_extent);

    let mut cell_data = block.input.cell_data.structure_with_tuples(output_extent.num_cells());
    let mut point_data = block
        .input
        .point_data
        .structure_with_tuples(output_extent.num_points());

    let input_extent = block.input.grid.extent();
    clone_cell_tuples(
        &input_extent,
        &output_extent,
        &block.input.cell_data,
        &mut cell_data,
    );
    clone_point_tuples(
        &input_extent,
        &output_extent,
        &block.input.point_data,
        &mut point_data,
    );

    OutputBlock {
        gid: block.input.gid,
        grid,
        cell_data,
        point_data,
        ghost_cells: vec![0; output_extent.num_cells()],
        ghost_points: vec![0; output_extent.num_points()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::attributes::AttributeArray;

    #[test]
    fn cell_tuples_land_at_new_offsets() {
        let src_extent = Extent::new([0, 2, 0, 2, 0, 0]);
        let dst_extent = src_extent.widened(&[1, 0, 0, 1, 0, 0]);
        let src = AttributeSet::new(vec![AttributeArray::new(
            "v",
            1,
            (0..src_extent.num_cells()).map(|x| x as f64).collect(),
        )]);
        let mut dst = src.structure_with_tuples(dst_extent.num_cells());
        clone_cell_tuples(&src_extent, &dst_extent, &src, &mut dst);

        for k in 0..1 {
            for j in 0..2 {
                for i in 0..2 {
                    let ijk = [i, j, k];
                    assert_eq!(
                        dst.arrays()[0].tuple(dst_extent.cell_id(ijk)),
                        src.arrays()[0].tuple(src_extent.cell_id(ijk)),
                    );
                }
            }
        }
    }

    #[test]
    fn clone_clips_to_destination() {
        // Input wider than output: only the intersection moves.
        let src_extent = Extent::new([0, 6, 0, 2, 0, 0]);
        let dst_extent = Extent::new([1, 5, 0, 2, 0, 0]);
        let src = AttributeSet::new(vec![AttributeArray::new(
            "p",
            1,
            (0..src_extent.num_points()).map(|x| x as f64).collect(),
        )]);
        let mut dst = src.structure_with_tuples(dst_extent.num_points());
        clone_point_tuples(&src_extent, &dst_extent, &src, &mut dst);
        assert_eq!(
            dst.arrays()[0].tuple(dst_extent.point_id([1, 0, 0])),
            src.arrays()[0].tuple(src_extent.point_id([1, 0, 0])),
        );
    }
}
