//! Adjacency solver driver: per block, classify every remote descriptor
//! against the local extent, accumulate ghost thickness, and prune
//! non-neighbors.

use crate::block::flavor::GridFlavor;
use crate::block::info::BlockInformation;
use crate::block::structure::BlockStructure;
use crate::block::Block;
use crate::grid::extent::Extent;
use crate::grid::masks::{classify_contact, compute_masks, Contact};

/// Classify all remote descriptors of `block`. Descriptors that do
/// not describe a true neighbor are erased; the rest are annotated with
/// their adjacency mask and `extent_with_new_ghosts`, and their gids land
/// in `block.links`.
///
/// Each originally-present descriptor is visited exactly once; erasure
/// happens in place during the sweep.
pub fn link_block<G: GridFlavor>(block: &mut Block<G>, output_ghost_levels: i64) {
    let local_extent = block.info.true_extent;
    let dim = local_extent.data_dimension();
    let local_structure = G::local_structure(&block.input.grid, &block.info);

    let Block {
        input,
        info,
        structures,
        links,
    } = block;
    links.clear();

    structures.retain(|gid, structure| {
        // Re-express the remote extent in the local frame, or reject.
        let shifted = match G::shift_extent(&local_structure, structure) {
            Some(s) => s,
            None => return false,
        };
        structure.extent = shifted;
        structure.extent_with_new_ghosts = shifted;

        let (adjacency, overlap) = compute_masks(&local_extent, &shifted);
        structure.adjacency_mask = adjacency;

        match classify_contact(adjacency, overlap, dim) {
            Contact::Face(a) => {
                add_ghost_layer::<G>(a, output_ghost_levels, &local_extent, structure, info);
            }
            Contact::Edge(a, b) => {
                add_ghost_layer::<G>(a, output_ghost_levels, &local_extent, structure, info);
                add_ghost_layer::<G>(b, output_ghost_levels, &local_extent, structure, info);
            }
            Contact::Corner(a, b, c) => {
                add_ghost_layer::<G>(a, output_ghost_levels, &local_extent, structure, info);
                add_ghost_layer::<G>(b, output_ghost_levels, &local_extent, structure, info);
                add_ghost_layer::<G>(c, output_ghost_levels, &local_extent, structure, info);
            }
            Contact::None { mask_mismatch } => {
                if let Some(expected) = mask_mismatch {
                    log::warn!(
                        "block {}: adjacency mask {:?} from neighbor {} is inconsistent with \
                         {}-dimensional data ({} mask); discarding descriptor",
                        input.gid,
                        adjacency,
                        gid,
                        dim,
                        expected,
                    );
                }
                return false;
            }
        }

        links.push(*gid);
        true
    });
    links.sort_unstable();

    #[cfg(any(debug_assertions, feature = "check-invariants"))]
    assert_link_invariants::<G>(input.gid, info, structures, output_ghost_levels);
}

/// Post-linking invariants: no side grew past the request, degenerate
/// axes never grew, and every retained neighbor's
/// `extent_with_new_ghosts` still contains its shifted extent.
#[cfg(any(debug_assertions, feature = "check-invariants"))]
fn assert_link_invariants<G: GridFlavor>(
    gid: crate::block::Gid,
    info: &BlockInformation<G::InfoExt>,
    structures: &std::collections::HashMap<crate::block::Gid, BlockStructure<G::StructureExt>>,
    output_ghost_levels: i64,
) {
    for side in 0..6 {
        let thickness = info.ghost_thickness[side];
        assert!(
            (0..=output_ghost_levels).contains(&thickness),
            "block {gid}: side {side} thickness {thickness} exceeds the requested {output_ghost_levels}",
        );
        if info.true_extent.is_degenerate(side / 2) {
            assert_eq!(
                thickness,
                0,
                "block {gid}: degenerate axis {} grew ghosts",
                side / 2,
            );
        }
    }
    for (neighbor, structure) in structures {
        let grown = &structure.extent_with_new_ghosts;
        assert!(
            grown.is_valid(),
            "block {gid}: neighbor {neighbor} grew an invalid extent",
        );
        for axis in 0..3 {
            assert!(
                grown.lo(axis) <= structure.extent.lo(axis)
                    && structure.extent.hi(axis) <= grown.hi(axis),
                "block {gid}: neighbor {neighbor} extent escaped its grown extent",
            );
        }
    }
}

/// Grow one side of the output by up to `output_ghost_levels` layers,
/// bounded by what either block can supply on that axis, and grow the
/// neighbor's `extent_with_new_ghosts` on the opposite side by the same
/// amount: that records what we will send it.
fn add_ghost_layer<G: GridFlavor>(
    side: usize,
    output_ghost_levels: i64,
    local_extent: &Extent,
    structure: &mut BlockStructure<G::StructureExt>,
    info: &mut BlockInformation<G::InfoExt>,
) {
    let opposite = side ^ 1;
    let remote_span = (structure.extent[side] - structure.extent[opposite]).abs();
    let local_span = (local_extent[side] - local_extent[opposite]).abs();
    let thickness = output_ghost_levels.min(remote_span).min(local_span);

    info.ghost_thickness[side] = info.ghost_thickness[side].max(thickness);
    if side % 2 == 1 {
        structure.extent_with_new_ghosts[opposite] -= thickness;
    } else {
        structure.extent_with_new_ghosts[opposite] += thickness;
    }

    G::accumulate_ghost_coordinates(info, side, structure);
}
