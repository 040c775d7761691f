//! The bulk-synchronous ghost generation driver.
//!
//! One invocation runs the full pipeline over this peer's blocks: peel,
//! descriptor all-to-all, adjacency solving, extent expansion, hidden
//! fill, and the point-to-point field exchange. Nothing survives the
//! invocation; every run starts from scratch.

use crate::algs::adjacency::link_block;
use crate::algs::expand::build_output;
use crate::algs::hidden::fill_hidden_ghosts;
use crate::block::flavor::GridFlavor;
use crate::block::{BlockStore, GridBlock, OutputBlock, PeerAssignment};
use crate::exchange::communicator::{Communicator, GhostCommTags};
use crate::exchange::descriptors::exchange_block_structures;
use crate::exchange::fields::exchange_ghost_data;
use crate::ghost_error::GhostError;

/// Per-invocation request: how many ghost layers to produce, and how many
/// the inputs already carry.
#[derive(Copy, Clone, Debug)]
pub struct GhostRequest {
    /// Ghost layers each output block gains, bounded per side by what the
    /// neighbors can supply.
    pub output_ghost_levels: i64,
    /// Declared ghost level of the inputs; caps the peeling walk.
    pub input_ghost_levels: i64,
}

impl GhostRequest {
    pub fn levels(output_ghost_levels: i64) -> Self {
        GhostRequest {
            output_ghost_levels,
            input_ghost_levels: 0,
        }
    }
}

/// Generate ghost layers for this peer's blocks.
///
/// All peers of `assignment` must call this collectively with the same
/// request; the two exchange phases block until every peer arrives.
/// Outputs come back in input order, one per input block.
pub fn generate_ghosts<G: GridFlavor, C: Communicator>(
    inputs: Vec<GridBlock<G>>,
    assignment: &PeerAssignment,
    comm: &C,
    request: &GhostRequest,
) -> Result<Vec<OutputBlock<G>>, GhostError> {
    let tags = GhostCommTags::default();

    // Peel every input down to its true extent.
    let mut store = BlockStore::from_inputs(inputs, request.input_ghost_levels);

    // One all-to-all round of descriptors.
    exchange_block_structures(&mut store, assignment, comm, &tags)?;

    // Classify every descriptor, accumulate ghost thickness, prune
    // non-neighbors.
    for block in store.iter_mut() {
        if block.is_valid() {
            link_block(block, request.output_ghost_levels);
        } else {
            block.structures.clear();
        }
    }

    // Materialize the expanded outputs. An invalid block passes through
    // untouched, with no ghost arrays attached.
    let mut outputs: Vec<OutputBlock<G>> = store
        .iter()
        .map(|block| {
            if block.is_valid() {
                build_output(block)
            } else {
                OutputBlock {
                    gid: block.input.gid,
                    grid: block.input.grid.clone(),
                    cell_data: block.input.cell_data.clone(),
                    point_data: block.input.point_data.clone(),
                    ghost_cells: Vec::new(),
                    ghost_points: Vec::new(),
                }
            }
        })
        .collect();

    // Every allocated ghost starts out hidden; the receive fill
    // upgrades the ones with a donor.
    fill_all_hidden(&store, &mut outputs);

    // Route the interface tuples and fill the received ghosts.
    exchange_ghost_data(&store, &mut outputs, assignment, comm, &tags)?;

    Ok(outputs)
}

#[cfg(not(feature = "rayon"))]
fn fill_all_hidden<G: GridFlavor>(store: &BlockStore<G>, outputs: &mut [OutputBlock<G>]) {
    for (local_id, output) in outputs.iter_mut().enumerate() {
        let block = store.local_block(local_id);
        if !block.is_valid() {
            continue;
        }
        fill_hidden_ghosts(
            &output.grid.extent(),
            &block.info.true_extent,
            &mut output.ghost_cells,
            &mut output.ghost_points,
        );
    }
}

#[cfg(feature = "rayon")]
fn fill_all_hidden<G: GridFlavor>(store: &BlockStore<G>, outputs: &mut [OutputBlock<G>]) {
    use rayon::prelude::*;
    outputs
        .par_iter_mut()
        .enumerate()
        .for_each(|(local_id, output)| {
            let block = store.local_block(local_id);
            if !block.is_valid() {
                return;
            }
            fill_hidden_ghosts(
                &output.grid.extent(),
                &block.info.true_extent,
                &mut output.ghost_cells,
                &mut output.ghost_points,
            );
        });
}
