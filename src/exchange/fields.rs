//! Field exchange: point-to-point transfer of attribute tuples
//! (and curvilinear point coordinates) over the interface index lists,
//! followed by the receive fill that flips ghost flags to DUPLICATE.

use crate::algs::interface::{interface_cell_ids, interface_point_ids};
use crate::block::flavor::GridFlavor;
use crate::block::{Block, BlockStore, Gid, OutputBlock, PeerAssignment};
use crate::data::ghost_flags::{DUPLICATE_CELL, DUPLICATE_POINT};
use crate::exchange::communicator::{Communicator, GhostCommTags};
use crate::exchange::exchange_peer_blobs;
use crate::exchange::wire::WireLinkHdr;
use crate::ghost_error::GhostError;
use std::collections::HashMap;
use std::mem::size_of;

/// Run the point-to-point field exchange along the link map and fill the
/// received ghosts of every output block.
pub fn exchange_ghost_data<G: GridFlavor, C: Communicator>(
    store: &BlockStore<G>,
    outputs: &mut [OutputBlock<G>],
    assignment: &PeerAssignment,
    comm: &C,
    tags: &GhostCommTags,
) -> Result<(), GhostError> {
    let me = comm.rank();

    let mut outgoing: HashMap<usize, Vec<u8>> = HashMap::new();
    let mut local_payloads: Vec<(Gid, Gid, Vec<f64>)> = Vec::new();

    for local_id in 0..store.len() {
        let block = store.local_block(local_id);
        if !block.is_valid() {
            continue;
        }
        for &neighbor in &block.links {
            let payload = pack_link(block, neighbor);
            let peer = assignment
                .peer_of(neighbor)
                .ok_or(GhostError::UnknownGid(neighbor.get()))?;
            if peer == me {
                local_payloads.push((block.input.gid, neighbor, payload));
            } else {
                let blob = outgoing.entry(peer).or_default();
                blob.extend_from_slice(bytemuck::bytes_of(&WireLinkHdr::new(
                    block.input.gid.get(),
                    neighbor.get(),
                    payload.len() * size_of::<f64>(),
                )));
                for v in &payload {
                    blob.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
    }

    let incoming = exchange_peer_blobs(comm, outgoing, tags.field_sizes, tags.field_data)?;

    for (src, dst, payload) in local_payloads {
        let local_id = store
            .local_id_of(dst)
            .ok_or(GhostError::UnknownGid(dst.get()))?;
        unpack_link(
            store.local_block(local_id),
            &mut outputs[local_id],
            src,
            &payload,
        )?;
    }

    for (peer, blob) in incoming {
        let mut cursor = &blob[..];
        while !cursor.is_empty() {
            const HDR: usize = size_of::<WireLinkHdr>();
            if cursor.len() < HDR {
                return Err(GhostError::BufferSizeMismatch {
                    peer,
                    expected: HDR,
                    got: cursor.len(),
                });
            }
            let hdr: WireLinkHdr = bytemuck::pod_read_unaligned(&cursor[..HDR]);
            let (src, dst, len) = hdr.decode();
            if cursor.len() < HDR + len || len % size_of::<f64>() != 0 {
                return Err(GhostError::BufferSizeMismatch {
                    peer,
                    expected: HDR + len,
                    got: cursor.len(),
                });
            }
            let payload: Vec<f64> = cursor[HDR..HDR + len]
                .chunks_exact(size_of::<f64>())
                .map(|c| f64::from_le_bytes(c.try_into().expect("8 bytes")))
                .collect();
            cursor = &cursor[HDR + len..];

            let local_id = store
                .local_id_of(Gid(dst))
                .ok_or(GhostError::UnknownGid(dst))?;
            unpack_link(
                store.local_block(local_id),
                &mut outputs[local_id],
                Gid(src),
                &payload,
            )?;
        }
    }

    Ok(())
}

/// Pack what this block sends one neighbor: the cell tuples over
/// `L ∩ R.extent_with_new_ghosts`, the point tuples over the same region
/// trimmed by the ownership rule, and the point coordinates for flavors
/// that carry them.
fn pack_link<G: GridFlavor>(block: &Block<G>, neighbor: Gid) -> Vec<f64> {
    let structure = &block.structures[&neighbor];
    let input_extent = block.input.grid.extent();
    let cell_ids = interface_cell_ids(
        &block.info.true_extent,
        &structure.extent_with_new_ghosts,
        &input_extent,
    );
    let point_ids = interface_point_ids(
        structure.adjacency_mask,
        &block.info.true_extent,
        &structure.extent_with_new_ghosts,
        &input_extent,
    );

    let mut payload = Vec::with_capacity(
        cell_ids.len() * block.input.cell_data.tuple_width()
            + point_ids.len() * (block.input.point_data.tuple_width() + G::point_components()),
    );
    block.input.cell_data.pack(&cell_ids, &mut payload);
    block.input.point_data.pack(&point_ids, &mut payload);
    block.input.grid.pack_points(&point_ids, &mut payload);
    payload
}

/// Scatter a neighbor's payload into the output block and flip the
/// receiving ghosts to DUPLICATE.
fn unpack_link<G: GridFlavor>(
    block: &Block<G>,
    output: &mut OutputBlock<G>,
    neighbor: Gid,
    payload: &[f64],
) -> Result<(), GhostError> {
    let local = block.input.gid.get();
    let structure = match block.structures.get(&neighbor) {
        Some(s) => s,
        None => {
            // The sender saw an adjacency this side rejected; nothing was
            // allocated for it here.
            log::trace!(
                "block {}: dropping interface payload from non-neighbor {}",
                local,
                neighbor
            );
            return Ok(());
        }
    };

    let output_extent = output.grid.extent();
    let cell_ids = interface_cell_ids(&output_extent, &structure.extent, &output_extent);
    let point_ids = interface_point_ids(
        structure.adjacency_mask.shifted(),
        &output_extent,
        &structure.extent,
        &output_extent,
    );

    let n_cell = cell_ids.len() * output.cell_data.tuple_width();
    let n_point = point_ids.len() * output.point_data.tuple_width();
    let n_coord = point_ids.len() * G::point_components();
    if payload.len() != n_cell + n_point + n_coord {
        return Err(GhostError::InterfaceMismatch {
            local,
            remote: neighbor.get(),
            kind: "interface",
            expected: n_cell + n_point + n_coord,
            got: payload.len(),
        });
    }

    output
        .cell_data
        .unpack(&cell_ids, &payload[..n_cell], local, neighbor.get())?;
    output.point_data.unpack(
        &point_ids,
        &payload[n_cell..n_cell + n_point],
        local,
        neighbor.get(),
    )?;
    G::unpack_points(
        &mut output.grid,
        &point_ids,
        &payload[n_cell + n_point..],
        local,
        neighbor.get(),
    )?;

    for &id in &cell_ids {
        output.ghost_cells[id] = DUPLICATE_CELL;
    }
    for &id in &point_ids {
        output.ghost_points[id] = DUPLICATE_POINT;
    }
    Ok(())
}
