//! Descriptor exchange: one logical all-to-all round distributing a
//! compact descriptor of every block to every other block.
//!
//! A block never enqueues to itself. Blocks co-resident on a peer deliver
//! through a local queue; remote destinations go through the communicator
//! framed as `WireDescriptorHdr` records inside one blob per peer pair.

use crate::block::flavor::GridFlavor;
use crate::block::structure::BlockStructure;
use crate::block::{BlockStore, Gid, PeerAssignment};
use crate::exchange::communicator::{Communicator, GhostCommTags};
use crate::exchange::wire::{WireDescriptorHdr, WireReader, WireWriter};
use crate::exchange::exchange_peer_blobs;
use crate::ghost_error::GhostError;
use std::collections::HashMap;
use std::mem::size_of;

/// Distribute every local block's descriptor and install the received
/// descriptors into each block's `BlockStructures` map.
pub fn exchange_block_structures<G: GridFlavor, C: Communicator>(
    store: &mut BlockStore<G>,
    assignment: &PeerAssignment,
    comm: &C,
    tags: &GhostCommTags,
) -> Result<(), GhostError> {
    let me = comm.rank();

    let mut outgoing: HashMap<usize, Vec<u8>> = HashMap::new();
    let mut local_deliveries: Vec<(Gid, Gid, BlockStructure<G::StructureExt>)> = Vec::new();

    for local_id in 0..store.len() {
        let block = store.local_block(local_id);
        if !block.is_valid() {
            continue;
        }
        let src = block.input.gid;
        let structure = block.input.grid.local_structure(&block.info);
        let mut w = WireWriter::new();
        G::encode_structure(&structure, &mut w);
        let payload = w.into_bytes();

        for dst in assignment.all_gids() {
            if dst == src {
                continue;
            }
            let peer = assignment
                .peer_of(dst)
                .ok_or(GhostError::UnknownGid(dst.get()))?;
            if peer == me {
                local_deliveries.push((src, dst, structure.clone()));
            } else {
                let blob = outgoing.entry(peer).or_default();
                blob.extend_from_slice(bytemuck::bytes_of(&WireDescriptorHdr::new(
                    src.get(),
                    dst.get(),
                    payload.len(),
                )));
                blob.extend_from_slice(&payload);
            }
        }
    }

    let incoming = exchange_peer_blobs(comm, outgoing, tags.descriptor_sizes, tags.descriptor_data)?;

    for (src, dst, structure) in local_deliveries {
        install(store, src, dst, structure)?;
    }

    for (peer, blob) in incoming {
        let mut cursor = &blob[..];
        while !cursor.is_empty() {
            const HDR: usize = size_of::<WireDescriptorHdr>();
            if cursor.len() < HDR {
                return Err(GhostError::BufferSizeMismatch {
                    peer,
                    expected: HDR,
                    got: cursor.len(),
                });
            }
            let hdr: WireDescriptorHdr = bytemuck::pod_read_unaligned(&cursor[..HDR]);
            let (src, dst, len) = hdr.decode();
            if cursor.len() < HDR + len {
                return Err(GhostError::BufferSizeMismatch {
                    peer,
                    expected: HDR + len,
                    got: cursor.len(),
                });
            }
            let structure = G::decode_structure(&mut WireReader::new(&cursor[HDR..HDR + len]))?;
            cursor = &cursor[HDR + len..];
            install(store, Gid(src), Gid(dst), structure)?;
        }
    }

    Ok(())
}

fn install<G: GridFlavor>(
    store: &mut BlockStore<G>,
    src: Gid,
    dst: Gid,
    structure: BlockStructure<G::StructureExt>,
) -> Result<(), GhostError> {
    let local_id = store
        .local_id_of(dst)
        .ok_or(GhostError::UnknownGid(dst.get()))?;
    let block = store.local_block_mut(local_id);
    // An invalid local block holds no descriptors at all.
    if block.is_valid() {
        block.structures.insert(src, structure);
    }
    Ok(())
}
