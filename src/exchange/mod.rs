//! Exchange phases: the communicator abstraction, wire types, and the two
//! collective rounds (descriptor all-to-all, field point-to-point).

pub mod communicator;
pub mod descriptors;
pub mod fields;
pub mod wire;

pub use communicator::{CommTag, Communicator, GhostCommTags, NoComm, ThreadComm, Wait};
#[cfg(feature = "mpi-support")]
pub use communicator::MpiComm;

use crate::ghost_error::GhostError;
use std::collections::HashMap;

/// Exchange one opaque blob with every other peer: a size round followed
/// by a data round, barrier-gated. Peers with nothing to say still take
/// part in the size round so nobody waits on a message that never comes.
pub(crate) fn exchange_peer_blobs<C: Communicator>(
    comm: &C,
    mut outgoing: HashMap<usize, Vec<u8>>,
    size_tag: CommTag,
    data_tag: CommTag,
) -> Result<HashMap<usize, Vec<u8>>, GhostError> {
    let me = comm.rank();
    let peers: Vec<usize> = (0..comm.size()).filter(|p| *p != me).collect();

    // Size round.
    let mut size_recvs = Vec::with_capacity(peers.len());
    for &peer in &peers {
        let mut buf = [0u8; 8];
        size_recvs.push((peer, comm.irecv(peer, size_tag.as_u16(), &mut buf)));
    }
    let mut pending = Vec::with_capacity(peers.len());
    for &peer in &peers {
        let len = outgoing.get(&peer).map_or(0, Vec::len) as u64;
        pending.push(comm.isend(peer, size_tag.as_u16(), &len.to_le_bytes()));
    }
    let mut incoming_sizes = HashMap::with_capacity(peers.len());
    for (peer, handle) in size_recvs {
        let raw = handle
            .wait()
            .ok_or_else(|| GhostError::comm(peer, "size round returned no data"))?;
        if raw.len() != 8 {
            return Err(GhostError::BufferSizeMismatch {
                peer,
                expected: 8,
                got: raw.len(),
            });
        }
        let len = u64::from_le_bytes(raw.try_into().expect("8 bytes")) as usize;
        incoming_sizes.insert(peer, len);
    }
    for handle in pending {
        let _ = handle.wait();
    }

    // Data round.
    let mut data_recvs = Vec::new();
    for &peer in &peers {
        let len = incoming_sizes[&peer];
        if len == 0 {
            continue;
        }
        let mut buf = vec![0u8; len];
        data_recvs.push((peer, len, comm.irecv(peer, data_tag.as_u16(), &mut buf)));
    }
    let mut pending = Vec::new();
    for &peer in &peers {
        if let Some(blob) = outgoing.remove(&peer) {
            if !blob.is_empty() {
                pending.push(comm.isend(peer, data_tag.as_u16(), &blob));
            }
        }
    }
    let mut incoming = HashMap::with_capacity(data_recvs.len());
    for (peer, len, handle) in data_recvs {
        let raw = handle
            .wait()
            .ok_or_else(|| GhostError::comm(peer, "data round returned no data"))?;
        if raw.len() != len {
            return Err(GhostError::BufferSizeMismatch {
                peer,
                expected: len,
                got: raw.len(),
            });
        }
        incoming.insert(peer, raw);
    }
    for handle in pending {
        let _ = handle.wait();
    }

    comm.barrier();
    Ok(incoming)
}
