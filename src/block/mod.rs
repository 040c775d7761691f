//! Block store: locally owned blocks and the remote descriptors received
//! for every block in the job.

pub mod flavor;
pub mod info;
pub mod structure;

use crate::data::attributes::AttributeSet;
use flavor::GridFlavor;
use info::BlockInformation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use structure::BlockStructure;

/// Global block id, unique across peers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gid(pub u64);

impl Gid {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Gid").field(&self.0).finish()
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One locally owned block as handed in by the host pipeline.
#[derive(Clone, Debug)]
pub struct GridBlock<G> {
    pub gid: Gid,
    pub grid: G,
    pub cell_data: AttributeSet,
    pub point_data: AttributeSet,
    /// Pre-existing ghost-cell marker array, one `u8` per cell of the raw
    /// extent; nonzero marks a ghost cell.
    pub ghost_cell_markers: Option<Vec<u8>>,
}

impl<G> GridBlock<G> {
    pub fn new(gid: Gid, grid: G) -> Self {
        GridBlock {
            gid,
            grid,
            cell_data: AttributeSet::default(),
            point_data: AttributeSet::default(),
            ghost_cell_markers: None,
        }
    }
}

/// One output block: same flavor as the input, extent widened by the
/// computed per-side thickness, attribute arrays tuple-extended, and ghost
/// flag arrays attached.
#[derive(Clone, Debug)]
pub struct OutputBlock<G> {
    pub gid: Gid,
    pub grid: G,
    pub cell_data: AttributeSet,
    pub point_data: AttributeSet,
    pub ghost_cells: Vec<u8>,
    pub ghost_points: Vec<u8>,
}

/// Working state of one local block across the pipeline phases.
pub struct Block<G: GridFlavor> {
    pub input: GridBlock<G>,
    pub info: BlockInformation<G::InfoExt>,
    /// Remote descriptors keyed by sender gid; pruned by the adjacency
    /// solver.
    pub structures: HashMap<Gid, BlockStructure<G::StructureExt>>,
    /// Gids retained as true neighbors after adjacency solving.
    pub links: Vec<Gid>,
}

impl<G: GridFlavor> Block<G> {
    /// An invalid input extent means "this peer holds no block with that
    /// gid": the block is skipped everywhere and passed through unchanged.
    pub fn is_valid(&self) -> bool {
        self.input.grid.extent().is_valid()
    }
}

/// Per-peer container of local blocks with O(1) access by local id and by
/// gid.
pub struct BlockStore<G: GridFlavor> {
    blocks: Vec<Block<G>>,
    index: HashMap<Gid, usize>,
}

impl<G: GridFlavor> BlockStore<G> {
    /// Ingest the host pipeline's input blocks, peeling each one's
    /// pre-existing ghost layers.
    pub fn from_inputs(inputs: Vec<GridBlock<G>>, input_ghost_levels: i64) -> Self {
        let mut blocks = Vec::with_capacity(inputs.len());
        let mut index = HashMap::with_capacity(inputs.len());
        for input in inputs {
            // An invalid extent means this peer holds no block with that
            // gid; give it a neutral information record and move on.
            let info = if input.grid.extent().is_valid() {
                let info = input
                    .grid
                    .build_information(input.ghost_cell_markers.as_deref(), input_ghost_levels);
                #[cfg(any(debug_assertions, feature = "check-invariants"))]
                info.assert_peel_invariants(&input.grid.extent());
                info
            } else {
                info::BlockInformation::new(input.grid.extent(), Default::default())
            };
            index.insert(input.gid, blocks.len());
            blocks.push(Block {
                input,
                info,
                structures: HashMap::new(),
                links: Vec::new(),
            });
        }
        BlockStore { blocks, index }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn local_block(&self, local_id: usize) -> &Block<G> {
        &self.blocks[local_id]
    }

    #[inline]
    pub fn local_block_mut(&mut self, local_id: usize) -> &mut Block<G> {
        &mut self.blocks[local_id]
    }

    #[inline]
    pub fn local_id_of(&self, gid: Gid) -> Option<usize> {
        self.index.get(&gid).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block<G>> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block<G>> {
        self.blocks.iter_mut()
    }
}

/// Explicit gid-to-peer assignment for the whole job.
#[derive(Clone, Debug, Default)]
pub struct PeerAssignment {
    peer_of: HashMap<Gid, usize>,
    by_peer: Vec<Vec<Gid>>,
}

impl PeerAssignment {
    pub fn new(num_peers: usize, pairs: impl IntoIterator<Item = (Gid, usize)>) -> Self {
        let mut peer_of = HashMap::new();
        let mut by_peer = vec![Vec::new(); num_peers];
        for (gid, peer) in pairs {
            peer_of.insert(gid, peer);
            by_peer[peer].push(gid);
        }
        for gids in &mut by_peer {
            gids.sort_unstable();
        }
        PeerAssignment { peer_of, by_peer }
    }

    /// All blocks on one peer, the serial case.
    pub fn single_peer(gids: impl IntoIterator<Item = Gid>) -> Self {
        Self::new(1, gids.into_iter().map(|g| (g, 0)))
    }

    #[inline]
    pub fn peer_of(&self, gid: Gid) -> Option<usize> {
        self.peer_of.get(&gid).copied()
    }

    pub fn num_peers(&self) -> usize {
        self.by_peer.len()
    }

    pub fn gids_of_peer(&self, peer: usize) -> &[Gid] {
        &self.by_peer[peer]
    }

    /// Every gid in the job, ascending per peer.
    pub fn all_gids(&self) -> impl Iterator<Item = Gid> + '_ {
        self.by_peer.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_lookup() {
        let a = PeerAssignment::new(2, [(Gid(3), 1), (Gid(1), 0), (Gid(2), 1)]);
        assert_eq!(a.peer_of(Gid(1)), Some(0));
        assert_eq!(a.peer_of(Gid(3)), Some(1));
        assert_eq!(a.peer_of(Gid(9)), None);
        assert_eq!(a.gids_of_peer(1), &[Gid(2), Gid(3)]);
        let all: Vec<_> = a.all_gids().collect();
        assert_eq!(all, vec![Gid(1), Gid(2), Gid(3)]);
    }

    #[test]
    fn gid_display_and_serde() {
        let g = Gid(42);
        assert_eq!(format!("{g}"), "42");
        assert_eq!(format!("{g:?}"), "Gid(42)");
        let s = serde_json::to_string(&g).unwrap();
        let back: Gid = serde_json::from_str(&s).unwrap();
        assert_eq!(back, g);
    }
}
