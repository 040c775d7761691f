//! # grid-ghosts
//!
//! grid-ghosts generates ghost cell layers for structured grid datasets
//! partitioned across peers in a bulk-synchronous compute job. Each peer
//! owns zero or more blocks of one grid flavor (uniform image grids,
//! rectilinear grids, or curvilinear structured grids); every block grows
//! outward by a requested number of ghost layers populated with data
//! copied from spatially adjacent neighbor blocks, local or remote.
//!
//! ## Features
//! - Geometric block adjacency detection for all three structured grid
//!   flavors, including curvilinear grids whose only adjacency signal is
//!   point coincidence on block faces
//! - One bounded all-to-all round of compact block descriptors, then
//!   point-to-point exchange of bulk field data along the detected links
//! - Pluggable communication backends (serial, threads, MPI) behind a
//!   small non-blocking [`Communicator`](exchange::Communicator) trait
//! - Ghost cell and ghost point flag arrays distinguishing mirrored
//!   (DUPLICATE) entities from allocated-but-donorless (HIDDEN) ones
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! grid-ghosts = "0.1"
//! # Optional features:
//! # features = ["mpi-support", "rayon"]
//! ```
//!
//! A single invocation of [`generate_ghosts`](generator::generate_ghosts)
//! runs the whole pipeline; nothing persists between invocations.

pub mod algs;
pub mod block;
pub mod data;
pub mod exchange;
pub mod generator;
pub mod ghost_error;
pub mod grid;

/// A convenient prelude importing the most-used types.
pub mod prelude {
    pub use crate::block::{Gid, GridBlock, OutputBlock, PeerAssignment};
    pub use crate::data::attributes::{AttributeArray, AttributeSet};
    pub use crate::data::ghost_flags::{
        DUPLICATE_CELL, DUPLICATE_POINT, HIDDEN_CELL, HIDDEN_POINT,
    };
    #[cfg(feature = "mpi-support")]
    pub use crate::exchange::communicator::MpiComm;
    pub use crate::exchange::communicator::{Communicator, NoComm, ThreadComm};
    pub use crate::generator::{generate_ghosts, GhostRequest};
    pub use crate::ghost_error::GhostError;
    pub use crate::grid::coords::CoordArray;
    pub use crate::grid::extent::Extent;
    pub use crate::grid::{CurvilinearGrid, ImageGrid, RectilinearGrid};
}
