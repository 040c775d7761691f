//! GhostError: unified error type for grid-ghosts public APIs.
//!
//! Geometric mismatches between blocks are *not* errors: a non-adjacent
//! neighbor is the common case and its descriptor is silently discarded.
//! Errors are reserved for malformed wire payloads, schema disagreements
//! between blocks that claim to be adjacent, and transport failures, all of
//! which leave the filter output undefined.

use thiserror::Error;

/// Unified error type for ghost-generation operations.
#[derive(Debug, Error)]
pub enum GhostError {
    /// A wire payload ended before the expected field could be read.
    #[error("truncated descriptor payload: needed {needed} more bytes, {remaining} left")]
    TruncatedPayload { needed: usize, remaining: usize },
    /// A wire payload carried an unknown coordinate-array tag.
    #[error("unknown coordinate array tag {0} on the wire")]
    UnknownCoordTag(u8),
    /// A received descriptor targeted a gid this peer does not own.
    #[error("received descriptor for unknown local gid {0}")]
    UnknownGid(u64),
    /// Communication with a peer failed.
    #[error("communication with peer {peer} failed: {source}")]
    Comm {
        peer: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A received buffer did not have the announced length.
    #[error("buffer size mismatch from peer {peer}: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        peer: usize,
        expected: usize,
        got: usize,
    },
    /// An interface payload disagreed with the locally computed index lists.
    #[error(
        "interface mismatch between blocks {local} and {remote}: expected {expected} {kind} tuples, got {got}"
    )]
    InterfaceMismatch {
        local: u64,
        remote: u64,
        kind: &'static str,
        expected: usize,
        got: usize,
    },
}

impl GhostError {
    /// Helper for transport backends reporting a failed wait.
    pub(crate) fn comm(peer: usize, msg: impl Into<String>) -> Self {
        GhostError::Comm {
            peer,
            source: msg.into().into(),
        }
    }
}
