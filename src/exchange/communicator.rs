//! Communication abstraction over peers: serial, in-process threads, and
//! MPI.
//!
//! The pipeline needs only a small non-blocking surface: post sends and
//! receives, wait on handles, and a barrier gating the two collective
//! phases. Receivers may truncate to their provided buffer length, so
//! higher layers exchange sizes first whenever exact lengths matter.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

/// Non-blocking communication interface (minimal by design).
pub trait Communicator: Send + Sync {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// Rank of this peer (0..size-1).
    fn rank(&self) -> usize;
    /// Total number of peers.
    fn size(&self) -> usize;

    /// Synchronization barrier (no-op for serial backends).
    fn barrier(&self) {}
}

/// Tag newtype for safer tag arithmetic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CommTag(u16);

impl CommTag {
    #[inline]
    pub const fn new(tag: u16) -> Self {
        Self(tag)
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Offset the tag by `dx`, wrapping on overflow.
    #[inline]
    pub const fn offset(self, dx: u16) -> Self {
        Self(self.0.wrapping_add(dx))
    }
}

/// Tag bundle for the two exchange phases, each split into a size and a
/// data round with deterministic offsets.
#[derive(Copy, Clone, Debug)]
pub struct GhostCommTags {
    pub descriptor_sizes: CommTag,
    pub descriptor_data: CommTag,
    pub field_sizes: CommTag,
    pub field_data: CommTag,
}

impl GhostCommTags {
    pub const fn from_base(base: CommTag) -> Self {
        GhostCommTags {
            descriptor_sizes: base,
            descriptor_data: base.offset(1),
            field_sizes: base.offset(2),
            field_data: base.offset(3),
        }
    }
}

impl Default for GhostCommTags {
    fn default() -> Self {
        Self::from_base(CommTag::new(0x6500))
    }
}

/// Compile-time no-op comm for single-peer runs and serial unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }
}

// --- ThreadComm: in-process peers, one per thread -------------------------

type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Default)]
struct Mailbox {
    slots: Mutex<HashMap<Key, VecDeque<Vec<u8>>>>,
    delivered: Condvar,
}

struct Shared {
    mailbox: Mailbox,
    barrier: BarrierState,
}

struct BarrierState {
    inner: Mutex<(usize, usize)>, // (arrived, epoch)
    released: Condvar,
}

/// In-process communicator: `ThreadComm::channel(n)` yields one endpoint
/// per peer, all sharing a mailbox. No process-global state; every job
/// starts from scratch.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// Create `size` connected endpoints, one per peer.
    pub fn channel(size: usize) -> Vec<ThreadComm> {
        let shared = Arc::new(Shared {
            mailbox: Mailbox::default(),
            barrier: BarrierState {
                inner: Mutex::new((0, 0)),
                released: Condvar::new(),
            },
        });
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                shared: shared.clone(),
            })
            .collect()
    }
}

pub struct ThreadSendHandle;

impl Wait for ThreadSendHandle {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

pub struct ThreadRecvHandle {
    shared: Arc<Shared>,
    key: Key,
    want_len: usize,
}

impl Wait for ThreadRecvHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let mailbox = &self.shared.mailbox;
        let mut slots = mailbox.slots.lock().expect("mailbox poisoned");
        loop {
            if let Some(mut msg) = slots.get_mut(&self.key).and_then(VecDeque::pop_front) {
                msg.truncate(self.want_len.min(msg.len()));
                return Some(msg);
            }
            slots = mailbox.delivered.wait(slots).expect("mailbox poisoned");
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ThreadSendHandle;
    type RecvHandle = ThreadRecvHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> ThreadSendHandle {
        let mailbox = &self.shared.mailbox;
        {
            let mut slots = mailbox.slots.lock().expect("mailbox poisoned");
            slots
                .entry((self.rank, peer, tag))
                .or_default()
                .push_back(buf.to_vec());
        }
        mailbox.delivered.notify_all();
        ThreadSendHandle
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> ThreadRecvHandle {
        ThreadRecvHandle {
            shared: self.shared.clone(),
            key: (peer, self.rank, tag),
            want_len: buf.len(),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        let barrier = &self.shared.barrier;
        let mut state = barrier.inner.lock().expect("barrier poisoned");
        let epoch = state.1;
        state.0 += 1;
        if state.0 == self.size {
            state.0 = 0;
            state.1 += 1;
            barrier.released.notify_all();
        } else {
            while state.1 == epoch {
                state = barrier.released.wait(state).expect("barrier poisoned");
            }
        }
    }
}

// --- MPI backend ----------------------------------------------------------

#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{Communicator, Wait};
    use core::ptr::NonNull;
    use mpi::collective::CommunicatorCollectives;
    use mpi::environment::Universe;
    use mpi::point_to_point::{Destination, Source};
    use mpi::topology::{Communicator as _, SimpleCommunicator};

    /// MPI-backed communicator; one peer per MPI rank.
    pub struct MpiComm {
        _universe: Universe,
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    unsafe impl Send for MpiComm {}
    unsafe impl Sync for MpiComm {}

    impl Default for MpiComm {
        fn default() -> Self {
            let universe = mpi::initialize().expect("MPI initialization failed");
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            MpiComm {
                _universe: universe,
                world,
                rank,
                size,
            }
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiSendHandle;
        type RecvHandle = MpiRecvHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiSendHandle {
            use mpi::request::StaticScope;
            let raw: *mut [u8] = Box::into_raw(buf.to_vec().into_boxed_slice());
            let slice: &[u8] = unsafe { &*raw };
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_send_with_tag(StaticScope, slice, tag as i32);
            MpiSendHandle {
                req: Some(req),
                buf: Some(unsafe { NonNull::new_unchecked(raw) }),
            }
        }

        fn irecv(&self, peer: usize, tag: u16, template: &mut [u8]) -> MpiRecvHandle {
            use mpi::request::StaticScope;
            let len = template.len();
            let raw: *mut [u8] = Box::into_raw(vec![0u8; len].into_boxed_slice());
            let slice: &mut [u8] = unsafe { &mut *raw };
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, slice, tag as i32);
            MpiRecvHandle {
                req: Some(req),
                buf: Some(unsafe { NonNull::new_unchecked(raw) }),
                len,
            }
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn barrier(&self) {
            self.world.barrier();
        }
    }

    pub struct MpiSendHandle {
        req: Option<mpi::request::Request<'static, [u8], mpi::request::StaticScope>>,
        buf: Option<NonNull<[u8]>>,
    }

    impl Wait for MpiSendHandle {
        fn wait(mut self) -> Option<Vec<u8>> {
            if let Some(req) = self.req.take() {
                let _ = req.wait();
            }
            if let Some(ptr) = self.buf.take() {
                unsafe { drop(Box::from_raw(ptr.as_ptr())) };
            }
            None
        }
    }

    impl Drop for MpiSendHandle {
        fn drop(&mut self) {
            if let Some(req) = self.req.take() {
                let _ = req.test();
            }
            if let Some(ptr) = self.buf.take() {
                unsafe { drop(Box::from_raw(ptr.as_ptr())) };
            }
        }
    }

    pub struct MpiRecvHandle {
        req: Option<mpi::request::Request<'static, [u8], mpi::request::StaticScope>>,
        buf: Option<NonNull<[u8]>>,
        len: usize,
    }

    impl Wait for MpiRecvHandle {
        fn wait(mut self) -> Option<Vec<u8>> {
            if let Some(req) = self.req.take() {
                let _ = req.wait();
            }
            let ptr = self.buf.take()?;
            let boxed: Box<[u8]> = unsafe { Box::from_raw(ptr.as_ptr()) };
            let mut v = Vec::from(boxed);
            v.truncate(self.len);
            Some(v)
        }
    }

    impl Drop for MpiRecvHandle {
        fn drop(&mut self) {
            if let Some(req) = self.req.take() {
                let _ = req.test();
            }
            if let Some(ptr) = self.buf.take() {
                unsafe { drop(Box::from_raw(ptr.as_ptr())) };
            }
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
