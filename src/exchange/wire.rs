//! Fixed, little-endian wire encoding for the exchange phases.
//!
//! Buffers carry only their length; no schema metadata travels on the
//! wire. All multi-byte integers are little-endian fixed width (`u32`
//! counts, `u64` gids and lengths, IEEE-754 `f64` bit patterns). Framing
//! structs are `#[repr(C)]` and `bytemuck::Pod`-safe with explicit
//! padding.

use crate::ghost_error::GhostError;
use crate::grid::coords::CoordArray;
use crate::grid::extent::Extent;
use bytemuck::{Pod, Zeroable};
use std::mem::size_of;

pub use bytemuck::{cast_slice, cast_slice_mut};

/// Frames one block descriptor inside a peer-to-peer blob.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireDescriptorHdr {
    pub src_gid_le: u64,
    pub dst_gid_le: u64,
    pub len_le: u32,
    pub _pad: u32,
}

impl WireDescriptorHdr {
    pub fn new(src: u64, dst: u64, len: usize) -> Self {
        WireDescriptorHdr {
            src_gid_le: src.to_le(),
            dst_gid_le: dst.to_le(),
            len_le: (len as u32).to_le(),
            _pad: 0,
        }
    }

    pub fn decode(&self) -> (u64, u64, usize) {
        (
            u64::from_le(self.src_gid_le),
            u64::from_le(self.dst_gid_le),
            u32::from_le(self.len_le) as usize,
        )
    }
}

/// Frames one interface payload inside a peer-to-peer blob.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireLinkHdr {
    pub src_gid_le: u64,
    pub dst_gid_le: u64,
    pub len_le: u32,
    pub _pad: u32,
}

impl WireLinkHdr {
    pub fn new(src: u64, dst: u64, len: usize) -> Self {
        WireLinkHdr {
            src_gid_le: src.to_le(),
            dst_gid_le: dst.to_le(),
            len_le: (len as u32).to_le(),
            _pad: 0,
        }
    }

    pub fn decode(&self) -> (u64, u64, usize) {
        (
            u64::from_le(self.src_gid_le),
            u64::from_le(self.dst_gid_le),
            u32::from_le(self.len_le) as usize,
        )
    }
}

const _: () = {
    assert!(size_of::<WireDescriptorHdr>() == 24);
    assert!(size_of::<WireLinkHdr>() == 24);
};

const TAG_F64: u8 = 0;
const TAG_I64: u8 = 1;

/// Little-endian append-only writer for descriptor payloads.
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn push_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn push_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_extent(&mut self, e: &Extent) {
        for side in 0..6 {
            self.push_i64(e[side]);
        }
    }

    pub fn push_coords(&mut self, c: &CoordArray) {
        match c {
            CoordArray::F64(v) => {
                self.push_u8(TAG_F64);
                self.push_u32(v.len() as u32);
                for x in v {
                    self.push_f64(*x);
                }
            }
            CoordArray::I64(v) => {
                self.push_u8(TAG_I64);
                self.push_u32(v.len() as u32);
                for x in v {
                    self.push_i64(*x);
                }
            }
        }
    }

    pub fn push_points(&mut self, points: &[[f64; 3]]) {
        self.push_u32(points.len() as u32);
        for p in points {
            self.push_f64(p[0]);
            self.push_f64(p[1]);
            self.push_f64(p[2]);
        }
    }
}

/// Little-endian sequential reader over a descriptor payload.
pub struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        WireReader { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GhostError> {
        if self.buf.len() < n {
            return Err(GhostError::TruncatedPayload {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8, GhostError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, GhostError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().expect("4 bytes")))
    }

    pub fn read_i64(&mut self) -> Result<i64, GhostError> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes(b.try_into().expect("8 bytes")))
    }

    pub fn read_f64(&mut self) -> Result<f64, GhostError> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes(b.try_into().expect("8 bytes")))
    }

    pub fn read_extent(&mut self) -> Result<Extent, GhostError> {
        let mut e = [0i64; 6];
        for v in &mut e {
            *v = self.read_i64()?;
        }
        Ok(Extent::new(e))
    }

    pub fn read_coords(&mut self) -> Result<CoordArray, GhostError> {
        let tag = self.read_u8()?;
        let n = self.read_u32()? as usize;
        match tag {
            TAG_F64 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(self.read_f64()?);
                }
                Ok(CoordArray::F64(v))
            }
            TAG_I64 => {
                let mut v = Vec::with_capacity(n);
                for _ in 0..n {
                    v.push(self.read_i64()?);
                }
                Ok(CoordArray::I64(v))
            }
            other => Err(GhostError::UnknownCoordTag(other)),
        }
    }

    pub fn read_points(&mut self) -> Result<Vec<[f64; 3]>, GhostError> {
        let n = self.read_u32()? as usize;
        let mut v = Vec::with_capacity(n);
        for _ in 0..n {
            v.push([self.read_f64()?, self.read_f64()?, self.read_f64()?]);
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(WireDescriptorHdr, [u8; 24]);
    assert_eq_size!(WireLinkHdr, [u8; 24]);

    #[test]
    fn header_round_trip() {
        let h = WireDescriptorHdr::new(7, 11, 96);
        let bytes: &[u8] = bytemuck::bytes_of(&h);
        let back: WireDescriptorHdr = *bytemuck::from_bytes(&bytes[..24]);
        assert_eq!(back.decode(), (7, 11, 96));
    }

    #[test]
    fn scalar_round_trip() {
        let mut w = WireWriter::new();
        w.push_u32(3);
        w.push_i64(-42);
        w.push_f64(6.5);
        w.push_extent(&Extent::new([0, 4, -1, 1, 2, 2]));
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_u32().unwrap(), 3);
        assert_eq!(r.read_i64().unwrap(), -42);
        assert_eq!(r.read_f64().unwrap(), 6.5);
        assert_eq!(r.read_extent().unwrap(), Extent::new([0, 4, -1, 1, 2, 2]));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn coords_round_trip() {
        for c in [
            CoordArray::F64(vec![0.0, 0.5, 1.5]),
            CoordArray::I64(vec![-3, 0, 7]),
        ] {
            let mut w = WireWriter::new();
            w.push_coords(&c);
            let bytes = w.into_bytes();
            let mut r = WireReader::new(&bytes);
            assert_eq!(r.read_coords().unwrap(), c);
        }
    }

    #[test]
    fn truncation_is_an_error() {
        let mut w = WireWriter::new();
        w.push_u32(9);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes[..2]);
        assert!(matches!(
            r.read_u32(),
            Err(GhostError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn points_round_trip() {
        let pts = vec![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
        let mut w = WireWriter::new();
        w.push_points(&pts);
        let bytes = w.into_bytes();
        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_points().unwrap(), pts);
    }
}
