//! Attribute arrays: named tuples of `f64` attached to cells or points.
//!
//! Blocks of one job share an attribute schema (same array names and
//! component counts for a given association). The generator copies the
//! structure to each output at the expanded tuple count and routes tuples
//! across block interfaces by id lists.

use crate::ghost_error::GhostError;
use serde::{Deserialize, Serialize};

/// One named attribute array with a fixed number of components per tuple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeArray {
    name: String,
    components: usize,
    values: Vec<f64>,
}

impl AttributeArray {
    /// Create an array from its flat value buffer.
    ///
    /// The buffer length must be a multiple of `components`.
    pub fn new(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        assert!(components > 0, "attribute arrays need at least one component");
        debug_assert_eq!(values.len() % components, 0);
        AttributeArray {
            name: name.into(),
            components,
            values,
        }
    }

    /// A zero-filled array of the same name and component count.
    pub fn structure_with_tuples(&self, num_tuples: usize) -> AttributeArray {
        AttributeArray {
            name: self.name.clone(),
            components: self.components,
            values: vec![0.0; num_tuples * self.components],
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    #[inline]
    pub fn num_tuples(&self) -> usize {
        self.values.len() / self.components
    }

    #[inline]
    pub fn tuple(&self, id: usize) -> &[f64] {
        &self.values[id * self.components..(id + 1) * self.components]
    }

    #[inline]
    pub fn set_tuple(&mut self, id: usize, tuple: &[f64]) {
        self.values[id * self.components..(id + 1) * self.components].copy_from_slice(tuple);
    }

    /// Copy tuple `src_id` of `src` into tuple `dst_id` of `self`.
    #[inline]
    pub fn copy_tuple(&mut self, src: &AttributeArray, src_id: usize, dst_id: usize) {
        let t = src.tuple(src_id);
        self.set_tuple(dst_id, t);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// A set of attribute arrays sharing one association (cells or points).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    arrays: Vec<AttributeArray>,
}

impl AttributeSet {
    pub fn new(arrays: Vec<AttributeArray>) -> Self {
        AttributeSet { arrays }
    }

    pub fn arrays(&self) -> &[AttributeArray] {
        &self.arrays
    }

    pub fn arrays_mut(&mut self) -> &mut [AttributeArray] {
        &mut self.arrays
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&AttributeArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Copy the structure of every array, sized to `num_tuples` zeroed
    /// tuples each.
    pub fn structure_with_tuples(&self, num_tuples: usize) -> AttributeSet {
        AttributeSet {
            arrays: self
                .arrays
                .iter()
                .map(|a| a.structure_with_tuples(num_tuples))
                .collect(),
        }
    }

    /// Total component count of one tuple across all arrays, the stride of
    /// a packed interface payload.
    pub fn tuple_width(&self) -> usize {
        self.arrays.iter().map(|a| a.components).sum()
    }

    /// Append the tuples at `ids` of every array to `out`, array-major.
    pub fn pack(&self, ids: &[usize], out: &mut Vec<f64>) {
        for a in &self.arrays {
            for &id in ids {
                out.extend_from_slice(a.tuple(id));
            }
        }
    }

    /// Scatter a payload produced by [`pack`](Self::pack) on the sending
    /// side into the tuples at `ids`.
    pub fn unpack(
        &mut self,
        ids: &[usize],
        data: &[f64],
        local: u64,
        remote: u64,
    ) -> Result<(), GhostError> {
        let expected: usize = self.tuple_width() * ids.len();
        if data.len() != expected {
            return Err(GhostError::InterfaceMismatch {
                local,
                remote,
                kind: "attribute",
                expected,
                got: data.len(),
            });
        }
        let mut cursor = 0usize;
        for a in &mut self.arrays {
            for &id in ids {
                a.set_tuple(id, &data[cursor..cursor + a.components]);
                cursor += a.components;
            }
        }
        Ok(())
    }
}
