// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::mem;

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use super::{Array, ArrayBuilder, ArrayEstimateExt, ArrayValidExt};

/// A collection of variable-length UTF-8 strings, stored as one contiguous
/// byte buffer sliced by an offset table. Null slots are empty ranges masked
/// by the validity bitmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utf8Array {
    offsets: Vec<usize>,
    validity: BitVec,
    bytes: Vec<u8>,
}

impl Array for Utf8Array {
    type Item = str;
    type Builder = Utf8ArrayBuilder;

    fn get(&self, idx: usize) -> Option<&str> {
        if self.validity[idx] {
            let slice = &self.bytes[self.offsets[idx]..self.offsets[idx + 1]];
            // `bytes` is only ever extended from `&str`.
            Some(unsafe { std::str::from_utf8_unchecked(slice) })
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.validity.len()
    }
}

impl ArrayValidExt for Utf8Array {
    fn valid_bitmap(&self) -> &BitVec {
        &self.validity
    }
}

impl ArrayEstimateExt for Utf8Array {
    fn estimated_size(&self) -> usize {
        self.bytes.len() + self.offsets.len() * mem::size_of::<usize>() + self.validity.len() / 8
    }
}

/// `Utf8ArrayBuilder` accumulates an [`Utf8Array`] through indexed,
/// grow-safe writes.
pub struct Utf8ArrayBuilder {
    offsets: Vec<usize>,
    validity: BitVec,
    bytes: Vec<u8>,
}

impl Utf8ArrayBuilder {
    /// Back-fill null slots up to (not including) `row_index`.
    fn back_fill(&mut self, row_index: usize) {
        debug_assert!(row_index >= self.validity.len(), "slots are written in row order");
        self.validity.resize(row_index, false);
        self.offsets.resize(row_index + 1, self.bytes.len());
    }
}

impl ArrayBuilder for Utf8ArrayBuilder {
    type Array = Utf8Array;

    fn with_capacity(capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Self {
            offsets,
            bytes: Vec::with_capacity(capacity),
            validity: BitVec::with_capacity(capacity),
        }
    }

    fn set(&mut self, row_index: usize, value: &str) {
        self.back_fill(row_index);
        self.validity.push(true);
        self.bytes.extend_from_slice(value.as_bytes());
        self.offsets.push(self.bytes.len());
    }

    fn set_null(&mut self, row_index: usize) {
        self.back_fill(row_index);
        self.validity.push(false);
        self.offsets.push(self.bytes.len());
    }

    fn len(&self) -> usize {
        self.validity.len()
    }

    fn take(&mut self) -> Utf8Array {
        Utf8Array {
            validity: mem::take(&mut self.validity),
            bytes: mem::take(&mut self.bytes),
            offsets: mem::replace(&mut self.offsets, vec![0]),
        }
    }

    fn clear(&mut self) {
        self.validity.clear();
        self.bytes.clear();
        self.offsets.truncate(1);
    }

    fn estimated_size(&self) -> usize {
        self.bytes.len() + self.offsets.len() * mem::size_of::<usize>() + self.validity.len() / 8
    }
}

// Enable `collect()` an array from an iterator of `Option<impl AsRef<str>>`.
impl<S: AsRef<str>> FromIterator<Option<S>> for Utf8Array {
    fn from_iter<I: IntoIterator<Item = Option<S>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = Utf8ArrayBuilder::with_capacity(iter.size_hint().0);
        for (row_index, e) in iter.enumerate() {
            match e {
                Some(value) => builder.set(row_index, value.as_ref()),
                None => builder.set_null(row_index),
            }
        }
        builder.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_builder() {
        let mut builder = Utf8ArrayBuilder::with_capacity(100);
        for i in 0..100 {
            if i % 2 == 0 {
                builder.set(i, &format!("{}", i));
            } else {
                builder.set_null(i);
            }
        }
        let array = builder.take();
        assert_eq!(array.len(), 100);
        assert_eq!(array.get(0), Some("0"));
        assert_eq!(array.get(1), None);
        assert_eq!(array.get(98), Some("98"));
    }

    #[test]
    fn test_sparse_writes_backfill_nulls() {
        let mut builder = Utf8ArrayBuilder::with_capacity(0);
        builder.set(1, "ab");
        builder.set(3, "cde");
        let array = builder.take();
        assert_eq!(
            array.iter().collect::<Vec<_>>(),
            vec![None, Some("ab"), None, Some("cde")]
        );
    }

    #[test]
    fn test_clear_retains_leading_offset() {
        let mut builder = Utf8ArrayBuilder::with_capacity(2);
        builder.set(0, "ab");
        builder.set(1, "cd");
        builder.clear();
        assert_eq!(builder.len(), 0);
        builder.set(0, "xy");
        let array = builder.take();
        assert_eq!(array.get(0), Some("xy"));
    }
}
