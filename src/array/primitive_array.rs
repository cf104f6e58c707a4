// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::mem;

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use super::{Array, ArrayBuilder, ArrayEstimateExt, ArrayValidExt};
use crate::types::NativeType;

/// A collection of fixed-width values, such as `i32` and `i128`. Null slots
/// hold the type's default value and are masked by the validity bitmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveArray<T: NativeType> {
    validity: BitVec,
    values: Vec<T>,
}

impl<T: NativeType> FromIterator<Option<T>> for PrimitiveArray<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut builder = <Self as Array>::Builder::with_capacity(iter.size_hint().0);
        for (row_index, e) in iter.enumerate() {
            match e {
                Some(value) => builder.set(row_index, &value),
                None => builder.set_null(row_index),
            }
        }
        builder.take()
    }
}

impl<T: NativeType> Array for PrimitiveArray<T> {
    type Item = T;
    type Builder = PrimitiveArrayBuilder<T>;

    fn get(&self, idx: usize) -> Option<&T> {
        if self.validity[idx] {
            Some(&self.values[idx])
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.validity.len()
    }
}

impl<T: NativeType> ArrayValidExt for PrimitiveArray<T> {
    fn valid_bitmap(&self) -> &BitVec {
        &self.validity
    }
}

impl<T: NativeType> ArrayEstimateExt for PrimitiveArray<T> {
    fn estimated_size(&self) -> usize {
        self.values.len() * mem::size_of::<T>() + self.validity.len() / 8
    }
}

/// `PrimitiveArrayBuilder` accumulates a [`PrimitiveArray`] through indexed,
/// grow-safe writes.
pub struct PrimitiveArrayBuilder<T: NativeType> {
    validity: BitVec,
    values: Vec<T>,
}

impl<T: NativeType> PrimitiveArrayBuilder<T> {
    /// Back-fill null slots up to (not including) `row_index`.
    fn back_fill(&mut self, row_index: usize) {
        debug_assert!(row_index >= self.validity.len(), "slots are written in row order");
        self.validity.resize(row_index, false);
        self.values.resize(row_index, T::default());
    }
}

impl<T: NativeType> ArrayBuilder for PrimitiveArrayBuilder<T> {
    type Array = PrimitiveArray<T>;

    fn with_capacity(capacity: usize) -> Self {
        Self {
            validity: BitVec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn set(&mut self, row_index: usize, value: &T) {
        self.back_fill(row_index);
        self.validity.push(true);
        self.values.push(*value);
    }

    fn set_null(&mut self, row_index: usize) {
        self.back_fill(row_index);
        self.validity.push(false);
        self.values.push(T::default());
    }

    fn len(&self) -> usize {
        self.validity.len()
    }

    fn take(&mut self) -> PrimitiveArray<T> {
        PrimitiveArray {
            validity: mem::take(&mut self.validity),
            values: mem::take(&mut self.values),
        }
    }

    fn clear(&mut self) {
        self.validity.clear();
        self.values.clear();
    }

    fn estimated_size(&self) -> usize {
        self.values.len() * mem::size_of::<T>() + self.validity.len() / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_builder<T: NativeType + From<i8>>() {
        let iter = (0i8..100).map(|x| if x % 2 == 0 { None } else { Some(T::from(x)) });
        let array = iter.clone().collect::<PrimitiveArray<T>>();
        assert_eq!(
            array.iter().map(|x| x.copied()).collect::<Vec<_>>(),
            iter.collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_builder_i8() {
        test_builder::<i8>();
    }

    #[test]
    fn test_builder_i16() {
        test_builder::<i16>();
    }

    #[test]
    fn test_builder_i32() {
        test_builder::<i32>();
    }

    #[test]
    fn test_builder_i64() {
        test_builder::<i64>();
    }

    #[test]
    fn test_builder_i128() {
        test_builder::<i128>();
    }

    #[test]
    fn test_sparse_writes_backfill_nulls() {
        let mut builder = PrimitiveArrayBuilder::<i64>::with_capacity(0);
        builder.set(2, &10);
        builder.set(5, &20);
        let array = builder.take();
        assert_eq!(
            array.iter().map(|v| v.copied()).collect::<Vec<_>>(),
            vec![None, None, Some(10), None, None, Some(20)]
        );
    }

    #[test]
    fn test_take_and_reuse() {
        let mut builder = PrimitiveArrayBuilder::<i32>::with_capacity(4);
        builder.set(0, &1);
        builder.set_null(1);
        let array = builder.take();
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(0), Some(&1));
        assert_eq!(array.get(1), None);
        assert_eq!(builder.len(), 0);
        builder.set(0, &2);
        assert_eq!(builder.take().get(0), Some(&2));
    }
}
