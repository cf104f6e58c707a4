// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

//! Columnar vectors backing the row buffer.
//!
//! A live column is an [`ArrayBuilderImpl`]: cells are written by row index
//! with [`ArrayBuilder::set`] / [`ArrayBuilder::set_null`], which back-fill
//! any slots skipped by rows that omitted the column. A flush tops the
//! vector up with [`ArrayBuilder::set_valid_count`] and takes its contents
//! out as an immutable owned [`ArrayImpl`], leaving the builder empty and
//! ready for the next batch.

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::catalog::StorageKind;

mod alloc;
mod iterator;
mod primitive_array;
mod utf8_array;

pub use self::alloc::BufferAllocator;
pub use self::iterator::ArrayIter;
pub use self::primitive_array::*;
pub use self::utf8_array::*;

/// A trait over all array builders.
///
/// Unlike a sequential builder, slots are addressed by row index: `set`
/// always accepts a reference to an element (`builder.set(0, &1)` for
/// `PrimitiveArray`, `builder.set(0, "xxx")` for `Utf8Array` without
/// constructing a `String`), and writing past the current end back-fills
/// the skipped slots with nulls. Slots are written in increasing row order,
/// at most once each.
pub trait ArrayBuilder: Send + Sync + 'static {
    /// Corresponding `Array` of this builder.
    type Array: Array<Builder = Self>;

    /// Create a new builder with `capacity`.
    fn with_capacity(capacity: usize) -> Self;

    /// Write a value into the slot at `row_index`, back-filling skipped
    /// slots with nulls.
    fn set(&mut self, row_index: usize, value: &<Self::Array as Array>::Item);

    /// Mark the slot at `row_index` null, back-filling skipped slots.
    fn set_null(&mut self, row_index: usize);

    /// Number of slots written so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad trailing null slots until the vector holds `valid_count` values.
    fn set_valid_count(&mut self, valid_count: usize) {
        if valid_count > self.len() {
            self.set_null(valid_count - 1);
        }
    }

    /// Take all values out of the builder, leaving it empty.
    fn take(&mut self) -> Self::Array;

    /// Drop all values, retaining the builder and its backing capacity.
    fn clear(&mut self);

    /// Estimated size of the backing storage in memory.
    fn estimated_size(&self) -> usize;
}

/// A trait over all arrays.
///
/// An `Array` is built with an [`ArrayBuilder`] and provides a unified
/// interface for length, element access and iteration.
pub trait Array: Sized + Send + Sync + 'static {
    /// Corresponding builder of this array.
    type Builder: ArrayBuilder<Array = Self>;

    /// Type of element in the array.
    type Item: ToOwned + ?Sized;

    /// Retrieve a reference to value.
    fn get(&self, idx: usize) -> Option<&Self::Item>;

    /// Number of items of array.
    fn len(&self) -> usize;

    /// Get iterator of current array.
    fn iter(&self) -> ArrayIter<'_, Self> {
        ArrayIter::new(self)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An extension trait exposing the validity bitmap of an [`Array`].
pub trait ArrayValidExt: Array {
    fn valid_bitmap(&self) -> &BitVec;
}

/// An extension trait estimating the in-memory size of an [`Array`].
pub trait ArrayEstimateExt: Array {
    fn estimated_size(&self) -> usize;
}

pub type I8Array = PrimitiveArray<i8>;
pub type I16Array = PrimitiveArray<i16>;
pub type I32Array = PrimitiveArray<i32>;
pub type I64Array = PrimitiveArray<i64>;
/// Decimal columns store the unscaled `i128` at the column scale.
pub type Decimal128Array = PrimitiveArray<i128>;

pub type I8ArrayBuilder = PrimitiveArrayBuilder<i8>;
pub type I16ArrayBuilder = PrimitiveArrayBuilder<i16>;
pub type I32ArrayBuilder = PrimitiveArrayBuilder<i32>;
pub type I64ArrayBuilder = PrimitiveArrayBuilder<i64>;
pub type Decimal128ArrayBuilder = PrimitiveArrayBuilder<i128>;

/// Embeds all types of arrays in the `array` module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayImpl {
    Int8(I8Array),
    Int16(I16Array),
    Int32(I32Array),
    Int64(I64Array),
    Decimal(Decimal128Array),
    Utf8(Utf8Array),
}

/// Embeds all types of array builders in the `array` module.
pub enum ArrayBuilderImpl {
    Int8(I8ArrayBuilder),
    Int16(I16ArrayBuilder),
    Int32(I32ArrayBuilder),
    Int64(I64ArrayBuilder),
    Decimal(Decimal128ArrayBuilder),
    Utf8(Utf8ArrayBuilder),
}

/// An error which can be returned when downcasting an [`ArrayImpl`] into a
/// concrete type array.
#[derive(Debug, Clone)]
pub struct TypeMismatch;

macro_rules! impl_into {
    ($x:ty, $y:ident) => {
        impl From<$x> for ArrayImpl {
            fn from(array: $x) -> Self {
                Self::$y(array)
            }
        }

        impl TryFrom<ArrayImpl> for $x {
            type Error = TypeMismatch;

            fn try_from(array: ArrayImpl) -> Result<Self, Self::Error> {
                match array {
                    ArrayImpl::$y(array) => Ok(array),
                    _ => Err(TypeMismatch),
                }
            }
        }

        impl<'a> TryFrom<&'a ArrayImpl> for &'a $x {
            type Error = TypeMismatch;

            fn try_from(array: &'a ArrayImpl) -> Result<Self, Self::Error> {
                match array {
                    ArrayImpl::$y(array) => Ok(array),
                    _ => Err(TypeMismatch),
                }
            }
        }
    };
}

impl_into! { I8Array, Int8 }
impl_into! { I16Array, Int16 }
impl_into! { I32Array, Int32 }
impl_into! { I64Array, Int64 }
impl_into! { Decimal128Array, Decimal }
impl_into! { Utf8Array, Utf8 }

macro_rules! dispatch {
    ($self:ident, $a:ident, $e:expr) => {
        match $self {
            Self::Int8($a) => $e,
            Self::Int16($a) => $e,
            Self::Int32($a) => $e,
            Self::Int64($a) => $e,
            Self::Decimal($a) => $e,
            Self::Utf8($a) => $e,
        }
    };
}

impl ArrayImpl {
    /// Number of items of array.
    pub fn len(&self) -> usize {
        dispatch!(self, a, a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The validity bitmap of the array.
    pub fn valid_bitmap(&self) -> &BitVec {
        dispatch!(self, a, a.valid_bitmap())
    }

    /// Estimated size of the array in memory.
    pub fn estimated_size(&self) -> usize {
        dispatch!(self, a, a.estimated_size())
    }
}

impl ArrayBuilderImpl {
    /// Create a new array builder for the given column storage.
    pub fn with_capacity(capacity: usize, storage: StorageKind) -> Self {
        match storage {
            StorageKind::Int8 => Self::Int8(I8ArrayBuilder::with_capacity(capacity)),
            StorageKind::Int16 => Self::Int16(I16ArrayBuilder::with_capacity(capacity)),
            StorageKind::Int32 => Self::Int32(I32ArrayBuilder::with_capacity(capacity)),
            StorageKind::Int64 => Self::Int64(I64ArrayBuilder::with_capacity(capacity)),
            StorageKind::Decimal128 { .. } => {
                Self::Decimal(Decimal128ArrayBuilder::with_capacity(capacity))
            }
            StorageKind::Utf8 => Self::Utf8(Utf8ArrayBuilder::with_capacity(capacity)),
        }
    }

    /// Number of slots written so far.
    pub fn len(&self) -> usize {
        dispatch!(self, a, a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad trailing null slots until the vector holds `valid_count` values.
    pub fn set_valid_count(&mut self, valid_count: usize) {
        dispatch!(self, a, a.set_valid_count(valid_count))
    }

    /// Take all values out of the builder, leaving it empty.
    pub fn take(&mut self) -> ArrayImpl {
        match self {
            Self::Int8(a) => ArrayImpl::Int8(a.take()),
            Self::Int16(a) => ArrayImpl::Int16(a.take()),
            Self::Int32(a) => ArrayImpl::Int32(a.take()),
            Self::Int64(a) => ArrayImpl::Int64(a.take()),
            Self::Decimal(a) => ArrayImpl::Decimal(a.take()),
            Self::Utf8(a) => ArrayImpl::Utf8(a.take()),
        }
    }

    /// Drop all values, retaining the builder and its backing capacity.
    pub fn clear(&mut self) {
        dispatch!(self, a, a.clear())
    }

    /// Estimated size of the backing storage in memory.
    pub fn estimated_size(&self) -> usize {
        dispatch!(self, a, a.estimated_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_valid_count_backfills_nulls() {
        let mut builder = ArrayBuilderImpl::with_capacity(0, StorageKind::Int32);
        let ArrayBuilderImpl::Int32(b) = &mut builder else {
            unreachable!();
        };
        b.set(0, &7);
        builder.set_valid_count(3);
        let array = builder.take();
        assert_eq!(array.len(), 3);
        let array: &I32Array = (&array).try_into().unwrap();
        assert_eq!(array.get(0), Some(&7));
        assert_eq!(array.get(1), None);
        assert_eq!(array.get(2), None);
    }

    #[test]
    fn test_take_leaves_builder_empty() {
        let mut builder = ArrayBuilderImpl::with_capacity(4, StorageKind::Utf8);
        let ArrayBuilderImpl::Utf8(b) = &mut builder else {
            unreachable!();
        };
        b.set(0, "hello");
        b.set_null(1);
        let array = builder.take();
        assert_eq!(array.len(), 2);
        assert_eq!(builder.len(), 0);
        // The builder stays usable after a take.
        builder.set_valid_count(1);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_downcast_mismatch() {
        let array: ArrayImpl = I32Array::from_iter([Some(1)]).into();
        <&I64Array>::try_from(&array).unwrap_err();
    }
}
