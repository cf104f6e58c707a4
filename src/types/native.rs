// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::fmt::Debug;

/// A fixed-width value that can back a primitive column vector.
pub trait NativeType:
    PartialOrd + PartialEq + Debug + Copy + Send + Sync + Sized + Default + 'static
{
}

macro_rules! impl_native {
    ($($t:ty),*) => {
        $(impl NativeType for $t {})*
    }
}
impl_native!(i8, i16, i32, i64, i128, f32, f64, bool);
