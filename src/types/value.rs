// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;

use num_traits::FromPrimitive;
use ordered_float::OrderedFloat;
use parse_display::Display;
use rust_decimal::Decimal;
use serde::Serialize;

/// A wrapper around floats providing implementations of `Eq`, `Ord`, and `Hash`.
pub type F64 = OrderedFloat<f64>;

/// A loosely-typed cell value arriving in an application row.
///
/// Values are coerced against the column plan when the row is inserted; the
/// string rendition produced by `Display` is what string-typed columns store.
#[derive(Debug, Display, Clone, PartialEq, Serialize)]
pub enum RowValue {
    #[display("null")]
    Null,
    #[display("{0}")]
    Bool(bool),
    #[display("{0}")]
    Int32(i32),
    #[display("{0}")]
    Int64(i64),
    #[display("{0}")]
    Float64(F64),
    #[display("{0}")]
    Decimal(Decimal),
    #[display("{0}")]
    String(String),
}

/// An application row: column name to loosely-typed value.
pub type Row = HashMap<String, RowValue>;

macro_rules! impl_as_int {
    ($($name:ident: $ty:ty),*) => {
        $(
            /// Coerce the value to a signed integer of the target width.
            pub fn $name(&self) -> Result<$ty, ConvertError> {
                let cast_err = || ConvertError::Cast(self.to_string(), stringify!($ty));
                match self {
                    &Self::Int32(v) => v.try_into().map_err(|_| cast_err()),
                    &Self::Int64(v) => v.try_into().map_err(|_| cast_err()),
                    _ => Err(cast_err()),
                }
            }
        )*
    }
}

impl RowValue {
    /// Returns `true` if value is null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    impl_as_int! {
        as_i8: i8,
        as_i16: i16,
        as_i32: i32,
        as_i64: i64
    }

    /// Coerce the value to a decimal.
    pub fn as_decimal(&self) -> Result<Decimal, ConvertError> {
        let cast_err = || ConvertError::Cast(self.to_string(), "decimal");
        match self {
            Self::Decimal(d) => Ok(*d),
            &Self::Int32(v) => Ok(Decimal::from(v)),
            &Self::Int64(v) => Ok(Decimal::from(v)),
            &Self::Float64(f) => Decimal::from_f64(f.0).ok_or_else(cast_err),
            Self::String(s) => s
                .parse()
                .map_err(|_| ConvertError::ParseDecimal(s.clone())),
            _ => Err(cast_err()),
        }
    }
}

/// The error type of value type conversion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("failed to convert string {0:?} to decimal")]
    ParseDecimal(String),
    #[error("failed to cast {0} to type {1}")]
    Cast(String, &'static str),
    #[error("decimal {0} does not fit in ({1},{2})")]
    DecimalOutOfRange(String, u32, u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(RowValue::Int32(127).as_i8().unwrap(), 127i8);
        assert_eq!(RowValue::Int64(-32768).as_i16().unwrap(), -32768i16);
        assert_eq!(RowValue::Int32(42).as_i64().unwrap(), 42i64);
        RowValue::Int32(128).as_i8().unwrap_err();
        RowValue::Int64(1i64 << 40).as_i32().unwrap_err();
        RowValue::String("1".into()).as_i32().unwrap_err();
    }

    #[test]
    fn test_decimal_coercion() {
        assert_eq!(
            RowValue::String("1.23".into()).as_decimal().unwrap(),
            "1.23".parse::<Decimal>().unwrap()
        );
        assert_eq!(
            RowValue::Int64(100).as_decimal().unwrap(),
            Decimal::from(100)
        );
        RowValue::String("one".into()).as_decimal().unwrap_err();
        RowValue::Bool(true).as_decimal().unwrap_err();
    }

    #[test]
    fn test_display_is_raw_text() {
        assert_eq!(RowValue::String("hi".into()).to_string(), "hi");
        assert_eq!(RowValue::Int64(-3).to_string(), "-3");
        assert_eq!(RowValue::Bool(true).to_string(), "true");
        assert_eq!(RowValue::Null.to_string(), "null");
    }
}
