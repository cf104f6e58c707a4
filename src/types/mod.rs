// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

//! The column type vocabulary shared with the ingestion server, and the
//! loosely-typed values arriving in application rows.

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

mod native;
mod value;

pub use self::native::NativeType;
pub use self::value::*;

/// Logical column type reported by the server schema.
#[derive(Debug, Display, FromStr, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnLogicalType {
    Any,
    Boolean,
    Rowindex,
    Null,
    Real,
    Fixed,
    Text,
    Char,
    Binary,
    Date,
    Time,
    TimestampLtz,
    TimestampNtz,
    TimestampTz,
    Interval,
    Raw,
    Array,
    Object,
    Variant,
    Row,
    Sequence,
    Function,
    UserDefinedType,
}

/// Physical column type reported by the server schema.
#[derive(Debug, Display, FromStr, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnPhysicalType {
    Rowindex,
    Double,
    Sb1,
    Sb2,
    Sb4,
    Sb8,
    Sb16,
    Lob,
    Binary,
    Row,
}
