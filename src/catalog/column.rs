// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ColumnLogicalType, ColumnPhysicalType};

// Per-field metadata keys preserved for downstream readers. The strings are
// part of the columnar encoding's wire format and must match exactly.
pub const COLUMN_PHYSICAL_TYPE: &str = "physicalType";
pub const COLUMN_LOGICAL_TYPE: &str = "logicalType";
pub const COLUMN_PRECISION: &str = "precision";
pub const COLUMN_SCALE: &str = "scale";
pub const COLUMN_CHAR_LENGTH: &str = "charLength";
pub const COLUMN_BYTE_LENGTH: &str = "byteLength";

/// A column descriptor as reported by the server when a channel is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub logical_type: ColumnLogicalType,
    pub physical_type: ColumnPhysicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_length: Option<u32>,
    pub nullable: bool,
}

/// The columnar storage selected for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Int8,
    Int16,
    Int32,
    Int64,
    /// Unscaled `i128` at the given scale. The bit width is fixed at 128.
    Decimal128 { precision: u32, scale: u32 },
    Utf8,
}

/// The error type of schema resolution.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown data type: {0}/{1}")]
    UnknownDataType(ColumnLogicalType, ColumnPhysicalType),
}

/// Normalize a column name: a name wrapped in ASCII double quotes is taken
/// verbatim with the quotes stripped; any other name is upper-cased by ASCII
/// rules.
pub fn normalize_column_name(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name[1..name.len() - 1].to_string()
    } else {
        name.to_ascii_uppercase()
    }
}

/// An immutable per-column plan derived from a [`ColumnMetadata`] at schema
/// setup: the normalized name, the storage to accumulate values in, and the
/// metadata preserved for downstream readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    name: String,
    storage: StorageKind,
    nullable: bool,
    metadata: BTreeMap<String, String>,
}

impl ColumnPlan {
    /// Resolve a server column descriptor into a plan.
    pub fn build(column: &ColumnMetadata) -> Result<ColumnPlan, CatalogError> {
        use ColumnLogicalType as L;
        use ColumnPhysicalType as P;

        let scale = column.scale.unwrap_or(0);
        let precision = column.precision.unwrap_or(38);
        let storage = match (column.logical_type, column.physical_type) {
            (L::Fixed, P::Sb1) if scale == 0 => StorageKind::Int8,
            (L::Fixed, P::Sb2) if scale == 0 => StorageKind::Int16,
            (L::Fixed, P::Sb4) if scale == 0 => StorageKind::Int32,
            (L::Fixed, P::Sb8) if scale == 0 => StorageKind::Int64,
            (L::Fixed, P::Sb1 | P::Sb2 | P::Sb4 | P::Sb8 | P::Sb16) => {
                StorageKind::Decimal128 { precision, scale }
            }
            (L::Any | L::Array | L::Char | L::Text | L::Object | L::Variant, _) => {
                StorageKind::Utf8
            }
            (logical, physical) => return Err(CatalogError::UnknownDataType(logical, physical)),
        };

        let mut metadata = BTreeMap::new();
        metadata.insert(
            COLUMN_LOGICAL_TYPE.to_owned(),
            column.logical_type.to_string(),
        );
        metadata.insert(
            COLUMN_PHYSICAL_TYPE.to_owned(),
            column.physical_type.to_string(),
        );
        if let Some(precision) = column.precision {
            metadata.insert(COLUMN_PRECISION.to_owned(), precision.to_string());
        }
        if let Some(scale) = column.scale {
            metadata.insert(COLUMN_SCALE.to_owned(), scale.to_string());
        }
        if let Some(byte_length) = column.byte_length {
            metadata.insert(COLUMN_BYTE_LENGTH.to_owned(), byte_length.to_string());
        }
        if let Some(char_length) = column.char_length {
            metadata.insert(COLUMN_CHAR_LENGTH.to_owned(), char_length.to_string());
        }

        Ok(ColumnPlan {
            name: normalize_column_name(&column.name),
            storage,
            nullable: column.nullable,
            metadata,
        })
    }

    /// The normalized column name. This is the key used throughout the buffer.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Metadata preserved for the downstream columnar encoding.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
