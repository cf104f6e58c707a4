// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

//! StreamLight: the in-memory row buffer of a streaming ingestion channel.
//!
//! A [`RowBuffer`] accepts loosely-typed application rows, validates and
//! coerces each cell against the channel's server-supplied column schema,
//! accumulates values in columnar vectors, keeps per-column running
//! statistics for downstream min/max indexing, and hands the accumulated
//! batch to the flush pipeline as an owned [`ChannelData`] snapshot.
//!
//! ```
//! use std::sync::Arc;
//! use streamlight::catalog::ColumnMetadata;
//! use streamlight::types::{ColumnLogicalType, ColumnPhysicalType, Row, RowValue};
//! use streamlight::{ChannelContext, RowBuffer};
//!
//! let channel = Arc::new(ChannelContext::new("db.schema.table.my_channel"));
//! let buffer = RowBuffer::new(channel);
//! buffer
//!     .setup_schema(&[ColumnMetadata {
//!         name: "id".into(),
//!         logical_type: ColumnLogicalType::Fixed,
//!         physical_type: ColumnPhysicalType::Sb8,
//!         precision: Some(18),
//!         scale: Some(0),
//!         byte_length: None,
//!         char_length: None,
//!         nullable: false,
//!     }])
//!     .unwrap();
//!
//! let row = Row::from([("id".to_string(), RowValue::Int64(1))]);
//! buffer.insert_rows(vec![row], Some("offset-1".into())).unwrap();
//! let snapshot = buffer.flush().unwrap();
//! assert_eq!(snapshot.row_count, 1);
//! ```

#![deny(unused_must_use)]

pub mod array;
pub mod catalog;
pub mod streaming;
pub mod types;

pub use self::streaming::{ChannelContext, ChannelData, IngestError, Result, RowBuffer};
