// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

//! The streaming-ingest row buffer.
//!
//! A channel's un-flushed rows live in a [`RowBuffer`]: loosely-typed rows
//! are validated and coerced against the channel schema, accumulated in
//! columnar vectors and summarized by per-column statistics. A flush
//! transfers the accumulated batch out as an owned [`ChannelData`] snapshot
//! for the flush pipeline.

mod channel;
mod row_buffer;
mod stats;

pub use self::channel::{ChannelContext, ChannelData};
pub use self::row_buffer::RowBuffer;
pub use self::stats::{EpInfo, FileColumnProperties, RowBufferStats};

use crate::catalog::CatalogError;
use crate::types::ConvertError;

/// The result type of the streaming buffer.
pub type Result<T> = std::result::Result<T, IngestError>;

/// The error type of the streaming buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// A malformed row aborted the batch. Cells of the failing row that were
    /// already appended are not rolled back.
    #[error("invalid row in channel {channel}: {source}")]
    InvalidRow { channel: String, source: RowError },
    /// The schema requested a (logical, physical) type pair outside the
    /// supported matrix.
    #[error(transparent)]
    UnknownDataType(#[from] CatalogError),
}

/// Why a single row failed conversion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("column name must not be empty")]
    EmptyColumnName,
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}
