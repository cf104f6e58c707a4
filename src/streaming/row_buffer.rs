// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use itertools::Itertools;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::channel::{ChannelContext, ChannelData};
use super::stats::{EpInfo, RowBufferStats};
use super::{IngestError, Result, RowError};
use crate::array::{ArrayBuilder, ArrayBuilderImpl, BufferAllocator};
use crate::catalog::{normalize_column_name, ColumnMetadata, ColumnPlan, StorageKind};
use crate::types::{ConvertError, Row, RowValue};

/// The buffer in a streaming-ingest channel that holds the un-flushed rows
/// in columnar form, ready for snapshotting by the flush pipeline.
pub struct RowBuffer {
    /// Back-reference to the channel that owns this buffer.
    channel: Arc<ChannelContext>,
    /// Accounting arena shared by this buffer's column vectors.
    allocator: Arc<BufferAllocator>,
    /// All columnar state, serialized by the flush lock.
    state: Mutex<BufferState>,
    /// Current row count. Readable without the lock.
    row_count: AtomicU64,
    /// Current buffer size estimate in eighth-byte units: one unit per cell
    /// for its null-bitmap slot, eight per payload byte. Readable without
    /// the lock.
    buffer_size: AtomicU64,
}

#[derive(Default)]
struct BufferState {
    /// One plan per schema column, in schema order. Immutable after setup.
    plans: Vec<ColumnPlan>,
    /// Normalized column name to schema position.
    by_name: HashMap<String, usize>,
    /// One column vector per schema column, parallel to `plans`.
    vectors: Vec<ArrayBuilderImpl>,
    /// One running-stats object per schema column, parallel to `plans`.
    stats: Vec<RowBufferStats>,
    /// Index of the next row to be written.
    cur_row_index: usize,
}

impl RowBuffer {
    /// Create an empty buffer bound to `channel` and its allocator.
    pub fn new(channel: Arc<ChannelContext>) -> Self {
        let allocator = channel.allocator();
        RowBuffer {
            channel,
            allocator,
            state: Mutex::new(BufferState::default()),
            row_count: AtomicU64::new(0),
            buffer_size: AtomicU64::new(0),
        }
    }

    /// Set up the column plans, vectors and statistics from the server's
    /// column metadata. Called exactly once, before the first `insert_rows`.
    pub fn setup_schema(&self, columns: &[ColumnMetadata]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for column in columns {
            let plan = match ColumnPlan::build(column) {
                Ok(plan) => plan,
                Err(e) => {
                    warn!(
                        channel = %self.channel.fully_qualified_name(),
                        error = %e,
                        "unsupported column type",
                    );
                    return Err(e.into());
                }
            };
            let position = state.plans.len();
            state.by_name.insert(plan.name().to_owned(), position);
            state
                .vectors
                .push(ArrayBuilderImpl::with_capacity(0, plan.storage()));
            state.stats.push(RowBufferStats::new());
            state.plans.push(plan);
            self.allocator.vector_opened();
        }
        Ok(())
    }

    /// Insert a batch of rows, then record `offset_token` on the owning
    /// channel as the latest persisted row boundary.
    ///
    /// The whole batch is converted under the flush lock. On failure the
    /// batch is aborted: cells of the failing row that were already appended
    /// are not rolled back, and the offset token is left untouched.
    pub fn insert_rows<R>(&self, rows: R, offset_token: Option<String>) -> Result<()>
    where
        R: IntoIterator<Item = Row>,
    {
        let mut state = self.state.lock().unwrap();
        for row in rows {
            if let Err(source) = self.convert_row(&mut state, &row) {
                warn!(
                    channel = %self.channel.fully_qualified_name(),
                    error = %source,
                    "failed to convert row, aborting batch",
                );
                return Err(IngestError::InvalidRow {
                    channel: self.channel.fully_qualified_name().to_owned(),
                    source,
                });
            }
            self.row_count.fetch_add(1, Ordering::Relaxed);
        }
        let reserved: usize = state.vectors.iter().map(|v| v.estimated_size()).sum();
        self.allocator.set_reserved(reserved);
        self.channel.set_offset_token(offset_token);
        Ok(())
    }

    /// Convert one row into the column vectors. Caller holds the lock.
    fn convert_row(&self, state: &mut BufferState, row: &Row) -> std::result::Result<(), RowError> {
        for (raw_name, value) in row {
            // 1/8 byte for the cell's null-bitmap slot, null or not.
            self.buffer_size.fetch_add(1, Ordering::Relaxed);
            if raw_name.trim().is_empty() {
                return Err(RowError::EmptyColumnName);
            }
            let name = normalize_column_name(raw_name);
            let position = *state
                .by_name
                .get(&name)
                .ok_or(RowError::UnknownColumn(name))?;
            let row_index = state.cur_row_index;
            let payload_bytes = append_cell(
                &mut state.vectors[position],
                &state.plans[position],
                &mut state.stats[position],
                row_index,
                value,
            )?;
            self.buffer_size
                .fetch_add(payload_bytes * 8, Ordering::Relaxed);
        }
        state.cur_row_index += 1;
        Ok(())
    }

    /// Flush the buffered rows by transferring the vectors into an owned
    /// snapshot, then reset the buffer. Returns `None` when the buffer holds
    /// no rows.
    pub fn flush(&self) -> Option<ChannelData> {
        debug!(
            channel = %self.channel.fully_qualified_name(),
            "row buffer flush requested",
        );
        if self.row_count.load(Ordering::Relaxed) == 0 {
            return None;
        }

        let mut vectors = SmallVec::new();
        let row_count;
        let buffer_size;
        let row_sequencer;
        let offset_token;
        let ep_info;
        {
            let mut state = self.state.lock().unwrap();
            if self.row_count.load(Ordering::Relaxed) == 0 {
                return None;
            }
            // Top every vector up to the row count, then transfer ownership.
            let valid_count = state.cur_row_index;
            for vector in &mut state.vectors {
                vector.set_valid_count(valid_count);
                vectors.push(vector.take());
            }
            row_count = self.row_count.load(Ordering::Relaxed);
            buffer_size = self.size();
            row_sequencer = self.channel.increment_and_get_row_sequencer();
            offset_token = self.channel.offset_token();
            ep_info = EpInfo::from_stats(
                row_count,
                state
                    .plans
                    .iter()
                    .zip_eq(state.stats.iter())
                    .map(|(plan, stats)| (plan.name(), stats)),
            );
            self.reset(&mut state);
        }
        debug!(
            channel = %self.channel.fully_qualified_name(),
            row_count,
            buffer_size,
            "row buffer flush released lock",
        );

        // The transferred vectors are exclusively owned here, so the
        // snapshot is assembled outside the lock.
        Some(ChannelData {
            vectors,
            row_count,
            buffer_size,
            channel: self.channel.clone(),
            row_sequencer,
            offset_token,
            ep_info,
        })
    }

    /// Reset the buffer after a flush. Caller holds the lock.
    fn reset(&self, state: &mut BufferState) {
        for vector in &mut state.vectors {
            vector.clear();
        }
        for stats in &mut state.stats {
            *stats = RowBufferStats::new();
        }
        state.cur_row_index = 0;
        self.row_count.store(0, Ordering::Relaxed);
        self.buffer_size.store(0, Ordering::Relaxed);
        let reserved: usize = state.vectors.iter().map(|v| v.estimated_size()).sum();
        self.allocator.set_reserved(reserved);
    }

    /// Release every vector and close the allocator. The caller guarantees
    /// that no other thread touches the buffer afterwards; the buffer is
    /// terminal once closed.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        for _ in state.vectors.drain(..) {
            self.allocator.vector_closed();
        }
        state.plans.clear();
        state.by_name.clear();
        state.stats.clear();
        state.cur_row_index = 0;
        self.row_count.store(0, Ordering::Relaxed);
        self.buffer_size.store(0, Ordering::Relaxed);
        self.allocator.set_reserved(0);
        self.allocator.close();
    }

    /// Current buffer size estimate in bytes. Lock-free.
    pub fn size(&self) -> f64 {
        self.buffer_size.load(Ordering::Relaxed) as f64 / 8.0
    }

    /// Current number of buffered rows. Lock-free.
    pub fn row_count(&self) -> u64 {
        self.row_count.load(Ordering::Relaxed)
    }
}

/// Append one cell to its column vector and fold it into the column stats.
/// Returns the payload bytes added; the bitmap slot is accounted by the
/// caller.
fn append_cell(
    vector: &mut ArrayBuilderImpl,
    plan: &ColumnPlan,
    stats: &mut RowBufferStats,
    row_index: usize,
    value: &RowValue,
) -> std::result::Result<u64, RowError> {
    let payload_bytes = match vector {
        ArrayBuilderImpl::Int8(v) => {
            if value.is_null() {
                v.set_null(row_index);
                stats.inc_null();
                0
            } else {
                let n = value.as_i8()?;
                v.set(row_index, &n);
                stats.add_int(n as i128);
                1
            }
        }
        ArrayBuilderImpl::Int16(v) => {
            if value.is_null() {
                v.set_null(row_index);
                stats.inc_null();
                0
            } else {
                let n = value.as_i16()?;
                v.set(row_index, &n);
                stats.add_int(n as i128);
                2
            }
        }
        ArrayBuilderImpl::Int32(v) => {
            if value.is_null() {
                v.set_null(row_index);
                stats.inc_null();
                0
            } else {
                let n = value.as_i32()?;
                v.set(row_index, &n);
                stats.add_int(n as i128);
                4
            }
        }
        ArrayBuilderImpl::Int64(v) => {
            if value.is_null() {
                v.set_null(row_index);
                stats.inc_null();
                0
            } else {
                let n = value.as_i64()?;
                v.set(row_index, &n);
                stats.add_int(n as i128);
                8
            }
        }
        ArrayBuilderImpl::Decimal(v) => {
            let StorageKind::Decimal128 { precision, scale } = plan.storage() else {
                panic!("decimal vector requires a decimal column plan");
            };
            if value.is_null() {
                // Decimal nulls are not folded into the null counter.
                v.set_null(row_index);
                0
            } else {
                let decimal = value.as_decimal()?;
                let unscaled = unscaled_decimal(decimal, precision, scale)?;
                v.set(row_index, &unscaled);
                let integral = decimal
                    .trunc()
                    .to_i128()
                    .ok_or_else(|| ConvertError::Cast(decimal.to_string(), "i128"))?;
                stats.add_int(integral);
                16
            }
        }
        ArrayBuilderImpl::Utf8(v) => {
            if value.is_null() {
                v.set_null(row_index);
                stats.inc_null();
                0
            } else {
                let text = value.to_string();
                v.set(row_index, &text);
                stats.set_max_length(text.len() as u64);
                stats.add_str(&text);
                text.len() as u64
            }
        }
    };
    Ok(payload_bytes)
}

/// Rescale `decimal` to the column scale and return the unscaled `i128`.
/// Values with more fractional digits than the column scale, or more digits
/// than the column precision, are rejected.
fn unscaled_decimal(
    decimal: Decimal,
    precision: u32,
    scale: u32,
) -> std::result::Result<i128, ConvertError> {
    let out_of_range = || ConvertError::DecimalOutOfRange(decimal.to_string(), precision, scale);
    if decimal.scale() > scale {
        return Err(out_of_range());
    }
    let mut rescaled = decimal;
    rescaled.rescale(scale);
    let unscaled = rescaled.mantissa();
    if let Some(limit) = 10i128.checked_pow(precision) {
        if unscaled.abs() >= limit {
            return Err(out_of_range());
        }
    }
    Ok(unscaled)
}
