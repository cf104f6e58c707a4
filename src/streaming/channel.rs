// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

use super::stats::EpInfo;
use crate::array::{ArrayImpl, BufferAllocator};

/// The owning channel's side of the row-buffer contract: allocator access,
/// the fully-qualified name used in diagnostics, the per-channel row
/// sequencer and the offset token of the latest persisted row boundary.
///
/// The channel outlives its buffer; both sides hold the context through an
/// [`Arc`].
pub struct ChannelContext {
    fully_qualified_name: String,
    allocator: Arc<BufferAllocator>,
    row_sequencer: AtomicI64,
    offset_token: Mutex<Option<String>>,
}

impl ChannelContext {
    pub fn new(fully_qualified_name: impl Into<String>) -> Self {
        Self {
            fully_qualified_name: fully_qualified_name.into(),
            allocator: Arc::new(BufferAllocator::new()),
            row_sequencer: AtomicI64::new(0),
            offset_token: Mutex::new(None),
        }
    }

    pub fn fully_qualified_name(&self) -> &str {
        &self.fully_qualified_name
    }

    /// The arena backing this channel's column vectors.
    pub fn allocator(&self) -> Arc<BufferAllocator> {
        self.allocator.clone()
    }

    /// Atomically advance and return the per-channel row sequencer.
    pub fn increment_and_get_row_sequencer(&self) -> i64 {
        self.row_sequencer.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The offset token of the latest persisted row boundary.
    pub fn offset_token(&self) -> Option<String> {
        self.offset_token.lock().unwrap().clone()
    }

    pub fn set_offset_token(&self, token: Option<String>) {
        *self.offset_token.lock().unwrap() = token;
    }
}

/// The immutable hand-off artifact of one flush.
///
/// The flush consumer assumes exclusive ownership of `vectors` and releases
/// them by dropping the snapshot.
pub struct ChannelData {
    /// One owned column vector per schema column, in schema order.
    pub vectors: SmallVec<[ArrayImpl; 16]>,
    /// Number of rows in the snapshot.
    pub row_count: u64,
    /// Buffer size estimate at flush time, in bytes.
    pub buffer_size: f64,
    /// The channel this snapshot was taken from.
    pub channel: Arc<ChannelContext>,
    /// Monotonic per-channel flush sequencer.
    pub row_sequencer: i64,
    /// Offset token of the latest row in the snapshot.
    pub offset_token: Option<String>,
    /// Per-column statistics payload for the downstream indexer.
    pub ep_info: EpInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_sequencer_is_strictly_increasing() {
        let channel = ChannelContext::new("db.schema.table.channel");
        assert_eq!(channel.increment_and_get_row_sequencer(), 1);
        assert_eq!(channel.increment_and_get_row_sequencer(), 2);
        assert_eq!(channel.increment_and_get_row_sequencer(), 3);
    }

    #[test]
    fn test_offset_token_round_trip() {
        let channel = ChannelContext::new("c");
        assert_eq!(channel.offset_token(), None);
        channel.set_offset_token(Some("t1".into()));
        assert_eq!(channel.offset_token(), Some("t1".into()));
    }
}
