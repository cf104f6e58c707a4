// Copyright 2026 StreamLight Project Authors. Licensed under Apache-2.0.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Arena-style accounting for the column vectors of a single row buffer.
///
/// The allocator tracks how many vectors are open and the estimated bytes
/// backing them. The owning buffer updates the gauge under its flush lock;
/// probes may read it from any thread. Flushed snapshots own their storage
/// outright and are not tracked here: the arena covers exactly the vectors
/// that the buffer will release on `close`.
#[derive(Debug, Default)]
pub struct BufferAllocator {
    reserved: AtomicUsize,
    open_vectors: AtomicUsize,
    closed: AtomicBool,
}

impl BufferAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn vector_opened(&self) {
        self.open_vectors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn vector_closed(&self) {
        self.open_vectors.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn set_reserved(&self, bytes: usize) {
        self.reserved.store(bytes, Ordering::Relaxed);
    }

    /// Estimated bytes currently backing open vectors.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved.load(Ordering::Relaxed)
    }

    /// Number of vectors currently registered with this allocator.
    pub fn open_vectors(&self) -> usize {
        self.open_vectors.load(Ordering::Relaxed)
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauges() {
        let allocator = BufferAllocator::new();
        allocator.vector_opened();
        allocator.vector_opened();
        allocator.set_reserved(128);
        assert_eq!(allocator.open_vectors(), 2);
        assert_eq!(allocator.reserved_bytes(), 128);
        allocator.vector_closed();
        allocator.vector_closed();
        allocator.set_reserved(0);
        allocator.close();
        assert_eq!(allocator.open_vectors(), 0);
        assert_eq!(allocator.reserved_bytes(), 0);
        assert!(allocator.is_closed());
    }
}
