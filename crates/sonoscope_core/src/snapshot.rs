//! Single-Slot Frame Handoff
//!
//! The audio thread publishes the most recently completed frame here; the
//! analysis/UI side takes it at its own cadence. The slot holds at most one
//! pending snapshot: publishing again before the consumer arrives simply
//! replaces it (last-write-wins, no queueing).
//!
//! The unit of exchange is a whole `Arc<Frame>` swapped atomically, so the
//! consumer can never observe a frame the producer is still writing.

use std::sync::Arc;

use crossbeam_utils::atomic::AtomicCell;

use crate::frame::Frame;

/// Lock-free single-slot cell carrying frame snapshots between threads.
pub struct SnapshotCell {
    slot: AtomicCell<Option<Arc<Frame>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self {
            slot: AtomicCell::new(None),
        }
    }

    /// Publish a frame, replacing any pending snapshot.
    pub fn publish(&self, frame: Frame) {
        self.slot.swap(Some(Arc::new(frame)));
    }

    /// Take the pending snapshot, leaving the slot empty.
    ///
    /// Returns `None` when nothing new was published since the last take.
    pub fn take(&self) -> Option<Arc<Frame>> {
        self.slot.take()
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new()
    }
}
