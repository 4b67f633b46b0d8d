//! Snapshots of the session's accounting counters.

use crate::session::Session;

/// Lengths of every stack-like structure a trap must restore.
///
/// Between balanced operations every field returns to its snapshotted
/// value; comparing two checkpoints is how that is verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub dsp: usize,
    pub top_chunk: usize,
    pub frame_depth: usize,
    pub gc_disabled: usize,
    pub manuals_len: usize,
    pub series_guard_len: usize,
    pub value_guard_len: usize,
    pub uni_buf_len: usize,
    pub mold_stack_len: usize,
}

impl Session {
    /// Captures the current counters.
    ///
    /// Must not be called while a key collection is in progress.
    pub fn snapshot(&self) -> Checkpoint {
        debug_assert!(
            self.collect_buf.is_empty(),
            "snapshot taken during an unfinished key collection"
        );
        Checkpoint {
            dsp: self.stack.len(),
            top_chunk: self.chunks.len(),
            frame_depth: self.frames.len(),
            gc_disabled: self.heap.disabled(),
            manuals_len: self.heap.manuals_len(),
            series_guard_len: self.heap.series_guard_len(),
            value_guard_len: self.heap.value_guard_len(),
            uni_buf_len: self.uni_buf.len(),
            mold_stack_len: self.mold_stack.len(),
        }
    }

    /// Debug check that the session is back at `checkpoint`.
    #[inline]
    pub fn assert_balanced(&self, checkpoint: &Checkpoint) {
        if cfg!(debug_assertions) {
            let now = self.snapshot();
            assert_eq!(&now, checkpoint, "session state is not balanced");
        }
    }
}
