//! Undo/redo history for the canvas.
//!
//! Keeps an ordered, bounded list of immutable snapshots with a single
//! cursor. Captures are debounced and deduplicated so that bursts of wheel or
//! drag events do not flood the list, and a replay guard suppresses captures
//! while a snapshot is being restored.

use std::collections::VecDeque;

use lumacanvas_core::constants::{HISTORY_CAPACITY, HISTORY_DEBOUNCE_MS};
use lumacanvas_core::{CanvasImage, ViewportTransform};

/// Immutable copy of the editable state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    /// The image, if one was on the canvas.
    pub image: Option<CanvasImage>,
    /// The viewport transform.
    pub transform: ViewportTransform,
    /// Clock reading when the snapshot was taken.
    pub captured_at_ms: u64,
}

impl HistorySnapshot {
    /// Same image identity and geometry, same viewport.
    pub fn same_state(&self, image: Option<&CanvasImage>, transform: &ViewportTransform) -> bool {
        let same_image = match (&self.image, image) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_placement(b),
            _ => false,
        };
        same_image && self.transform == *transform
    }
}

/// What happened to a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Stored as the new current snapshot.
    Accepted,
    /// Too close to the previous capture.
    Debounced,
    /// Identical to the current snapshot.
    Duplicate,
    /// A snapshot is being restored.
    Replaying,
}

impl CaptureOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CaptureOutcome::Accepted)
    }
}

/// Bounded linear undo/redo over [`HistorySnapshot`]s.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: VecDeque<HistorySnapshot>,
    current_index: Option<usize>,
    capacity: usize,
    debounce_ms: u64,
    last_capture_ms: Option<u64>,
    replaying: bool,
}

impl HistoryManager {
    /// Create a manager with the default capacity (50) and debounce (100ms).
    pub fn new() -> Self {
        Self::with_limits(HISTORY_CAPACITY, HISTORY_DEBOUNCE_MS)
    }

    /// Create a manager with custom limits. A capacity of zero is raised to one.
    pub fn with_limits(capacity: usize, debounce_ms: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            current_index: None,
            capacity,
            debounce_ms,
            last_capture_ms: None,
            replaying: false,
        }
    }

    /// Offer the current state for capture.
    pub fn capture(
        &mut self,
        image: Option<&CanvasImage>,
        transform: ViewportTransform,
        now_ms: u64,
    ) -> CaptureOutcome {
        self.record(image, transform, now_ms, true)
    }

    /// Capture without the debounce window.
    ///
    /// For discrete edits (content replacement, loading, removal) and for
    /// flushing a debounced gesture before undo/redo. Duplicates and the
    /// replay guard still apply.
    pub fn capture_now(
        &mut self,
        image: Option<&CanvasImage>,
        transform: ViewportTransform,
        now_ms: u64,
    ) -> CaptureOutcome {
        self.record(image, transform, now_ms, false)
    }

    fn record(
        &mut self,
        image: Option<&CanvasImage>,
        transform: ViewportTransform,
        now_ms: u64,
        debounce: bool,
    ) -> CaptureOutcome {
        if self.replaying {
            return CaptureOutcome::Replaying;
        }

        if self
            .current()
            .is_some_and(|current| current.same_state(image, &transform))
        {
            return CaptureOutcome::Duplicate;
        }

        if let Some(last) = self.last_capture_ms.filter(|_| debounce) {
            if now_ms.saturating_sub(last) < self.debounce_ms {
                return CaptureOutcome::Debounced;
            }
        }

        // Committing after an undo discards the redo branch
        if let Some(index) = self.current_index {
            self.snapshots.truncate(index + 1);
        }

        self.snapshots.push_back(HistorySnapshot {
            image: image.cloned(),
            transform,
            captured_at_ms: now_ms,
        });

        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }

        self.current_index = Some(self.snapshots.len() - 1);
        self.last_capture_ms = Some(now_ms);

        tracing::trace!(
            "History captured {}/{}",
            self.snapshots.len(),
            self.capacity
        );
        CaptureOutcome::Accepted
    }

    /// Step back one snapshot. Returns the snapshot to restore, or `None` at the boundary.
    pub fn undo(&mut self) -> Option<HistorySnapshot> {
        match self.current_index {
            Some(index) if index > 0 => {
                self.current_index = Some(index - 1);
                self.snapshots.get(index - 1).cloned()
            }
            _ => None,
        }
    }

    /// Step forward one snapshot. Returns the snapshot to restore, or `None` at the boundary.
    pub fn redo(&mut self) -> Option<HistorySnapshot> {
        match self.current_index {
            Some(index) if index + 1 < self.snapshots.len() => {
                self.current_index = Some(index + 1);
                self.snapshots.get(index + 1).cloned()
            }
            _ => None,
        }
    }

    /// Enter replay mode; captures are rejected until [`HistoryManager::exit_replay`].
    pub fn enter_replay(&mut self) {
        self.replaying = true;
    }

    pub fn exit_replay(&mut self) {
        self.replaying = false;
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|i| i + 1 < self.snapshots.len())
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.current_index.and_then(|i| self.snapshots.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Clock reading of the last accepted capture.
    pub fn last_capture_ms(&self) -> Option<u64> {
        self.last_capture_ms
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.snapshots.iter()
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current_index = None;
        self.last_capture_ms = None;
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}
