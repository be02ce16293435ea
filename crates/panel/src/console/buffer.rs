//! Ring buffer — bounded console history with a monotonic sequence counter.
//!
//! Every appended line receives the next sequence number. The counter is never
//! reset and never reused, even after the line it numbered has been evicted,
//! so the sequence of the oldest resident line is always
//! `next_sequence - resident_count`. Cursor clients rely on that identity.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::Serialize;

/// Recommended number of resident lines.
pub const DEFAULT_CAPACITY: usize = 500;

/// A normalized console line and the sequence number it was appended under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub sequence: u64,
    pub text: String,
}

/// Result of a cursor read: the lines at or after the cursor plus the
/// total number of lines ever appended (the cursor to use next time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinesPage {
    pub lines: Vec<String>,
    pub total: u64,
}

struct Inner {
    lines: VecDeque<LogLine>,
    next_sequence: u64,
}

/// Bounded FIFO of [`LogLine`]s guarded by a single mutex.
///
/// The mutex covers both the content and the counter, so a reader can never
/// observe a `next_sequence` that disagrees with the resident lines.
pub struct RingBuffer {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RingBuffer {
    /// Create a buffer holding at most `capacity` lines (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                lines: VecDeque::with_capacity(capacity),
                next_sequence: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a line, evicting the oldest one when full.
    ///
    /// Returns the sequence number assigned to `text`.
    pub fn append(&self, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        if inner.lines.len() == self.capacity {
            inner.lines.pop_front();
        }
        inner.lines.push_back(LogLine { sequence, text });
        inner.next_sequence += 1;
        sequence
    }

    /// Point-in-time copy of the resident lines and the next sequence number.
    pub fn snapshot(&self) -> (Vec<LogLine>, u64) {
        let inner = self.inner.lock();
        (inner.lines.iter().cloned().collect(), inner.next_sequence)
    }

    /// Total number of lines ever appended.
    pub fn next_sequence(&self) -> u64 {
        self.inner.lock().next_sequence
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines whose sequence is `>= cursor`, clamped to what is still resident.
    ///
    /// A cursor older than the oldest resident line returns everything
    /// resident; a cursor at or beyond `next_sequence` returns nothing.
    pub fn lines_since(&self, cursor: i64) -> LinesPage {
        let inner = self.inner.lock();
        let total = inner.next_sequence;
        let base = total - inner.lines.len() as u64;

        let cursor = if cursor < 0 { 0 } else { cursor as u64 };
        let start = cursor.clamp(base, total);
        let skip = (start - base) as usize;

        let lines = inner
            .lines
            .iter()
            .skip(skip)
            .map(|line| line.text.clone())
            .collect();

        LinesPage { lines, total }
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
