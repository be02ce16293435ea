//! Cursor reader — the HTTP-facing "lines since N" contract.

use std::sync::Arc;

use super::buffer::{LinesPage, RingBuffer};

/// Serves cursor reads against a shared [`RingBuffer`].
///
/// `since` is caller-supplied and untrusted. Negative, evicted and future
/// cursors are all valid and simply clamp.
#[derive(Clone)]
pub struct CursorReader {
    buffer: Arc<RingBuffer>,
}

impl CursorReader {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self { buffer }
    }

    pub fn read(&self, since: i64) -> LinesPage {
        self.buffer.lines_since(since)
    }

    /// Cursor a client should hold to receive only lines appended from now on.
    pub fn head(&self) -> u64 {
        self.buffer.next_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_follows_total_as_cursor() {
        let buffer = Arc::new(RingBuffer::new(10));
        let reader = CursorReader::new(Arc::clone(&buffer));

        buffer.append("first");
        buffer.append("second");
        let page = reader.read(0);
        assert_eq!(page.lines, vec!["first", "second"]);

        buffer.append("third");
        let page = reader.read(page.total as i64);
        assert_eq!(page.lines, vec!["third"]);
        assert_eq!(page.total, 3);
        assert_eq!(reader.head(), 3);
    }

    #[test]
    fn test_page_serializes_as_lines_and_total() {
        let buffer = Arc::new(RingBuffer::new(2));
        buffer.append("a");
        let json = serde_json::to_value(CursorReader::new(buffer).read(-1)).unwrap();
        assert_eq!(json, serde_json::json!({ "lines": ["a"], "total": 1 }));
    }
}
