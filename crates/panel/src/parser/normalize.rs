//! Line normalizer — turns raw console chunks into discrete, clean lines.
//!
//! Chunks arrive at arbitrary boundaries (a TTY stream may deliver one byte
//! at a time), so unterminated data is held in the normalizer until its `\n`
//! shows up. Each poller owns its own normalizer.

use super::ansi::strip_ansi_codes;

/// Default ceiling for an unterminated line before it is flushed anyway.
pub const DEFAULT_MAX_PENDING_BYTES: usize = 64 * 1024;

/// Splits byte chunks into lines with terminal semantics applied.
///
/// Per completed line: ANSI escapes are stripped, then `\r` acts as a return
/// to column 0 so only the text after the last `\r` survives, then the result
/// is trimmed. Lines that end up empty are discarded.
#[derive(Debug)]
pub struct LineNormalizer {
    pending: Vec<u8>,
    max_pending: usize,
}

impl LineNormalizer {
    pub fn new(max_pending_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending: max_pending_bytes.max(1),
        }
    }

    /// Feed a chunk and collect every line it completes.
    pub fn normalize(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(line) = finish_line(&self.pending[start..end]) {
                lines.push(line);
            }
            start = end + 1;
        }
        self.pending.drain(..start);

        self.collapse_overwritten();

        if self.pending.len() > self.max_pending {
            if let Some(line) = finish_line(&self.pending) {
                lines.push(line);
            }
            self.pending.clear();
        }

        lines
    }

    /// Drop any unterminated data (used on reconnect).
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard text a later `\r` has already overwritten.
    ///
    /// A trailing `\r` is kept: it may be the first half of a `\r\n`.
    fn collapse_overwritten(&mut self) {
        let search = match self.pending.split_last() {
            Some((&b'\r', rest)) => rest,
            _ => &self.pending[..],
        };
        if let Some(pos) = search.iter().rposition(|&b| b == b'\r') {
            self.pending.drain(..=pos);
        }
    }
}

impl Default for LineNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PENDING_BYTES)
    }
}

/// Apply ANSI stripping, `\r` overwrite and trimming to one raw line.
fn finish_line(raw: &[u8]) -> Option<String> {
    let stripped = strip_ansi_codes(raw);

    let mut body: &[u8] = &stripped;
    while let Some((&b'\r', rest)) = body.split_last() {
        body = rest;
    }
    let visible = match body.iter().rposition(|&b| b == b'\r') {
        Some(pos) => &body[pos + 1..],
        None => body,
    };

    let text = String::from_utf8_lossy(visible);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
