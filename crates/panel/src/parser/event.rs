//! Player event detection on normalized console lines.

use serde::Serialize;

/// Name used when a join/leave line carries no token before the phrase.
pub const FALLBACK_PLAYER_NAME: &str = "Someone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Join,
    Leave,
}

impl EventKind {
    /// Event name handed to the notification sink.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub player_name: String,
}

impl DomainEvent {
    /// Human-readable notification text.
    pub fn message(&self) -> String {
        match self.kind {
            EventKind::Join => format!("**{}** joined the server", self.player_name),
            EventKind::Leave => format!("**{}** left the server", self.player_name),
        }
    }
}

// Checked in order; the first phrase found wins.
const RULES: &[(&str, EventKind)] = &[
    ("has joined", EventKind::Join),
    ("has left", EventKind::Leave),
    ("has disconnected", EventKind::Leave),
];

/// Detect a join/leave event in `line`.
///
/// Phrases match case-insensitively. The player name is the last
/// whitespace-delimited token before the phrase, taken from the line as
/// written.
pub fn detect(line: &str) -> Option<DomainEvent> {
    RULES.iter().find_map(|&(phrase, kind)| {
        let at = find_ignore_ascii_case(line, phrase)?;
        let player_name = line[..at]
            .split_whitespace()
            .last()
            .unwrap_or(FALLBACK_PLAYER_NAME)
            .to_string();
        Some(DomainEvent { kind, player_name })
    })
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
///
/// `needle` must be ASCII, which keeps the returned offset on a char boundary.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
