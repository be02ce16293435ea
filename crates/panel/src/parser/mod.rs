//! Console line processing: ANSI stripping, chunk-to-line normalization and
//! player event detection.

pub mod ansi;
pub mod event;
pub mod normalize;

pub use event::{detect, DomainEvent, EventKind};
pub use normalize::LineNormalizer;
