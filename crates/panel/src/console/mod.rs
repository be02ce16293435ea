//! Console module — the shared line buffer and its cursor reader.

pub mod buffer;
pub mod cursor;
pub mod route;

pub use buffer::{LinesPage, LogLine, RingBuffer, DEFAULT_CAPACITY};
pub use cursor::CursorReader;
