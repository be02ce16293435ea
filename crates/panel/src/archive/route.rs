//! HTTP handlers for archive inspection. The request body is the raw archive.

use axum::body::Bytes;
use axum::response::Json;

use super::{debug_parse, parse_dependencies, ArchiveReport};

pub async fn dependencies_handler(body: Bytes) -> Json<Vec<String>> {
    Json(parse_dependencies(&body))
}

pub async fn debug_handler(body: Bytes) -> Json<ArchiveReport> {
    Json(debug_parse(&body))
}
