use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::source::SourceStatus;
use crate::state::SharedState;

/// Reduce source statuses to an overall status and a human-readable reason.
///
/// The panel itself stays up while the game server is down, so a source that
/// is not live degrades the status instead of failing the check.
fn evaluate_health(sources: &[SourceStatus]) -> (&'static str, String) {
    if sources.is_empty() {
        return ("healthy", "No log sources configured".to_string());
    }
    if let Some(live) = sources.iter().find(|s| s.state.is_live()) {
        return ("healthy", format!("Receiving output from the {} source", live.name));
    }
    let failures = sources.iter().map(|s| s.consecutive_failures).max().unwrap_or(0);
    ("degraded", format!("No source is delivering output ({} consecutive failures)", failures))
}

pub async fn health_handler(State(state): State<SharedState>) -> Json<Value> {
    let sources = state.source_statuses();
    let (status, message) = evaluate_health(&sources);
    Json(json!({
        "status": status,
        "message": message,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "buffered_lines": state.buffer.len(),
        "sources": sources,
    }))
}
