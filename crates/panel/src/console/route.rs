//! HTTP handlers for the live console.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::command::send_and_capture;
use crate::console::LinesPage;
use crate::source::SourceStatus;
use crate::state::SharedState;

/// How long a capturing send waits for the server to answer.
const CAPTURE_WAIT: Duration = Duration::from_millis(800);

const UNAVAILABLE_MESSAGE: &str = "server output not available";

#[derive(Debug, Deserialize)]
pub struct LinesQuery {
    /// Kept as text so cursors outside `i64` still clamp.
    since: Option<String>,
}

/// Parse an integer cursor of any size, saturating into `i64`.
///
/// `None` when the text is not an integer at all.
fn parse_cursor(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

pub async fn lines_handler(
    State(state): State<SharedState>,
    Query(query): Query<LinesQuery>,
) -> Result<Json<LinesPage>, (StatusCode, &'static str)> {
    let since = match query.since.as_deref() {
        None | Some("") => 0,
        Some(raw) => parse_cursor(raw).ok_or((StatusCode::BAD_REQUEST, "since must be an integer"))?,
    };
    Ok(Json(state.cursor.read(since)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendRequest {
    cmd: String,
    /// Also return the console lines printed shortly after the command.
    capture: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SendResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Vec<String>>,
}

impl SendResponse {
    fn failed(error: &str) -> Self {
        Self { ok: false, error: Some(error.to_string()), output: None }
    }
}

/// A missing or malformed body counts as an empty command.
pub async fn send_handler(State(state): State<SharedState>, body: Bytes) -> Json<SendResponse> {
    let request: SendRequest = serde_json::from_slice(&body).unwrap_or_default();
    let cmd = request.cmd.trim();
    if cmd.is_empty() {
        return Json(SendResponse::failed("Empty command"));
    }

    info!("Console command via {}: {}", state.commands.mode(), cmd);

    if request.capture {
        return Json(match send_and_capture(state.commands.as_ref(), &state.buffer, cmd, CAPTURE_WAIT).await {
            Some(lines) => SendResponse { ok: true, error: None, output: Some(lines) },
            None => SendResponse::failed("Command could not be delivered"),
        });
    }

    if state.commands.send(cmd).await {
        Json(SendResponse { ok: true, error: None, output: None })
    } else {
        Json(SendResponse::failed("Command could not be delivered"))
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    total: u64,
    command_mode: &'static str,
    sources: Vec<SourceStatus>,
}

pub async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    let available = state.output_available();
    Json(StatusResponse {
        available,
        message: (!available).then_some(UNAVAILABLE_MESSAGE),
        total: state.cursor.head(),
        command_mode: state.commands.mode(),
        sources: state.source_statuses(),
    })
}
