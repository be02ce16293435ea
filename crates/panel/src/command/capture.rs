use std::time::Duration;

use tokio::time;

use super::CommandSender;
use crate::console::RingBuffer;

/// Send `command` and collect the console lines that arrive within `wait`.
///
/// Returns `None` when the send itself failed. The capture is best effort:
/// lines from unrelated output that lands in the same window are included.
pub async fn send_and_capture(
    sender: &dyn CommandSender,
    buffer: &RingBuffer,
    command: &str,
    wait: Duration,
) -> Option<Vec<String>> {
    let before = buffer.next_sequence();
    if !sender.send(command).await {
        return None;
    }
    time::sleep(wait).await;
    Some(buffer.lines_since(before as i64).lines)
}
