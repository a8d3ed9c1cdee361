// License: MIT

use tokio::sync::{mpsc, oneshot};

use crate::core::tracker_msg::TrackerMsg;

/// Handle `activity-tracker stop`.
///
/// The daemon acknowledges, then writes its final total and exits.
pub async fn handle_stop(tx: &mpsc::Sender<TrackerMsg>) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    if tx.send(TrackerMsg::Stop { reply: reply_tx }).await.is_err() {
        return "Activity tracker not running".to_string();
    }

    match reply_rx.await {
        Ok(msg) => {
            let out = msg.trim_end();
            if out.is_empty() {
                "Stopping activity tracker".to_string()
            } else {
                out.to_string()
            }
        }
        Err(_) => "ERROR: No response from daemon".to_string(),
    }
}
