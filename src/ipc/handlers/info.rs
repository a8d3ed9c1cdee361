use tokio::sync::{mpsc, oneshot};

use crate::core::info::InfoSnapshot;
use crate::core::tracker_msg::TrackerMsg;

/// Handle `activity-tracker info [--json]`.
pub async fn handle_info(tx: &mpsc::Sender<TrackerMsg>, as_json: bool) -> String {
    let (reply_tx, reply_rx) = oneshot::channel();

    let snapshot = match tx.send(TrackerMsg::GetInfo { reply: reply_tx }).await {
        Ok(()) => reply_rx.await.ok(),
        Err(_) => None,
    };

    match (snapshot, as_json) {
        (Some(snap), true) => serde_json::to_string(&snap)
            .unwrap_or_else(|_| InfoSnapshot::not_running_json().to_string()),
        (Some(snap), false) => snap.pretty_text(),
        (None, true) => InfoSnapshot::not_running_json().to_string(),
        (None, false) => "Activity tracker not running".to_string(),
    }
}
