use tokio::sync::mpsc;

use super::handlers::{info, stop};
use crate::core::tracker_msg::TrackerMsg;
use crate::twarn;

/// Routes an incoming command line to its handler.
pub async fn route_command(cmd: &str, tx: &mpsc::Sender<TrackerMsg>) -> String {
    match cmd {
        "info" => info::handle_info(tx, false).await,
        "info --json" => info::handle_info(tx, true).await,
        "stop" => stop::handle_stop(tx).await,
        other => {
            twarn!("Ipc", "unknown IPC command: {}", other);
            format!("ERROR: unknown command '{other}'")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::info::InfoSnapshot;

    fn snapshot() -> InfoSnapshot {
        InfoSnapshot {
            text: "1h 2m".to_string(),
            tooltip: "Activity Tracker".to_string(),
            class: "active-time".to_string(),
            total_seconds: 3720,
            last_reset: "2025-06-10T08:00:00+00:00".to_string(),
            idle_threshold_seconds: 60,
            sensor: "x11".to_string(),
        }
    }

    fn fake_daemon() -> mpsc::Sender<TrackerMsg> {
        let (tx, mut rx) = mpsc::channel(4);
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    TrackerMsg::GetInfo { reply } => {
                        let _ = reply.send(snapshot());
                    }
                    TrackerMsg::Stop { reply } => {
                        let _ = reply.send("Stopping activity tracker".to_string());
                    }
                    TrackerMsg::Tick { .. } => {}
                }
            }
        });
        tx
    }

    #[tokio::test]
    async fn info_text_and_json() {
        let tx = fake_daemon();

        let text = route_command("info", &tx).await;
        assert!(text.starts_with("Active today:   1h 2m"));
        assert!(text.contains("Idle sensor:    x11"));

        let json: serde_json::Value =
            serde_json::from_str(&route_command("info --json", &tx).await).unwrap();
        assert_eq!(json["text"], "1h 2m");
        assert_eq!(json["total_seconds"], 3720);
    }

    #[tokio::test]
    async fn stop_is_acknowledged() {
        let tx = fake_daemon();
        assert_eq!(route_command("stop", &tx).await, "Stopping activity tracker");
    }

    #[tokio::test]
    async fn unknown_command_is_an_error() {
        let tx = fake_daemon();
        assert_eq!(route_command("reset", &tx).await, "ERROR: unknown command 'reset'");
    }

    #[tokio::test]
    async fn closed_daemon_reports_not_running() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        assert_eq!(route_command("stop", &tx).await, "Activity tracker not running");
        assert_eq!(
            route_command("info --json", &tx).await,
            InfoSnapshot::not_running_json()
        );
    }
}
