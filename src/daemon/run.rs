// License: MIT

use tokio::sync::{mpsc, watch};

use crate::core::tracker_msg::TrackerMsg;
use crate::tinfo;

use super::{AnyError, Daemon};

impl Daemon {
    /// Serves ticks and IPC requests until quit, then flushes once.
    ///
    /// Shutdown is polled first on every iteration, so ticks still queued
    /// when quit arrives are never applied.
    pub async fn run(
        &mut self,
        mut rx: mpsc::Receiver<TrackerMsg>,
        mut shutdown: watch::Receiver<bool>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Result<(), AnyError> {
        tinfo!("Daemon", "daemon starting");

        loop {
            if *shutdown.borrow() {
                tinfo!("Daemon", "daemon stopping (shutdown requested)");
                break;
            }

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tinfo!("Daemon", "daemon stopping (shutdown channel closed)");
                        break;
                    }
                }

                maybe = rx.recv() => {
                    let Some(msg) = maybe else {
                        tinfo!("Daemon", "daemon stopping (event channel closed)");
                        break;
                    };

                    match msg {
                        TrackerMsg::Tick { now } => {
                            self.handle_tick(now).await;
                        }

                        TrackerMsg::GetInfo { reply } => {
                            let _ = reply.send(self.snapshot());
                        }

                        TrackerMsg::Stop { reply } => {
                            tinfo!("Daemon", "daemon stopping (quit requested)");
                            let _ = reply.send("Stopping activity tracker".to_string());
                            let _ = shutdown_tx.send(true);
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown();
        Ok(())
    }
}
