// License: MIT

use chrono::Local;
use tokio::sync::mpsc::Sender;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::core::tracker_msg::TrackerMsg;
use crate::{tinfo, twarn};

/// Emits one `Tick` per `period` until the daemon drops its receiver.
///
/// Sends await channel capacity, so a slow tick holds the timer back instead
/// of piling up a backlog.
pub async fn run_ticker(tx: Sender<TrackerMsg>, period: Duration) {
    tinfo!("Ticker", "ticker started (period={}ms)", period.as_millis());

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // first tick completes immediately
    timer.tick().await;

    loop {
        timer.tick().await;

        if tx.send(TrackerMsg::Tick { now: Local::now() }).await.is_err() {
            twarn!("Ticker", "ticker stopping (receiver dropped)");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn ticks_arrive_in_time_order_and_stop_with_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(run_ticker(tx, Duration::from_millis(10)));

        let mut stamps = Vec::new();
        for _ in 0..3 {
            match rx.recv().await {
                Some(TrackerMsg::Tick { now }) => stamps.push(now),
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker should stop")
            .unwrap();
    }
}
