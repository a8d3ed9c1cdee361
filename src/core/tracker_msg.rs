// License: MIT

use chrono::{DateTime, Local};
use tokio::sync::oneshot;

use crate::core::info::InfoSnapshot;

/// Everything the daemon loop reacts to, in arrival order.
#[derive(Debug)]
pub enum TrackerMsg {
    /// Timer tick stamped with the wall clock at emission.
    Tick { now: DateTime<Local> },

    GetInfo { reply: oneshot::Sender<InfoSnapshot> },

    /// Quit command: flush and stop.
    Stop { reply: oneshot::Sender<String> },
}
