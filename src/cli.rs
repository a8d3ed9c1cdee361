// License: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "activity-tracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tracks today's active (non-idle) time"
)]
pub struct Args {
    /// Use FILE instead of ~/.config/activity_tracker/active_time
    #[arg(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    /// Emit waybar-style JSON status lines instead of plain labels
    #[arg(long, action)]
    pub json: bool,

    /// Do not write status lines to stdout
    #[arg(long, action)]
    pub no_status: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Show today's active time from the running tracker")]
    Info {
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Save the current total and stop the running tracker")]
    Stop,
}
