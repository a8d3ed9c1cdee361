// License: MIT

pub mod accumulator;
pub mod error;
pub mod format;
pub mod info;
pub mod tracker_msg;
