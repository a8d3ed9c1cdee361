pub mod idle;
pub mod store;
pub mod ticker;
pub mod tray;
