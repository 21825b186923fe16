//! Background scheduling for the quality engine.

pub mod maintenance;

pub use maintenance::{MaintenanceLoop, MaintenanceStats};
