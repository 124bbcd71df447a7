//! Light Alarm Module
//!
//! Watches the ambient light sensors for a bounded time and sounds an
//! alert when the configured threshold is crossed.

mod monitor;

pub use monitor::{AlarmMonitor, MonitorError};
