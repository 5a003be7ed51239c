//! Application Layer
//!
//! The reconciliation engine and the poll loop that drives it.

pub mod tracker;
pub mod monitor;
pub mod report;

pub use tracker::{BoostTracker, RefreshReport};
pub use monitor::{
    BoostMonitor, MonitorError, MonitorHandle, MonitorStatus, RefreshCountdown, TickOutcome,
    DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_PERIOD,
};
pub use report::{format_report, rank_by_peak, RankedToken};
