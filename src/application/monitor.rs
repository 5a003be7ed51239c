//! Boost Monitor
//!
//! Poll loop: fetch the feed, reconcile, and every N ticks refresh valuations
//! and write a snapshot. The first tick always refreshes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::RwLock;

use super::tracker::{BoostTracker, RefreshReport};
use crate::domain::{elapsed_string, SnapshotError, SnapshotWriter};
use crate::ports::BoostFeed;

/// Default sleep between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of ticks between refreshes
pub const DEFAULT_REFRESH_PERIOD: u32 = 20;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Fires on the first tick and then once every `period` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshCountdown {
    period: u32,
    remaining: u32,
}

impl RefreshCountdown {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            remaining: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ticks left before the next refresh
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one tick. Returns true when a refresh is due.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            self.remaining = self.period - 1;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Tokens received from the feed
    pub feed_size: usize,
    /// Whether reconciliation created or appended to any record
    pub changed: bool,
    /// Present when this tick ran the refresh pass
    pub refresh: Option<RefreshReport>,
    /// Snapshot written this tick
    pub snapshot: Option<PathBuf>,
}

/// Status snapshot of the monitor
#[derive(Debug, Clone)]
pub struct MonitorStatus {
    pub is_running: bool,
    pub ticks: u64,
    pub tracked: usize,
    pub excluded: usize,
    pub snapshots_written: u64,
    pub elapsed: Duration,
    pub run_dir: PathBuf,
}

/// Cloneable stop switch for a running monitor
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    is_running: Arc<RwLock<bool>>,
}

impl MonitorHandle {
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        tracing::info!("Stop signal sent to monitor");
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

/// Drives the tracker on a fixed interval
pub struct BoostMonitor {
    feed: Arc<dyn BoostFeed>,
    tracker: BoostTracker,
    writer: SnapshotWriter,
    countdown: RefreshCountdown,
    poll_interval: Duration,
    is_running: Arc<RwLock<bool>>,
    started: Instant,
    ticks: u64,
}

impl BoostMonitor {
    pub fn new(feed: Arc<dyn BoostFeed>, tracker: BoostTracker, writer: SnapshotWriter) -> Self {
        Self {
            feed,
            tracker,
            writer,
            countdown: RefreshCountdown::new(DEFAULT_REFRESH_PERIOD),
            poll_interval: DEFAULT_POLL_INTERVAL,
            is_running: Arc::new(RwLock::new(false)),
            started: Instant::now(),
            ticks: 0,
        }
    }

    /// Set the sleep between ticks
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set how many ticks pass between refreshes
    pub fn with_refresh_period(mut self, period: u32) -> Self {
        self.countdown = RefreshCountdown::new(period);
        self
    }

    pub fn tracker(&self) -> &BoostTracker {
        &self.tracker
    }

    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            is_running: Arc::clone(&self.is_running),
        }
    }

    /// Run until stopped, then write a final snapshot
    pub async fn run(&mut self) -> Result<(), MonitorError> {
        *self.is_running.write().await = true;
        self.started = Instant::now();

        tracing::info!(
            "Boost monitor started (poll {:?}, refresh every {} ticks, {:?} mode)",
            self.poll_interval,
            self.countdown.period(),
            self.tracker.mode()
        );

        while *self.is_running.read().await {
            if let Err(e) = self.tick().await {
                tracing::error!("Tick error: {}", e);
            }

            if !*self.is_running.read().await {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        let path = self.snapshot()?;
        tracing::info!(
            "Boost monitor stopped after {} ticks ({}), final snapshot {}",
            self.ticks,
            elapsed_string(self.started.elapsed()),
            path.display()
        );
        Ok(())
    }

    /// One poll cycle
    pub async fn tick(&mut self) -> Result<TickOutcome, MonitorError> {
        self.ticks += 1;
        self.tracker.clear_cycle_cache();

        let tokens = match self.feed.fetch_boosted().await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!("Boost feed unavailable: {}", e);
                Vec::new()
            }
        };

        let mut outcome = TickOutcome {
            feed_size: tokens.len(),
            changed: self.tracker.reconcile(&tokens).await,
            ..Default::default()
        };

        if self.countdown.tick() {
            outcome.refresh = Some(self.tracker.refresh_valuations().await);
            outcome.snapshot = Some(self.snapshot()?);
        }

        tracing::info!(
            "Time elapsed: {} | tick {} | tracked {} | excluded {} | next refresh in {}",
            elapsed_string(self.started.elapsed()),
            self.ticks,
            self.tracker.ledger().len(),
            self.tracker.exclusion().len(),
            self.countdown.remaining()
        );

        Ok(outcome)
    }

    fn snapshot(&mut self) -> Result<PathBuf, MonitorError> {
        let records = self.tracker.ledger().sorted_records();
        Ok(self.writer.write(&records)?)
    }

    /// Stop the loop after the current tick
    pub async fn stop(&self) {
        self.handle().stop().await;
    }

    pub async fn status(&self) -> MonitorStatus {
        MonitorStatus {
            is_running: *self.is_running.read().await,
            ticks: self.ticks,
            tracked: self.tracker.ledger().len(),
            excluded: self.tracker.exclusion().len(),
            snapshots_written: self.writer.written(),
            elapsed: self.started.elapsed(),
            run_dir: self.writer.run_dir().to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoostedToken, ExclusionSet, TokenLedger};
    use crate::ports::mocks::{MockBoostFeed, MockHolderSource, MockPriceOracle, MockValuationSource};
    use crate::ports::MarketDataError;
    use tempfile::TempDir;

    fn create_test_monitor(
        feed: MockBoostFeed,
        valuations: MockValuationSource,
        dir: &TempDir,
    ) -> BoostMonitor {
        let tracker = BoostTracker::new(
            Arc::new(valuations),
            Arc::new(MockHolderSource::default()),
            Arc::new(MockPriceOracle::new()),
            TokenLedger::default(),
            ExclusionSet::default(),
        );
        BoostMonitor::new(Arc::new(feed), tracker, SnapshotWriter::in_dir(dir.path()))
            .with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn test_countdown_fires_first_then_every_period() {
        let mut countdown = RefreshCountdown::new(20);
        let fired: Vec<usize> = (1..=45).filter(|_| countdown.tick()).collect();
        assert_eq!(fired, vec![1, 21, 41]);
    }

    #[test]
    fn test_countdown_period_one_fires_every_tick() {
        let mut countdown = RefreshCountdown::new(1);
        assert!((0..5).all(|_| countdown.tick()));
    }

    #[test]
    fn test_countdown_zero_period_clamped() {
        assert_eq!(RefreshCountdown::new(0).period(), 1);
    }

    #[tokio::test]
    async fn test_first_tick_refreshes_and_snapshots() {
        let dir = TempDir::new().unwrap();
        let feed = MockBoostFeed::new().with_batch(vec![BoostedToken::new("A", "u", 10.0)]);
        let valuations = MockValuationSource::new();
        valuations.set_market_cap("A", 500_000.0);
        let mut monitor = create_test_monitor(feed, valuations, &dir);

        let outcome = monitor.tick().await.unwrap();
        assert_eq!(outcome.feed_size, 1);
        assert!(outcome.changed);
        assert!(outcome.refresh.is_some());
        assert_eq!(outcome.snapshot.unwrap(), dir.path().join("1.json"));

        let second = monitor.tick().await.unwrap();
        assert!(second.refresh.is_none());
        assert!(second.snapshot.is_none());
    }

    #[tokio::test]
    async fn test_feed_error_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let feed = MockBoostFeed::new();
        feed.push_error(MarketDataError::RestError("503".to_string()));
        let mut monitor = create_test_monitor(feed, MockValuationSource::new(), &dir);

        let outcome = monitor.tick().await.unwrap();
        assert_eq!(outcome.feed_size, 0);
        assert!(!outcome.changed);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let tracker = BoostTracker::new(
            Arc::new(MockValuationSource::new()),
            Arc::new(MockHolderSource::default()),
            Arc::new(MockPriceOracle::new()),
            TokenLedger::default(),
            ExclusionSet::default(),
        );
        let writer = SnapshotWriter::in_dir(dir.path().join("missing"));
        let mut monitor = BoostMonitor::new(Arc::new(MockBoostFeed::new()), tracker, writer);

        assert!(matches!(monitor.tick().await, Err(MonitorError::Snapshot(_))));
        // next tick proceeds normally
        assert!(monitor.tick().await.is_ok());
    }

    #[tokio::test]
    async fn test_status() {
        let dir = TempDir::new().unwrap();
        let monitor = create_test_monitor(MockBoostFeed::new(), MockValuationSource::new(), &dir);

        let status = monitor.status().await;
        assert!(!status.is_running);
        assert_eq!(status.ticks, 0);
        assert_eq!(status.tracked, 0);
        assert_eq!(status.snapshots_written, 0);
        assert_eq!(status.run_dir, dir.path());
    }

    #[tokio::test]
    async fn test_stop_ends_run_with_final_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut monitor = create_test_monitor(MockBoostFeed::new(), MockValuationSource::new(), &dir);
        let handle = monitor.handle();

        let stopper = tokio::spawn(async move {
            while !handle.is_running().await {
                tokio::task::yield_now().await;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.stop().await;
        });

        tokio::time::timeout(Duration::from_secs(5), monitor.run())
            .await
            .expect("monitor did not stop")
            .unwrap();
        stopper.await.unwrap();

        let status = monitor.status().await;
        assert!(!status.is_running);
        assert!(status.ticks >= 1);
        // first-tick snapshot plus the final one
        assert!(status.snapshots_written >= 2);
        assert!(dir.path().join("2.json").exists());
    }
}
