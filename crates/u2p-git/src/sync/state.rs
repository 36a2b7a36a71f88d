//! Mirror sync state tracking.

use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Tracks the outcome of mirror syncs for health reporting.
#[derive(Debug)]
pub struct SyncState {
    /// The last successful sync time.
    last_sync: RwLock<Option<Instant>>,
    /// The last error message, if any.
    last_error: RwLock<Option<String>>,
    /// Number of consecutive failures.
    failure_count: RwLock<u32>,
    /// Total successful syncs.
    sync_count: RwLock<u64>,
}

impl SyncState {
    /// Creates a new SyncState.
    pub fn new() -> Self {
        Self {
            last_sync: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
            sync_count: RwLock::new(0),
        }
    }

    /// Returns the duration since the last successful sync.
    pub fn time_since_sync(&self) -> Option<Duration> {
        self.last_sync.read().map(|t| t.elapsed())
    }

    /// Records a successful sync.
    pub fn record_success(&self) {
        let mut last_sync = self.last_sync.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();
        let mut sync_count = self.sync_count.write();

        *last_sync = Some(Instant::now());
        *last_error = None;
        *failure_count = 0;
        *sync_count += 1;
    }

    /// Records a failed sync.
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_error = Some(error.into());
        *failure_count += 1;
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns the number of consecutive failures.
    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    /// Returns the number of successful syncs.
    pub fn sync_count(&self) -> u64 {
        *self.sync_count.read()
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
