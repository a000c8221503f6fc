use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::timer::Timer;

/// Manually advanced clock. Clones share the same time, so a test can keep a
/// handle while the state machine owns another.
#[derive(Debug, Clone)]
pub struct VirtualTimer {
    now_ns: Arc<AtomicU64>,
    epoch_ms: u64,
}

impl VirtualTimer {
    /// Starts at monotonic zero, reporting `epoch_ms` as the wall clock.
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            now_ns: Arc::new(AtomicU64::new(0)),
            epoch_ms,
        }
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for VirtualTimer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Timer for VirtualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
    fn wall_clock_ms(&self) -> u64 {
        self.epoch_ms + self.now() / 1_000_000
    }
}
