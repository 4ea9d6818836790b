use std::sync::atomic::{AtomicU64, Ordering};

use tipjar_types::Timestamp;

/// Source of the current time. Block windows and cooldowns compare against it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock in whole seconds since the Unix epoch.
///
/// Never goes backwards: a wall-clock step back is answered with the latest
/// value already handed out.
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = chrono::Utc::now().timestamp().max(0) as u64;
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        Timestamp(previous.max(wall))
    }
}

/// Manually driven clock for tests and simulations.
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start.0),
        }
    }

    pub fn set(&self, at: Timestamp) {
        self.now.store(at.0, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = self.now.fetch_add(secs, Ordering::SeqCst);
        Timestamp(previous.saturating_add(secs))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }
}
