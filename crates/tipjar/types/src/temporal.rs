use serde::{Deserialize, Serialize};

/// Length of a withdrawal block window, in seconds (15 minutes).
pub const BLOCK_PERIOD: u64 = 15 * 60;

/// Minimum spacing between the starts of two block windows on the same key,
/// in seconds (24 hours).
pub const COOLDOWN_PERIOD: u64 = 24 * 60 * 60;

/// Point in time, in whole seconds, as supplied by the execution environment's clock.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn plus(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    pub fn minus(self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t+{}s", self.0)
    }
}
