// crates/bondline-core/src/clock.rs
//
// Ledger clock of the host environment.
//
// Timelock readiness is measured against this clock, never wall-clock time.
// The clock only moves forward, and only when the host advances it.

use serde::{Deserialize, Serialize};

/// Monotonic ledger timestamp in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerClock {
    now: u64,
}

impl LedgerClock {
    /// Create a clock starting at the given timestamp.
    pub fn starting_at(now: u64) -> Self {
        Self { now }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance the clock by `seconds`, saturating at `u64::MAX`.
    pub fn advance(&mut self, seconds: u64) -> u64 {
        self.now = self.now.saturating_add(seconds);
        self.now
    }

    /// Move the clock to `timestamp` if that is in the future.
    pub fn advance_to(&mut self, timestamp: u64) -> u64 {
        self.now = self.now.max(timestamp);
        self.now
    }
}
