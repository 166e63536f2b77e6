//! SimClock - Simulated Time
//!
//! TigerStyle: Deterministic, controllable time for simulation.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::constants::{DST_EPOCH_MS_DEFAULT, DST_TIME_ADVANCE_MS_MAX, TIME_MS_PER_SEC};

/// A simulated clock for deterministic testing.
///
/// TigerStyle:
/// - Time only moves forward
/// - All time operations are explicit and bounded
/// - No reliance on system time
///
/// Clones share the same timeline, so storage and test code always agree on
/// "now". The handle is single-threaded (`!Send`).
#[derive(Debug, Clone)]
pub struct SimClock {
    current_ms: Rc<Cell<u64>>,
    advances_count: Rc<Cell<u64>>,
    advance_ms_max: u64,
}

impl SimClock {
    /// Create a new clock starting at the default epoch.
    ///
    /// # Example
    /// ```
    /// use umi_dst::SimClock;
    /// let clock = SimClock::new();
    /// assert_eq!(clock.now_ms(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(DST_EPOCH_MS_DEFAULT)
    }

    /// Create a clock starting at the given time.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            current_ms: Rc::new(Cell::new(start_ms)),
            advances_count: Rc::new(Cell::new(0)),
            advance_ms_max: DST_TIME_ADVANCE_MS_MAX,
        }
    }

    /// Set the largest step a single `advance_ms` may take.
    ///
    /// # Panics
    /// Panics if `advance_ms_max` is zero.
    #[must_use]
    pub fn with_advance_ms_max(mut self, advance_ms_max: u64) -> Self {
        assert!(advance_ms_max > 0, "advance_ms_max must be positive");
        self.advance_ms_max = advance_ms_max;
        self
    }

    /// Get current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }

    /// Get current time in seconds (truncated).
    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.now_ms() / TIME_MS_PER_SEC
    }

    /// Current logical time as a UTC datetime.
    ///
    /// Times beyond chrono's range saturate to its maximum.
    #[must_use]
    pub fn now_datetime(&self) -> DateTime<Utc> {
        i64::try_from(self.now_ms())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Number of successful `advance_ms` calls.
    #[must_use]
    pub fn advances_count(&self) -> u64 {
        self.advances_count.get()
    }

    /// Largest step a single `advance_ms` may take.
    #[must_use]
    pub fn advance_ms_max(&self) -> u64 {
        self.advance_ms_max
    }

    /// Advance time by the given milliseconds.
    ///
    /// # Panics
    /// Panics if `ms` exceeds the configured maximum step.
    ///
    /// # Returns
    /// The new current time.
    pub fn advance_ms(&self, ms: u64) -> u64 {
        // Preconditions
        assert!(
            ms <= self.advance_ms_max,
            "advance_ms({}) exceeds max ({})",
            ms,
            self.advance_ms_max
        );

        let old_time = self.current_ms.get();
        let new_time = old_time.saturating_add(ms);
        self.current_ms.set(new_time);
        self.advances_count.set(self.advances_count.get() + 1);

        // Postcondition
        assert!(new_time >= old_time, "time must not go backwards");

        new_time
    }

    /// Advance time by the given seconds.
    ///
    /// # Panics
    /// Panics if `secs` is negative or the step exceeds the maximum.
    pub fn advance_secs(&self, secs: f64) -> u64 {
        // Precondition
        assert!(secs >= 0.0, "secs must be non-negative, got {}", secs);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms = (secs * TIME_MS_PER_SEC as f64) as u64;
        self.advance_ms(ms)
    }

    /// Set time to an absolute value. Intended for test setup.
    ///
    /// # Panics
    /// Panics if new time is less than current time.
    pub fn set_ms(&self, ms: u64) {
        // Precondition
        assert!(
            ms >= self.current_ms.get(),
            "cannot set time backwards: {} < {}",
            ms,
            self.current_ms.get()
        );

        self.current_ms.set(ms);

        // Postcondition
        assert_eq!(self.current_ms.get(), ms, "time must be set correctly");
    }

    /// Get elapsed time since a given timestamp.
    ///
    /// # Panics
    /// Panics if since is in the future.
    #[must_use]
    pub fn elapsed_since(&self, since: u64) -> u64 {
        let now = self.current_ms.get();

        // Precondition
        assert!(
            since <= now,
            "elapsed_since({}) is in the future (now={})",
            since,
            now
        );

        now - since
    }

    /// Check if a given duration has elapsed since a timestamp.
    #[must_use]
    pub fn has_elapsed(&self, since: u64, duration_ms: u64) -> bool {
        self.elapsed_since(since) >= duration_ms
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
