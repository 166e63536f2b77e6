//! SimConfig - Simulation Configuration
//!
//! TigerStyle: Validated on construction, immutable afterwards.

use crate::constants::{
    DST_EPOCH_MS_DEFAULT, DST_NETWORK_LATENCY_MS_MAX_DEFAULT, DST_NETWORK_LATENCY_MS_MIN_DEFAULT,
    DST_SEED_ENV_VAR, DST_STEPS_MAX_DEFAULT, DST_STORAGE_LATENCY_MS_MAX_DEFAULT,
    DST_STORAGE_LATENCY_MS_MIN_DEFAULT, DST_TIME_ADVANCE_MS_MAX,
};

use super::harness::{announce_seed, resolve_seed};

/// Configuration for one simulation run.
///
/// Every `with_*` method checks its invariant before returning, so a
/// `SimConfig` that exists is always valid. Fields are read through getters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    seed: u64,
    steps_max: u64,
    start_time_ms: u64,
    time_advance_ms_max: u64,
    network_latency_ms_min: u64,
    network_latency_ms_max: u64,
    storage_latency_ms_min: u64,
    storage_latency_ms_max: u64,
}

impl SimConfig {
    /// Create a configuration with an explicit seed and default bounds.
    ///
    /// # Example
    /// ```
    /// use umi_dst::SimConfig;
    ///
    /// let config = SimConfig::with_seed(42).with_steps_max(500);
    /// assert_eq!(config.seed(), 42);
    /// assert_eq!(config.steps_max(), 500);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            steps_max: DST_STEPS_MAX_DEFAULT,
            start_time_ms: DST_EPOCH_MS_DEFAULT,
            time_advance_ms_max: DST_TIME_ADVANCE_MS_MAX,
            network_latency_ms_min: DST_NETWORK_LATENCY_MS_MIN_DEFAULT,
            network_latency_ms_max: DST_NETWORK_LATENCY_MS_MAX_DEFAULT,
            storage_latency_ms_min: DST_STORAGE_LATENCY_MS_MIN_DEFAULT,
            storage_latency_ms_max: DST_STORAGE_LATENCY_MS_MAX_DEFAULT,
        }
    }

    /// Seed from `DST_SEED`, or a freshly generated one.
    ///
    /// The chosen seed is always printed so a failing run can be replayed.
    ///
    /// # Panics
    /// Panics if `DST_SEED` is set but is not a valid `u64`.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let env_value = std::env::var(DST_SEED_ENV_VAR).ok();
        let (seed, source) = resolve_seed(None, env_value.as_deref());
        announce_seed(seed, source);
        Self::with_seed(seed)
    }

    /// Set the loop-step ceiling test bodies should respect.
    ///
    /// # Panics
    /// Panics if `steps_max` is zero.
    #[must_use]
    pub fn with_steps_max(mut self, steps_max: u64) -> Self {
        assert!(steps_max > 0, "steps_max must be positive");
        self.steps_max = steps_max;
        self
    }

    /// Set the clock's start time.
    #[must_use]
    pub fn with_start_time_ms(mut self, start_time_ms: u64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }

    /// Set the largest single clock step.
    ///
    /// # Panics
    /// Panics if `time_advance_ms_max` is zero.
    #[must_use]
    pub fn with_time_advance_ms_max(mut self, time_advance_ms_max: u64) -> Self {
        assert!(time_advance_ms_max > 0, "time_advance_ms_max must be positive");
        self.time_advance_ms_max = time_advance_ms_max;
        self
    }

    /// Set the simulated network latency range.
    ///
    /// # Panics
    /// Panics if `min_ms > max_ms`.
    #[must_use]
    pub fn with_network_latency_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        assert!(
            min_ms <= max_ms,
            "network latency min ({}) > max ({})",
            min_ms,
            max_ms
        );
        self.network_latency_ms_min = min_ms;
        self.network_latency_ms_max = max_ms;
        self
    }

    /// Set the simulated storage latency range.
    ///
    /// The range is clamped to `time_advance_ms_max` when the simulation is
    /// built, since each injected delay is one clock step.
    ///
    /// # Panics
    /// Panics if `min_ms > max_ms`.
    #[must_use]
    pub fn with_storage_latency_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        assert!(
            min_ms <= max_ms,
            "storage latency min ({}) > max ({})",
            min_ms,
            max_ms
        );
        self.storage_latency_ms_min = min_ms;
        self.storage_latency_ms_max = max_ms;
        self
    }

    /// Root seed of the run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Loop-step ceiling. Not enforced by the framework.
    #[must_use]
    pub fn steps_max(&self) -> u64 {
        self.steps_max
    }

    /// Clock start time.
    #[must_use]
    pub fn start_time_ms(&self) -> u64 {
        self.start_time_ms
    }

    /// Largest single clock step.
    #[must_use]
    pub fn time_advance_ms_max(&self) -> u64 {
        self.time_advance_ms_max
    }

    /// Network latency range as `(min, max)`.
    #[must_use]
    pub fn network_latency_ms(&self) -> (u64, u64) {
        (self.network_latency_ms_min, self.network_latency_ms_max)
    }

    /// Storage latency range as `(min, max)`.
    #[must_use]
    pub fn storage_latency_ms(&self) -> (u64, u64) {
        (self.storage_latency_ms_min, self.storage_latency_ms_max)
    }
}
