//! Property Testing - Random Operation Sequences Across Seeds
//!
//! TigerStyle: Generate, apply, check invariants, repeat. Any failure is
//! reported with the seed and operation index that reproduce it.

use std::fmt::Debug;

use crate::constants::{DST_TIME_ADVANCE_MS_MAX, PROPERTY_OPERATIONS_COUNT_DEFAULT};

use super::clock::SimClock;
use super::config::SimConfig;
use super::rng::DeterministicRng;

/// A system that can be driven by generated operations.
pub trait PropertyTestable {
    /// One step applied to the system
    type Operation: Debug;

    /// Pick the next operation.
    fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation;

    /// Apply an operation at the clock's current time.
    fn apply_operation(&mut self, operation: &Self::Operation, clock: &SimClock);

    /// Check every invariant; `Err` describes the first violation.
    ///
    /// # Errors
    /// Returns a description of the violated invariant.
    fn check_invariants(&self) -> Result<(), String>;
}

/// How simulated time moves between operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAdvanceConfig {
    /// Smallest step
    pub min_ms: u64,
    /// Largest step
    pub max_ms: u64,
    /// Chance of advancing before each operation
    pub probability: f64,
}

impl TimeAdvanceConfig {
    /// Create a time-advance policy.
    ///
    /// # Panics
    /// Panics if `min_ms > max_ms`, `max_ms` exceeds the clock's step limit,
    /// or `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64, probability: f64) -> Self {
        assert!(min_ms <= max_ms, "min_ms ({}) > max_ms ({})", min_ms, max_ms);
        assert!(
            max_ms <= DST_TIME_ADVANCE_MS_MAX,
            "max_ms ({}) exceeds clock step max ({})",
            max_ms,
            DST_TIME_ADVANCE_MS_MAX
        );
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1], got {}",
            probability
        );
        Self {
            min_ms,
            max_ms,
            probability,
        }
    }
}

impl Default for TimeAdvanceConfig {
    fn default() -> Self {
        Self::new(1, 100, 0.5)
    }
}

/// First invariant violation of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTestFailure {
    /// Seed that reproduces the failure
    pub seed: u64,
    /// Operations applied before the check failed (0 = initial state)
    pub operation_index: u64,
    /// Debug rendering of the last applied operation
    pub operation: Option<String>,
    /// Invariant message
    pub message: String,
}

impl std::fmt::Display for PropertyTestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invariant violated after {} operations (DST_SEED={}): {}",
            self.operation_index, self.seed, self.message
        )?;
        if let Some(operation) = &self.operation {
            write!(f, " [last operation: {}]", operation)?;
        }
        Ok(())
    }
}

/// Outcome of one seeded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTestResult {
    /// Seed of the run
    pub seed: u64,
    /// Operations applied
    pub operations_count: u64,
    /// Simulated time covered
    pub elapsed_ms: u64,
    /// First failure, if any
    pub failure: Option<PropertyTestFailure>,
}

impl PropertyTestResult {
    /// True when every invariant held.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// One seeded property run.
#[derive(Debug, Clone)]
pub struct PropertyTest {
    seed: u64,
    max_operations: u64,
    time_advance: Option<TimeAdvanceConfig>,
}

impl PropertyTest {
    /// Run with default operation count and no time movement.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_operations: PROPERTY_OPERATIONS_COUNT_DEFAULT,
            time_advance: None,
        }
    }

    /// Take seed and operation ceiling from a simulation config.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.seed()).with_max_operations(config.steps_max())
    }

    /// Set the number of operations.
    ///
    /// # Panics
    /// Panics if `max_operations` is zero.
    #[must_use]
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        assert!(max_operations > 0, "max_operations must be positive");
        self.max_operations = max_operations;
        self
    }

    /// Advance simulated time between operations.
    #[must_use]
    pub fn with_time_advance(mut self, time_advance: TimeAdvanceConfig) -> Self {
        self.time_advance = Some(time_advance);
        self
    }

    /// Drive `system` until `max_operations` or the first violation.
    pub fn run<T: PropertyTestable>(&self, mut system: T) -> PropertyTestResult {
        let mut root = DeterministicRng::new(self.seed);
        let mut operation_rng = root.fork();
        let mut time_rng = root.fork();
        let clock = SimClock::new();

        if let Err(message) = system.check_invariants() {
            return self.failed(0, None, message, &clock);
        }

        for index in 0..self.max_operations {
            if let Some(time_advance) = &self.time_advance {
                if time_rng.next_bool(time_advance.probability) {
                    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
                    let delta_ms = time_rng
                        .next_int(time_advance.min_ms as i64, time_advance.max_ms as i64)
                        as u64;
                    clock.advance_ms(delta_ms);
                }
            }

            let operation = system.generate_operation(&mut operation_rng);
            system.apply_operation(&operation, &clock);

            if let Err(message) = system.check_invariants() {
                return self.failed(index + 1, Some(format!("{operation:?}")), message, &clock);
            }
        }

        PropertyTestResult {
            seed: self.seed,
            operations_count: self.max_operations,
            elapsed_ms: clock.now_ms(),
            failure: None,
        }
    }

    fn failed(
        &self,
        operation_index: u64,
        operation: Option<String>,
        message: String,
        clock: &SimClock,
    ) -> PropertyTestResult {
        let failure = PropertyTestFailure {
            seed: self.seed,
            operation_index,
            operation,
            message,
        };
        tracing::warn!(seed = self.seed, "{}", failure);

        PropertyTestResult {
            seed: self.seed,
            operations_count: operation_index,
            elapsed_ms: clock.now_ms(),
            failure: Some(failure),
        }
    }
}

/// Deterministic list of `count` seeds derived from `base_seed`.
#[must_use]
pub fn test_seeds(count: usize, base_seed: u64) -> Vec<u64> {
    let mut rng = DeterministicRng::new(base_seed);
    (0..count).map(|_| rng.next_u64()).collect()
}

/// Run a fresh system per seed and collect every result.
pub fn run_property_tests<T, F>(
    seeds: &[u64],
    max_operations: u64,
    mut factory: F,
) -> Vec<PropertyTestResult>
where
    T: PropertyTestable,
    F: FnMut(u64) -> T,
{
    seeds
        .iter()
        .map(|&seed| {
            PropertyTest::new(seed)
                .with_max_operations(max_operations)
                .run(factory(seed))
        })
        .collect()
}
