//! dst_test - Test Wrapper
//!
//! TigerStyle: Seeds are always logged for reproducibility.
//!
//! Seed resolution order:
//! 1. An explicit seed passed to the wrapper
//! 2. The `DST_SEED` environment variable
//! 3. A fresh random seed, printed so the run can be replayed
//!
//! # Example
//!
//! ```
//! use umi_dst::DstTest;
//!
//! let result = tokio_test::block_on(
//!     DstTest::new()
//!         .seed(7)
//!         .run(|env| async move {
//!             env.storage.write("a", b"1").await?;
//!             env.storage.read("a").await
//!         }),
//! );
//! assert_eq!(result, Ok(Some(b"1".to_vec())));
//! ```

use std::future::Future;

use crate::constants::DST_SEED_ENV_VAR;

use super::config::SimConfig;
use super::simulation::{SimEnvironment, Simulation};

// =============================================================================
// Seed Resolution
// =============================================================================

/// Where a simulation seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    /// Passed by the caller
    Explicit,
    /// Read from `DST_SEED`
    Environment,
    /// Generated at random
    Generated,
}

/// Pick a seed from an explicit value or a raw `DST_SEED` value.
///
/// A blank environment value counts as unset.
///
/// # Panics
/// Panics if `env_value` is non-blank and not a valid `u64`.
#[must_use]
pub fn resolve_seed(explicit: Option<u64>, env_value: Option<&str>) -> (u64, SeedSource) {
    if let Some(seed) = explicit {
        return (seed, SeedSource::Explicit);
    }

    if let Some(raw) = env_value.map(str::trim).filter(|raw| !raw.is_empty()) {
        let seed = raw.parse::<u64>().unwrap_or_else(|e| {
            panic!("{DST_SEED_ENV_VAR} must be a valid u64, got {raw:?}: {e}")
        });
        return (seed, SeedSource::Environment);
    }

    (rand::random::<u64>(), SeedSource::Generated)
}

/// Log the chosen seed the way replay instructions expect.
pub(crate) fn announce_seed(seed: u64, source: SeedSource) {
    match source {
        SeedSource::Explicit => tracing::debug!(seed = seed, "DST: Using explicit seed"),
        SeedSource::Environment => println!("DST: Using seed from environment: {seed}"),
        SeedSource::Generated => {
            println!("DST: Generated random seed (replay with {DST_SEED_ENV_VAR}={seed})");
        }
    }
}

/// Resolve against the process environment and announce the result.
pub(crate) fn seed_from_env_or(explicit: Option<u64>) -> u64 {
    let env_value = match explicit {
        Some(_) => None,
        None => std::env::var(DST_SEED_ENV_VAR).ok(),
    };
    let (seed, source) = resolve_seed(explicit, env_value.as_deref());
    announce_seed(seed, source);
    seed
}

// =============================================================================
// DstTest
// =============================================================================

/// Wraps an async test body in a simulation.
///
/// The fault-probability shorthands register the matching bundle before the
/// body runs.
#[derive(Debug, Clone, Default)]
pub struct DstTest {
    seed: Option<u64>,
    storage_fault_probability: Option<f64>,
    db_fault_probability: Option<f64>,
    network_fault_probability: Option<f64>,
    llm_fault_probability: Option<f64>,
}

impl DstTest {
    /// Options with no explicit seed and no faults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the seed, overriding `DST_SEED`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Register the storage bundle at this probability.
    ///
    /// # Panics
    /// Panics if `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn storage_fault_probability(mut self, probability: f64) -> Self {
        assert_probability(probability);
        self.storage_fault_probability = Some(probability);
        self
    }

    /// Register the database bundle at this probability.
    ///
    /// # Panics
    /// Panics if `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn db_fault_probability(mut self, probability: f64) -> Self {
        assert_probability(probability);
        self.db_fault_probability = Some(probability);
        self
    }

    /// Register the network bundle at this probability.
    ///
    /// # Panics
    /// Panics if `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn network_fault_probability(mut self, probability: f64) -> Self {
        assert_probability(probability);
        self.network_fault_probability = Some(probability);
        self
    }

    /// Register the LLM/API bundle at this probability.
    ///
    /// # Panics
    /// Panics if `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn llm_fault_probability(mut self, probability: f64) -> Self {
        assert_probability(probability);
        self.llm_fault_probability = Some(probability);
        self
    }

    /// Resolve the seed and build the configured simulation.
    #[must_use]
    pub fn simulation(&self) -> Simulation {
        let seed = seed_from_env_or(self.seed);
        let mut sim = Simulation::new(SimConfig::with_seed(seed));

        if let Some(probability) = self.storage_fault_probability {
            sim = sim.with_storage_faults(probability);
        }
        if let Some(probability) = self.db_fault_probability {
            sim = sim.with_db_faults(probability);
        }
        if let Some(probability) = self.network_fault_probability {
            sim = sim.with_network_faults(probability);
        }
        if let Some(probability) = self.llm_fault_probability {
            sim = sim.with_llm_faults(probability);
        }
        sim
    }

    /// Run a body that takes the environment.
    ///
    /// # Errors
    /// Returns whatever error the body returns.
    pub async fn run<F, Fut, T, E>(self, test: F) -> Result<T, E>
    where
        F: FnOnce(SimEnvironment) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.simulation().run(test).await
    }

    /// Run a body that does not take the environment.
    ///
    /// The seed is still resolved and announced, and the simulation scope
    /// still wraps the body.
    ///
    /// # Errors
    /// Returns whatever error the body returns.
    pub async fn run_plain<F, Fut, T, E>(self, test: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.simulation().run(|_env| test()).await
    }
}

/// Run a body under default options: seed from `DST_SEED` or random, no faults.
///
/// # Errors
/// Returns whatever error the body returns.
pub async fn dst_test<F, Fut, T, E>(test: F) -> Result<T, E>
where
    F: FnOnce(SimEnvironment) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    DstTest::new().run(test).await
}

fn assert_probability(probability: f64) {
    assert!(
        (0.0..=1.0).contains(&probability),
        "fault probability must be in [0, 1], got {}",
        probability
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_explicit_seed_wins() {
        assert_eq!(
            resolve_seed(Some(42), Some("7")),
            (42, SeedSource::Explicit)
        );
    }

    #[test]
    fn test_env_seed_used_when_no_explicit() {
        assert_eq!(
            resolve_seed(None, Some(" 12345 ")),
            (12345, SeedSource::Environment)
        );
    }

    #[test]
    fn test_blank_env_counts_as_unset() {
        let (_, source) = resolve_seed(None, Some("   "));
        assert_eq!(source, SeedSource::Generated);
    }

    #[test]
    fn test_generated_when_nothing_set() {
        let (_, source) = resolve_seed(None, None);
        assert_eq!(source, SeedSource::Generated);
    }

    #[test]
    #[should_panic(expected = "DST_SEED must be a valid u64")]
    fn test_invalid_env_seed() {
        let _ = resolve_seed(None, Some("not-a-number"));
    }

    #[test]
    #[should_panic(expected = "fault probability must be in [0, 1]")]
    fn test_invalid_shorthand_probability() {
        let _ = DstTest::new().llm_fault_probability(2.0);
    }

    #[test]
    fn test_shorthands_register_bundles() {
        let sim = DstTest::new()
            .seed(1)
            .storage_fault_probability(0.1)
            .db_fault_probability(0.2)
            .llm_fault_probability(0.3)
            .simulation();

        assert_eq!(sim.config().seed(), 1);
        assert_eq!(sim.fault_configs().len(), 4 + 4 + 5);
        assert!(sim.fault_configs()[..4]
            .iter()
            .all(|config| (config.probability - 0.1).abs() < f64::EPSILON));
    }

    #[tokio::test]
    async fn test_run_injects_environment() {
        let seed = DstTest::new()
            .seed(99)
            .run(|env| async move { Ok::<_, StorageError>(env.seed()) })
            .await
            .unwrap();

        assert_eq!(seed, 99);
    }

    #[tokio::test]
    async fn test_run_plain() {
        let value = DstTest::new()
            .seed(5)
            .run_plain(|| async { Ok::<_, StorageError>(41 + 1) })
            .await
            .unwrap();

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_storage_shorthand_fires() {
        let result = DstTest::new()
            .seed(42)
            .storage_fault_probability(1.0)
            .run(|env| async move { env.storage.write("k", b"v").await })
            .await;

        assert!(matches!(result, Err(StorageError::Write { .. })));
    }
}
