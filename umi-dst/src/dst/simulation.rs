//! Simulation - Orchestration of a DST Run
//!
//! TigerStyle: One seed in, one fully reproducible environment out.
//!
//! # Seed flow
//!
//! ```text
//! seed ──► root rng ──fork #1──► FaultInjector
//!              │    └─fork #2──► SimStorage (corruption, latency)
//!              └──────────────► env.rng (test code)
//! ```
//!
//! Each subsystem owns its own stream, so adding a fault rule never changes
//! which bit storage corrupts, and drawing from `env.rng` never changes
//! fault decisions.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use super::clock::SimClock;
use super::config::SimConfig;
use super::fault::{
    db_faults, llm_faults, network_faults, storage_faults, FaultConfig, FaultInjector,
};
use super::harness::seed_from_env_or;
use super::rng::DeterministicRng;
use super::storage::SimStorage;

// =============================================================================
// Simulation
// =============================================================================

/// Builder for a simulation run.
///
/// # Example
/// ```
/// use umi_dst::{FaultConfig, FaultType, SimConfig, Simulation, StorageError};
///
/// let sim = Simulation::new(SimConfig::with_seed(42))
///     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0));
///
/// let result = tokio_test::block_on(sim.run(|env| async move {
///     env.storage.write("key", b"value").await?;
///     Ok::<_, StorageError>(())
/// }));
/// assert!(matches!(result, Err(StorageError::Write { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    faults: Vec<FaultConfig>,
    report_sink: Option<ReportSink>,
}

/// Captured teardown reports; stdout is used when unset.
type ReportSink = Rc<RefCell<Vec<String>>>;

impl Simulation {
    /// Create a simulation with no fault rules.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            faults: Vec::new(),
            report_sink: None,
        }
    }

    /// The configuration this run will use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Fault rules in registration order.
    #[must_use]
    pub fn fault_configs(&self) -> &[FaultConfig] {
        &self.faults
    }

    /// Add a fault rule.
    ///
    /// # Panics
    /// Panics if the rule is invalid.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        config.validate();
        self.faults.push(config);
        self
    }

    /// Add the storage fault bundle.
    #[must_use]
    pub fn with_storage_faults(mut self, probability: f64) -> Self {
        self.faults.extend(storage_faults(probability));
        self
    }

    /// Add the database fault bundle.
    #[must_use]
    pub fn with_db_faults(mut self, probability: f64) -> Self {
        self.faults.extend(db_faults(probability));
        self
    }

    /// Add the network fault bundle.
    #[must_use]
    pub fn with_network_faults(mut self, probability: f64) -> Self {
        self.faults.extend(network_faults(probability));
        self
    }

    /// Add the LLM/API fault bundle.
    #[must_use]
    pub fn with_llm_faults(mut self, probability: f64) -> Self {
        self.faults.extend(llm_faults(probability));
        self
    }

    /// Collect teardown reports here instead of printing them.
    #[cfg(test)]
    pub(crate) fn with_report_sink(mut self, sink: ReportSink) -> Self {
        self.report_sink = Some(sink);
        self
    }

    /// Construct the environment without a teardown report.
    #[must_use]
    pub fn build(self) -> SimEnvironment {
        let mut rng = DeterministicRng::new(self.config.seed());

        // Fork order is part of the replay contract.
        let fault_rng = rng.fork();
        let storage_rng = rng.fork();

        let faults = Rc::new(FaultInjector::new(fault_rng));
        for fault in self.faults {
            faults.register(fault);
        }

        let clock = SimClock::at_ms(self.config.start_time_ms())
            .with_advance_ms_max(self.config.time_advance_ms_max());

        // A latency draw is a single clock step, so the range cannot exceed it.
        let (latency_ms_min, latency_ms_max) = self.config.storage_latency_ms();
        let latency_ms_max = latency_ms_max.min(clock.advance_ms_max());
        let latency_ms_min = latency_ms_min.min(latency_ms_max);
        let storage = SimStorage::new(clock.clone(), storage_rng, Rc::clone(&faults))
            .with_latency_ms(latency_ms_min, latency_ms_max);

        SimEnvironment {
            config: self.config,
            clock,
            rng,
            faults,
            storage,
        }
    }

    /// Run a test body inside a fresh environment.
    ///
    /// Statistics are printed on the way out when any fault was injected,
    /// whether the body returns `Ok`, returns `Err`, or panics.
    ///
    /// # Errors
    /// Returns whatever error the test body returns.
    pub async fn run<F, Fut, T, E>(self, test: F) -> Result<T, E>
    where
        F: FnOnce(SimEnvironment) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let seed = self.config.seed();
        tracing::info!(
            seed = seed,
            faults_count = self.faults.len(),
            "Starting simulation"
        );

        let sink = self.report_sink.clone();
        let env = self.build();
        let _teardown = Teardown {
            seed,
            storage: env.storage.clone(),
            faults: Rc::clone(&env.faults),
            sink,
        };

        let result = test(env).await;
        if result.is_err() {
            tracing::warn!(seed = seed, "Simulation test body returned an error");
        }
        result
    }
}

/// Create a simulation, resolving the seed from the argument, `DST_SEED`,
/// or a fresh random value (printed for replay).
#[must_use]
pub fn create_simulation(seed: Option<u64>) -> Simulation {
    Simulation::new(SimConfig::with_seed(seed_from_env_or(seed)))
}

// =============================================================================
// SimEnvironment
// =============================================================================

/// Everything a test body needs for one run.
///
/// `clock`, `faults` and `storage` are handles onto state owned by this run;
/// they are single-threaded and cannot be sent to another thread.
#[derive(Debug)]
pub struct SimEnvironment {
    /// Configuration of the run
    pub config: SimConfig,
    /// Simulated clock
    pub clock: SimClock,
    /// Root RNG for test code (after the subsystem forks)
    pub rng: DeterministicRng,
    /// Fault injector shared with storage
    pub faults: Rc<FaultInjector>,
    /// Simulated storage
    pub storage: SimStorage,
}

impl SimEnvironment {
    /// Seed of the run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.config.seed()
    }

    /// Seed formatted for copy-paste replay.
    #[must_use]
    pub fn format_seed(&self) -> String {
        format!("DST_SEED={}", self.seed())
    }

    /// The teardown report this environment would print now, if any.
    #[must_use]
    pub fn report(&self) -> Option<String> {
        teardown_report(self.seed(), &self.storage, &self.faults)
    }
}

// =============================================================================
// Teardown
// =============================================================================

/// Prints the report when dropped, including during unwinding.
struct Teardown {
    seed: u64,
    storage: SimStorage,
    faults: Rc<FaultInjector>,
    sink: Option<ReportSink>,
}

impl Drop for Teardown {
    fn drop(&mut self) {
        let Some(report) = teardown_report(self.seed, &self.storage, &self.faults) else {
            return;
        };
        match &self.sink {
            Some(sink) => sink.borrow_mut().push(report),
            None => println!("{report}"),
        }
    }
}

/// Render the post-mortem report; `None` for fault-free runs.
fn teardown_report(seed: u64, storage: &SimStorage, faults: &FaultInjector) -> Option<String> {
    let storage_stats = storage.stats();
    if storage_stats.faults_injected_count == 0 && faults.total_injections() == 0 {
        return None;
    }

    let storage_json = serde_json::to_string(&storage_stats)
        .unwrap_or_else(|e| format!("<unserializable: {e}>"));
    let faults_json = serde_json::to_string(&faults.injection_stats())
        .unwrap_or_else(|e| format!("<unserializable: {e}>"));

    Some(format!(
        "DST: Faults injected with seed {seed} (replay with DST_SEED={seed})\n\
         DST: Storage stats: {storage_json}\n\
         DST: Fault stats: {faults_json}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::fault::FaultType;
    use crate::storage::StorageError;

    #[test]
    fn test_build_wires_components() {
        let config = SimConfig::with_seed(42)
            .with_start_time_ms(1000)
            .with_time_advance_ms_max(500);
        let env = Simulation::new(config)
            .with_storage_faults(0.1)
            .with_llm_faults(0.1)
            .build();

        assert_eq!(env.seed(), 42);
        assert_eq!(env.clock.now_ms(), 1000);
        assert_eq!(env.clock.advance_ms_max(), 500);
        assert_eq!(env.faults.rules_count(), 4 + 5);
        assert_eq!(env.rng.fork_count(), 2);
        assert_eq!(env.format_seed(), "DST_SEED=42");
    }

    #[test]
    fn test_fork_streams_match_manual_forks() {
        let mut env = Simulation::new(SimConfig::with_seed(9)).build();

        let mut manual = DeterministicRng::new(9);
        let _fault_rng = manual.fork();
        let _storage_rng = manual.fork();

        for _ in 0..10 {
            assert_eq!(env.rng.next_u64(), manual.next_u64());
        }
    }

    #[tokio::test]
    async fn test_storage_shares_clock() {
        let env = Simulation::new(SimConfig::with_seed(1)).build();

        env.clock.advance_ms(77);
        env.storage.write("k", b"v").await.unwrap();

        assert_eq!(env.storage.get_entry("k").unwrap().created_at_ms, 77);
    }

    #[tokio::test]
    async fn test_run_returns_body_result() {
        let value = Simulation::new(SimConfig::with_seed(7))
            .run(|env| async move {
                env.storage.write("a", b"1").await?;
                let read = env.storage.read("a").await?;
                Ok::<_, StorageError>(read)
            })
            .await
            .unwrap();

        assert_eq!(value, Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_run_propagates_injected_fault() {
        let result = Simulation::new(SimConfig::with_seed(42))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0))
            .run(|env| async move { env.storage.write("k", b"v").await })
            .await;

        assert!(matches!(result, Err(StorageError::Write { .. })));
    }

    #[tokio::test]
    async fn test_faults_registered_mid_run() {
        Simulation::new(SimConfig::with_seed(3))
            .run(|env| async move {
                env.storage.write("k", b"v").await?;
                env.faults.register(FaultConfig::new(FaultType::StorageReadFail, 1.0));
                assert!(env.storage.read("k").await.is_err());
                Ok::<_, StorageError>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_report_is_silent_without_faults() {
        let env = Simulation::new(SimConfig::with_seed(7)).build();
        env.storage.write("a", b"1").await.unwrap();

        assert!(env.report().is_none());
    }

    #[tokio::test]
    async fn test_report_after_fault() {
        let env = Simulation::new(SimConfig::with_seed(42))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0))
            .build();
        let _ = env.storage.write("k", b"v").await;

        let report = env.report().unwrap();
        assert!(report.contains("DST_SEED=42"));
        assert!(report.contains("\"faults_injected_count\":1"));
        assert!(report.contains("\"storage_write_fail\":1"));
    }

    fn write_fail_sim(seed: u64, sink: &ReportSink) -> Simulation {
        Simulation::new(SimConfig::with_seed(seed))
            .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 1.0))
            .with_report_sink(Rc::clone(sink))
    }

    #[tokio::test]
    async fn test_teardown_reports_on_err() {
        let sink = ReportSink::default();

        let result = write_fail_sim(42, &sink)
            .run(|env| async move { env.storage.write("k", b"v").await })
            .await;

        assert!(result.is_err());
        let reports = sink.borrow();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("DST: Faults injected with seed 42"));
    }

    #[test]
    fn test_teardown_reports_on_panic() {
        let sink = ReportSink::default();
        let sim = write_fail_sim(13, &sink);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio_test::block_on(sim.run(|env| async move {
                let written = env.storage.write("k", b"v").await;
                assert!(written.is_ok(), "body failed after injected fault");
                Ok::<_, StorageError>(())
            }))
        }));

        assert!(outcome.is_err());
        let reports = sink.borrow();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("replay with DST_SEED=13"));
    }

    #[tokio::test]
    async fn test_teardown_silent_without_faults() {
        let sink = ReportSink::default();

        Simulation::new(SimConfig::with_seed(7))
            .with_report_sink(Rc::clone(&sink))
            .run(|env| async move { env.storage.write("k", b"v").await })
            .await
            .unwrap();

        assert!(sink.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_latency_range_clamped_to_clock_step() {
        let config = SimConfig::with_seed(1).with_time_advance_ms_max(5);
        let env = Simulation::new(config)
            .with_fault(FaultConfig::new(FaultType::StorageLatency, 1.0))
            .build();

        for i in 0..100 {
            env.storage.write(&format!("k{i}"), b"v").await.unwrap();
        }
        assert_eq!(env.storage.len(), 100);
        assert!(env.clock.now_ms() <= 100 * 5);
    }

    #[test]
    fn test_report_counts_non_storage_faults() {
        let env = Simulation::new(SimConfig::with_seed(5))
            .with_db_faults(1.0)
            .build();

        assert_eq!(
            env.faults.should_inject("db_query"),
            Some(FaultType::DbConnectionFail)
        );
        assert!(env.report().unwrap().contains("db_connection_fail"));
    }

    #[test]
    fn test_create_simulation_explicit_seed() {
        let sim = create_simulation(Some(42));
        assert_eq!(sim.config().seed(), 42);
        assert!(sim.fault_configs().is_empty());
    }
}
