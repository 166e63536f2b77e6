//! Fault injection for deterministic testing
//!
//! TigerStyle: Explicit fault types, probabilistic injection.
//!
//! # Rule evaluation
//!
//! Rules are evaluated in registration order. For each rule:
//!
//! ```text
//! enabled? ─no─► skip
//!    │
//! filter matches operation? ─no─► skip
//!    │
//! operations seen >= after_operations? ─no─► skip
//!    │
//! injections < max_injections? ─no─► skip
//!    │
//! RNG draw < probability? ─no─► skip
//!    │
//! inject (stop evaluating)
//! ```
//!
//! The first rule that draws "inject" wins, so earlier rules take priority.
//! Only rules that reach the last step consume randomness.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde::Serialize;

use crate::constants::{
    FAULT_INJECTIONS_COUNT_WARNING, OPERATION_DB_PREFIX, OPERATION_LLM_PREFIX,
    OPERATION_NETWORK_PREFIX, OPERATION_STORAGE_READ, OPERATION_STORAGE_WRITE,
};

use super::rng::DeterministicRng;

// =============================================================================
// Fault Types
// =============================================================================

/// Family a fault type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    /// Key-value storage
    Storage,
    /// Database calls
    Database,
    /// Network calls
    Network,
    /// LLM / external API calls
    Llm,
}

/// Types of faults that can be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    // Storage faults
    /// Storage write operation fails
    StorageWriteFail,
    /// Storage read operation fails
    StorageReadFail,
    /// Storage data is corrupted on read
    StorageCorruption,
    /// Storage operation is slow
    StorageLatency,
    /// Disk is full
    DiskFull,

    // Database faults
    /// Database connection cannot be established
    DbConnectionFail,
    /// Database query exceeds its deadline
    DbQueryTimeout,
    /// Transaction aborted by deadlock detection
    DbDeadlock,
    /// Transaction aborted by a serialization conflict
    DbSerializationFail,

    // Network faults
    /// Request times out
    NetworkTimeout,
    /// Peer unreachable
    NetworkPartition,
    /// Message lost
    NetworkPacketLoss,
    /// Message delayed
    NetworkDelay,

    // LLM / API faults
    /// Completion request times out
    LlmTimeout,
    /// Provider rate limit hit
    LlmRateLimit,
    /// Prompt exceeds the context window
    LlmContextOverflow,
    /// Response cannot be parsed
    LlmInvalidResponse,
    /// Provider returns 5xx
    LlmServiceUnavailable,
}

impl FaultType {
    /// Get a human-readable name for this fault type
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageCorruption => "storage_corruption",
            Self::StorageLatency => "storage_latency",
            Self::DiskFull => "disk_full",
            Self::DbConnectionFail => "db_connection_fail",
            Self::DbQueryTimeout => "db_query_timeout",
            Self::DbDeadlock => "db_deadlock",
            Self::DbSerializationFail => "db_serialization_fail",
            Self::NetworkTimeout => "network_timeout",
            Self::NetworkPartition => "network_partition",
            Self::NetworkPacketLoss => "network_packet_loss",
            Self::NetworkDelay => "network_delay",
            Self::LlmTimeout => "llm_timeout",
            Self::LlmRateLimit => "llm_rate_limit",
            Self::LlmContextOverflow => "llm_context_overflow",
            Self::LlmInvalidResponse => "llm_invalid_response",
            Self::LlmServiceUnavailable => "llm_service_unavailable",
        }
    }

    /// Family this fault belongs to.
    #[must_use]
    pub fn category(&self) -> FaultCategory {
        match self {
            Self::StorageWriteFail
            | Self::StorageReadFail
            | Self::StorageCorruption
            | Self::StorageLatency
            | Self::DiskFull => FaultCategory::Storage,
            Self::DbConnectionFail
            | Self::DbQueryTimeout
            | Self::DbDeadlock
            | Self::DbSerializationFail => FaultCategory::Database,
            Self::NetworkTimeout
            | Self::NetworkPartition
            | Self::NetworkPacketLoss
            | Self::NetworkDelay => FaultCategory::Network,
            Self::LlmTimeout
            | Self::LlmRateLimit
            | Self::LlmContextOverflow
            | Self::LlmInvalidResponse
            | Self::LlmServiceUnavailable => FaultCategory::Llm,
        }
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Fault Config
// =============================================================================

/// Configuration for a fault injection rule
#[derive(Debug, Clone, PartialEq)]
pub struct FaultConfig {
    /// The type of fault to inject
    pub fault_type: FaultType,
    /// Probability of injection (0.0 - 1.0)
    pub probability: f64,
    /// Substring that the operation name must contain
    pub operation_filter: Option<String>,
    /// Only trigger once this many operations have been observed
    pub after_operations: u64,
    /// Maximum number of injections
    pub max_injections: Option<u64>,
    /// Whether this fault is enabled
    pub enabled: bool,
}

impl FaultConfig {
    /// Create a new fault configuration
    ///
    /// # Panics
    /// Panics if `probability` is outside `[0, 1]`.
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        let config = Self {
            fault_type,
            probability,
            operation_filter: None,
            after_operations: 0,
            max_injections: None,
            enabled: true,
        };
        config.validate();
        config
    }

    /// Only apply to operations whose name contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set the number of operations to observe before triggering
    #[must_use]
    pub fn after(mut self, operations: u64) -> Self {
        self.after_operations = operations;
        self
    }

    /// Cap the number of injections
    ///
    /// # Panics
    /// Panics if `max` is zero.
    #[must_use]
    pub fn max_injections(mut self, max: u64) -> Self {
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }

    /// Disable this fault
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Check the rule's invariants.
    ///
    /// Fields are public, so `register` re-checks anything built by hand.
    ///
    /// # Panics
    /// Panics on an out-of-range probability, a zero `max_injections`,
    /// or an empty operation filter.
    pub fn validate(&self) {
        assert!(
            (0.0..=1.0).contains(&self.probability),
            "probability must be in [0, 1], got {}",
            self.probability
        );
        if let Some(max) = self.max_injections {
            assert!(max > 0, "max_injections must be positive");
        }
        if let Some(filter) = &self.operation_filter {
            assert!(!filter.is_empty(), "operation_filter cannot be empty");
        }
    }
}

// =============================================================================
// Fault Bundles
// =============================================================================

/// Storage rules: write and disk-full on mutations, read failure and
/// corruption on reads.
#[must_use]
pub fn storage_faults(probability: f64) -> Vec<FaultConfig> {
    vec![
        FaultConfig::new(FaultType::StorageWriteFail, probability)
            .with_filter(OPERATION_STORAGE_WRITE),
        FaultConfig::new(FaultType::StorageReadFail, probability)
            .with_filter(OPERATION_STORAGE_READ),
        FaultConfig::new(FaultType::StorageCorruption, probability)
            .with_filter(OPERATION_STORAGE_READ),
        FaultConfig::new(FaultType::DiskFull, probability).with_filter(OPERATION_STORAGE_WRITE),
    ]
}

/// Database rules, scoped to `db_*` operations.
#[must_use]
pub fn db_faults(probability: f64) -> Vec<FaultConfig> {
    [
        FaultType::DbConnectionFail,
        FaultType::DbQueryTimeout,
        FaultType::DbDeadlock,
        FaultType::DbSerializationFail,
    ]
    .into_iter()
    .map(|fault_type| FaultConfig::new(fault_type, probability).with_filter(OPERATION_DB_PREFIX))
    .collect()
}

/// Network rules, scoped to `network_*` operations.
#[must_use]
pub fn network_faults(probability: f64) -> Vec<FaultConfig> {
    [
        FaultType::NetworkTimeout,
        FaultType::NetworkPartition,
        FaultType::NetworkPacketLoss,
        FaultType::NetworkDelay,
    ]
    .into_iter()
    .map(|fault_type| {
        FaultConfig::new(fault_type, probability).with_filter(OPERATION_NETWORK_PREFIX)
    })
    .collect()
}

/// LLM/API rules, scoped to `llm_*` operations.
#[must_use]
pub fn llm_faults(probability: f64) -> Vec<FaultConfig> {
    [
        FaultType::LlmTimeout,
        FaultType::LlmRateLimit,
        FaultType::LlmContextOverflow,
        FaultType::LlmInvalidResponse,
        FaultType::LlmServiceUnavailable,
    ]
    .into_iter()
    .map(|fault_type| FaultConfig::new(fault_type, probability).with_filter(OPERATION_LLM_PREFIX))
    .collect()
}

// =============================================================================
// Fault Injector
// =============================================================================

/// State for a registered fault
#[derive(Debug)]
struct FaultState {
    config: FaultConfig,
    injections_count: u64,
}

/// Fault injector for deterministic testing
///
/// Shared by reference between storage and test code; every method takes
/// `&self`. The injector is single-threaded by construction (`!Sync`).
#[derive(Debug)]
pub struct FaultInjector {
    /// Registered fault rules, in priority order
    faults: RefCell<Vec<FaultState>>,
    /// RNG for probabilistic injection
    rng: RefCell<DeterministicRng>,
    /// Total operations observed
    operation_count: Cell<u64>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            faults: RefCell::new(Vec::new()),
            rng: RefCell::new(rng),
            operation_count: Cell::new(0),
        }
    }

    /// Append a fault rule. Later rules have lower priority.
    ///
    /// # Panics
    /// Panics if the rule is invalid.
    pub fn register(&self, config: FaultConfig) {
        config.validate();
        self.faults.borrow_mut().push(FaultState {
            config,
            injections_count: 0,
        });
    }

    /// Check if a fault should be injected for the given operation
    ///
    /// The operation counter increments on every call, whether or not a
    /// fault fires.
    ///
    /// # Panics
    /// Panics if `operation` is empty.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        assert!(!operation.is_empty(), "operation cannot be empty");

        let op_count = self.operation_count.get();
        self.operation_count.set(op_count + 1);

        let mut faults = self.faults.borrow_mut();
        let mut rng = self.rng.borrow_mut();

        for fault_state in faults.iter_mut() {
            let config = &fault_state.config;

            if !config.enabled {
                continue;
            }

            if let Some(filter) = &config.operation_filter {
                if !operation.contains(filter.as_str()) {
                    continue;
                }
            }

            if op_count < config.after_operations {
                continue;
            }

            if let Some(max) = config.max_injections {
                if fault_state.injections_count >= max {
                    continue;
                }
            }

            if rng.next_bool(config.probability) {
                fault_state.injections_count += 1;

                tracing::debug!(
                    fault = config.fault_type.name(),
                    operation = operation,
                    injections_count = fault_state.injections_count,
                    "Injecting fault"
                );
                if fault_state.injections_count == FAULT_INJECTIONS_COUNT_WARNING {
                    tracing::warn!(
                        fault = config.fault_type.name(),
                        "Very high number of injections - possible runaway test loop"
                    );
                }

                return Some(config.fault_type);
            }
        }

        None
    }

    /// True only if `should_inject` returns exactly `fault_type`.
    ///
    /// This is a full `should_inject` call: it counts an operation and may
    /// consume randomness. Use either this or `should_inject` for one logical
    /// event, never both, or the fault sequence for a seed changes.
    pub fn check_fault(&self, operation: &str, fault_type: FaultType) -> bool {
        self.should_inject(operation) == Some(fault_type)
    }

    /// Total operations observed since creation or the last reset
    #[must_use]
    pub fn operation_count(&self) -> u64 {
        self.operation_count.get()
    }

    /// Injection counts keyed by fault name, summed across rules
    #[must_use]
    pub fn injection_stats(&self) -> BTreeMap<&'static str, u64> {
        let mut stats = BTreeMap::new();
        for state in self.faults.borrow().iter() {
            *stats.entry(state.config.fault_type.name()).or_insert(0) += state.injections_count;
        }
        stats
    }

    /// Per-rule statistics in registration order
    #[must_use]
    pub fn rule_stats(&self) -> Vec<FaultStats> {
        self.faults
            .borrow()
            .iter()
            .map(|state| FaultStats {
                fault_type: state.config.fault_type,
                probability: state.config.probability,
                injections_count: state.injections_count,
                enabled: state.config.enabled,
            })
            .collect()
    }

    /// Sum of injections across all rules
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.faults
            .borrow()
            .iter()
            .map(|state| state.injections_count)
            .sum()
    }

    /// Number of registered rules
    #[must_use]
    pub fn rules_count(&self) -> usize {
        self.faults.borrow().len()
    }

    /// Reset the operation counter and all injection counts.
    ///
    /// Rules and RNG position are kept.
    pub fn reset_stats(&self) {
        self.operation_count.set(0);
        for fault_state in self.faults.borrow_mut().iter_mut() {
            fault_state.injections_count = 0;
        }
    }
}

/// Statistics for a fault rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultStats {
    /// Fault the rule injects
    pub fault_type: FaultType,
    /// Configured probability
    pub probability: f64,
    /// Injections so far
    pub injections_count: u64,
    /// Whether the rule is enabled
    pub enabled: bool,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for creating a FaultInjector with multiple faults
///
/// Equivalent to calling `register` once per rule, in the same order.
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    faults: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            faults: Vec::new(),
        }
    }

    /// Add a fault configuration
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.faults.push(config);
        self
    }

    /// Add the storage bundle at one probability
    #[must_use]
    pub fn with_storage_faults(mut self, probability: f64) -> Self {
        self.faults.extend(storage_faults(probability));
        self
    }

    /// Add the database bundle at one probability
    #[must_use]
    pub fn with_db_faults(mut self, probability: f64) -> Self {
        self.faults.extend(db_faults(probability));
        self
    }

    /// Add the network bundle at one probability
    #[must_use]
    pub fn with_network_faults(mut self, probability: f64) -> Self {
        self.faults.extend(network_faults(probability));
        self
    }

    /// Add the LLM/API bundle at one probability
    #[must_use]
    pub fn with_llm_faults(mut self, probability: f64) -> Self {
        self.faults.extend(llm_faults(probability));
        self
    }

    /// Build the fault injector
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let injector = FaultInjector::new(self.rng);
        for config in self.faults {
            injector.register(config);
        }
        injector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_injection_probability() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        for _ in 0..10 {
            assert_eq!(
                injector.should_inject("storage_write"),
                Some(FaultType::StorageWriteFail)
            );
        }
        assert_eq!(injector.operation_count(), 10);
    }

    #[test]
    fn test_fault_injection_zero_probability() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 0.0));

        for _ in 0..100 {
            assert!(injector.should_inject("storage_write").is_none());
        }
        assert_eq!(injector.operation_count(), 100);
        assert_eq!(injector.total_injections(), 0);
    }

    #[test]
    fn test_operation_count_without_rules() {
        let injector = FaultInjector::new(DeterministicRng::new(1));
        injector.should_inject("a");
        injector.should_inject("b");
        assert_eq!(injector.operation_count(), 2);
    }

    #[test]
    #[should_panic(expected = "operation cannot be empty")]
    fn test_empty_operation() {
        let injector = FaultInjector::new(DeterministicRng::new(1));
        injector.should_inject("");
    }

    #[test]
    #[should_panic(expected = "probability must be in [0, 1]")]
    fn test_invalid_probability() {
        let _ = FaultConfig::new(FaultType::DiskFull, -0.1);
    }

    #[test]
    #[should_panic(expected = "max_injections must be positive")]
    fn test_zero_max_injections() {
        let _ = FaultConfig::new(FaultType::DiskFull, 0.5).max_injections(0);
    }

    #[test]
    #[should_panic(expected = "probability must be in [0, 1]")]
    fn test_register_revalidates() {
        let injector = FaultInjector::new(DeterministicRng::new(1));
        let mut config = FaultConfig::new(FaultType::DiskFull, 0.5);
        config.probability = 2.0;
        injector.register(config);
    }

    #[test]
    fn test_fault_injection_filter() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0).with_filter("write"));

        assert!(injector.should_inject("storage_write").is_some());
        assert!(injector.should_inject("storage_read").is_none());
    }

    #[test]
    fn test_after_operations() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageReadFail, 1.0).after(3));

        assert!(injector.should_inject("op").is_none());
        assert!(injector.should_inject("op").is_none());
        assert!(injector.should_inject("op").is_none());
        assert_eq!(injector.should_inject("op"), Some(FaultType::StorageReadFail));
    }

    #[test]
    fn test_after_operations_counts_every_call_site() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(
            FaultConfig::new(FaultType::StorageReadFail, 1.0)
                .with_filter("storage_read")
                .after(2),
        );

        // Unrelated operations still advance the shared counter.
        assert!(injector.should_inject("db_query").is_none());
        assert!(injector.should_inject("llm_call").is_none());
        assert!(injector.should_inject("storage_read").is_some());
    }

    #[test]
    fn test_fault_injection_max_injections() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0).max_injections(2));

        assert!(injector.should_inject("write").is_some());
        assert!(injector.should_inject("write").is_some());
        assert!(injector.should_inject("write").is_none());
    }

    #[test]
    fn test_disabled_rule() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::DiskFull, 1.0).disabled());

        assert!(injector.should_inject("storage_write").is_none());
        assert!(!injector.rule_stats()[0].enabled);
    }

    #[test]
    fn test_earlier_rule_takes_priority() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));
        injector.register(FaultConfig::new(FaultType::DiskFull, 1.0));

        for _ in 0..20 {
            assert_eq!(
                injector.should_inject("storage_write"),
                Some(FaultType::StorageWriteFail)
            );
        }

        let stats = injector.injection_stats();
        assert_eq!(stats["storage_write_fail"], 20);
        assert_eq!(stats["disk_full"], 0);
    }

    #[test]
    fn test_later_rule_fires_when_earlier_skips() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0).max_injections(1));
        injector.register(FaultConfig::new(FaultType::DiskFull, 1.0));

        assert_eq!(
            injector.should_inject("storage_write"),
            Some(FaultType::StorageWriteFail)
        );
        assert_eq!(
            injector.should_inject("storage_write"),
            Some(FaultType::DiskFull)
        );
    }

    #[test]
    fn test_deterministic_decisions() {
        let run = |seed| {
            let injector = FaultInjector::new(DeterministicRng::new(seed));
            injector.register(FaultConfig::new(FaultType::StorageWriteFail, 0.3));
            injector.register(FaultConfig::new(FaultType::StorageReadFail, 0.3));
            let decisions: Vec<Option<FaultType>> = (0..200)
                .map(|i| injector.should_inject(if i % 2 == 0 { "a" } else { "b" }))
                .collect();
            (decisions, injector.injection_stats())
        };

        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_check_fault_is_a_full_call() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0));

        assert!(injector.check_fault("storage_write", FaultType::StorageWriteFail));
        assert!(!injector.check_fault("storage_write", FaultType::DiskFull));
        assert_eq!(injector.operation_count(), 2);
        assert_eq!(injector.total_injections(), 2);
    }

    #[test]
    fn test_check_fault_shifts_sequence() {
        let single = FaultInjector::new(DeterministicRng::new(11));
        let double = FaultInjector::new(DeterministicRng::new(11));
        for injector in [&single, &double] {
            injector.register(FaultConfig::new(FaultType::StorageWriteFail, 0.5));
        }

        single.should_inject("op");
        double.should_inject("op");
        double.check_fault("op", FaultType::StorageWriteFail);

        assert_eq!(single.operation_count(), 1);
        assert_eq!(double.operation_count(), 2);
    }

    #[test]
    fn test_reset_stats() {
        let injector = FaultInjector::new(DeterministicRng::new(42));
        injector.register(FaultConfig::new(FaultType::StorageWriteFail, 1.0).max_injections(1));

        assert!(injector.should_inject("write").is_some());
        assert!(injector.should_inject("write").is_none());

        injector.reset_stats();
        assert_eq!(injector.operation_count(), 0);
        assert_eq!(injector.total_injections(), 0);
        assert_eq!(injector.rules_count(), 1);

        // The cap applies afresh after a reset.
        assert!(injector.should_inject("write").is_some());
    }

    #[test]
    fn test_fault_injector_builder() {
        let injector = FaultInjectorBuilder::new(DeterministicRng::new(42))
            .with_storage_faults(0.1)
            .with_db_faults(0.1)
            .with_network_faults(0.05)
            .with_llm_faults(0.2)
            .with_fault(FaultConfig::new(FaultType::StorageLatency, 0.5))
            .build();

        assert_eq!(injector.rules_count(), 4 + 4 + 4 + 5 + 1);
        assert_eq!(injector.rule_stats()[0].fault_type, FaultType::StorageWriteFail);
    }

    #[test]
    fn test_builder_matches_register() {
        let built = FaultInjectorBuilder::new(DeterministicRng::new(3))
            .with_storage_faults(0.4)
            .build();
        let manual = FaultInjector::new(DeterministicRng::new(3));
        for config in storage_faults(0.4) {
            manual.register(config);
        }

        for i in 0..100 {
            let operation = if i % 3 == 0 { "storage_write" } else { "storage_read" };
            assert_eq!(built.should_inject(operation), manual.should_inject(operation));
        }
    }

    #[test]
    fn test_bundles_are_scoped() {
        let injector = FaultInjectorBuilder::new(DeterministicRng::new(1))
            .with_db_faults(1.0)
            .with_llm_faults(1.0)
            .build();

        assert!(injector.should_inject("storage_write").is_none());
        assert_eq!(injector.should_inject("db_query"), Some(FaultType::DbConnectionFail));
        assert_eq!(injector.should_inject("llm_complete"), Some(FaultType::LlmTimeout));
    }

    #[test]
    fn test_fault_type_names_and_categories() {
        assert_eq!(FaultType::StorageWriteFail.name(), "storage_write_fail");
        assert_eq!(FaultType::DiskFull.to_string(), "disk_full");
        assert_eq!(FaultType::DiskFull.category(), FaultCategory::Storage);
        assert_eq!(FaultType::DbDeadlock.category(), FaultCategory::Database);
        assert_eq!(FaultType::NetworkDelay.category(), FaultCategory::Network);
        assert_eq!(FaultType::LlmRateLimit.category(), FaultCategory::Llm);
    }
}
