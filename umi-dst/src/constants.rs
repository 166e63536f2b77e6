//! TigerStyle Constants
//!
//! All limits are explicit and carry their unit in the name
//! (`_MS`, `_BYTES`, `_COUNT`), with `_MAX`/`_MIN`/`_DEFAULT` last.

// =============================================================================
// Time
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1_000;

/// Start time of every simulated clock unless configured otherwise
pub const DST_EPOCH_MS_DEFAULT: u64 = 0;

/// Maximum single clock step (one day).
///
/// Larger jumps are almost always a test bug that would hide timing issues.
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 24 * 60 * 60 * TIME_MS_PER_SEC;

// =============================================================================
// Simulation
// =============================================================================

/// Default ceiling for simulation loop steps
pub const DST_STEPS_MAX_DEFAULT: u64 = 10_000;

/// Default operations per property-test run
pub const PROPERTY_OPERATIONS_COUNT_DEFAULT: u64 = 1_000;

/// Environment variable holding the replay seed
pub const DST_SEED_ENV_VAR: &str = "DST_SEED";

/// Default minimum simulated network latency
pub const DST_NETWORK_LATENCY_MS_MIN_DEFAULT: u64 = 1;

/// Default maximum simulated network latency
pub const DST_NETWORK_LATENCY_MS_MAX_DEFAULT: u64 = 100;

/// Default minimum simulated storage latency
pub const DST_STORAGE_LATENCY_MS_MIN_DEFAULT: u64 = 1;

/// Default maximum simulated storage latency
pub const DST_STORAGE_LATENCY_MS_MAX_DEFAULT: u64 = 10;

// =============================================================================
// Faults
// =============================================================================

/// Injection count after which the injector logs a warning
pub const FAULT_INJECTIONS_COUNT_WARNING: u64 = 100_000;

/// Operation name for storage mutations (write, delete)
pub const OPERATION_STORAGE_WRITE: &str = "storage_write";

/// Operation name for storage reads (read, exists, keys)
pub const OPERATION_STORAGE_READ: &str = "storage_read";

/// Operation-name prefix for database call sites
pub const OPERATION_DB_PREFIX: &str = "db_";

/// Operation-name prefix for network call sites
pub const OPERATION_NETWORK_PREFIX: &str = "network_";

/// Operation-name prefix for LLM/API call sites
pub const OPERATION_LLM_PREFIX: &str = "llm_";

// =============================================================================
// Storage
// =============================================================================

/// Maximum key length in bytes
pub const STORAGE_KEY_BYTES_MAX: usize = 1024;

/// Maximum value length in bytes (10MB)
pub const STORAGE_VALUE_BYTES_MAX: usize = 10 * 1024 * 1024;
