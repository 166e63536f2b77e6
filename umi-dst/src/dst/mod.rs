//! DST - Deterministic Simulation Testing
//!
//! TigerBeetle/FoundationDB-style deterministic simulation testing framework.
//!
//! # Philosophy
//!
//! > "If you're not testing with fault injection, you're not testing."
//!
//! # Usage
//!
//! ```rust
//! use umi_dst::dst::{FaultConfig, FaultType, SimConfig, Simulation};
//! use umi_dst::StorageError;
//!
//! let sim = Simulation::new(SimConfig::with_seed(42))
//!     .with_fault(FaultConfig::new(FaultType::StorageWriteFail, 0.1));
//!
//! let result = tokio_test::block_on(sim.run(|env| async move {
//!     env.storage.write("key", b"value").await?;
//!     env.clock.advance_ms(1000);
//!     env.storage.read("key").await
//! }));
//! assert!(result.is_ok() || matches!(result, Err(StorageError::Write { .. })));
//! ```
//!
//! Run with explicit seed for reproducibility:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

mod clock;
mod config;
mod fault;
mod harness;
mod property;
mod rng;
mod simulation;
mod storage;

pub use clock::SimClock;
pub use config::SimConfig;
pub use fault::{
    db_faults, llm_faults, network_faults, storage_faults, FaultCategory, FaultConfig,
    FaultInjector, FaultInjectorBuilder, FaultStats, FaultType,
};
pub use harness::{dst_test, resolve_seed, DstTest, SeedSource};
pub use property::{
    run_property_tests, test_seeds, PropertyTest, PropertyTestFailure, PropertyTestResult,
    PropertyTestable, TimeAdvanceConfig,
};
pub use rng::DeterministicRng;
pub use simulation::{create_simulation, SimEnvironment, Simulation};
pub use storage::{SimStorage, StorageEntry, StorageStats};
