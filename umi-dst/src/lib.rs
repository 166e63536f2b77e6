//! Umi DST - Deterministic Simulation Testing
//!
//! TigerStyle simulation-first testing inspired by TigerBeetle/FoundationDB.
//!
//! # Philosophy
//!
//! > "If you're not testing with fault injection, you're not testing."
//!
//! Every run is driven by a single seed:
//! 1. Randomness comes from a seeded, forkable RNG
//! 2. Time only moves when the test moves it
//! 3. Storage and external calls fail on a deterministic schedule
//! 4. Seeds are logged for reproducibility
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Umi DST                        │
//! ├─────────────────────────────────────────────┤
//! │  DeterministicRng      │ Seeded, forkable   │
//! │  SimClock              │ Manual time        │
//! │  FaultInjector         │ Probabilistic      │
//! │  SimStorage            │ In-memory KV       │
//! ├─────────────────────────────────────────────┤
//! │  Simulation / dst_test │ Seed + teardown    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use umi_dst::{SimConfig, Simulation, StorageError};
//!
//! let sim = Simulation::new(SimConfig::with_seed(42)).with_storage_faults(0.1);
//!
//! let result = tokio_test::block_on(sim.run(|env| async move {
//!     env.storage.write("key", b"value").await?;
//!     let value = env.storage.read("key").await?;
//!     Ok::<_, StorageError>(value)
//! }));
//! // Same seed, same outcome on every run.
//! println!("{result:?}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod dst;
pub mod storage;

// Re-export common types
pub use constants::*;
pub use dst::{
    create_simulation, dst_test, DeterministicRng, DstTest, FaultCategory, FaultConfig,
    FaultInjector, FaultInjectorBuilder, FaultType, PropertyTest, PropertyTestable, SimClock,
    SimConfig, SimEnvironment, SimStorage, Simulation,
};
pub use storage::{StorageBackend, StorageError, StorageResult};
