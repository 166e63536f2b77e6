//! Storage - Backend Trait and Errors
//!
//! TigerStyle: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StorageBackend Trait                      │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │   SimStorage    │           │  real adapter   │
//! │   (testing)     │           │  (production)   │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! # Simulation-First
//!
//! Code written against `StorageBackend` runs unchanged on `SimStorage`,
//! where every call can be made to fail deterministically.

mod backend;
mod error;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
