//! SimStorage - Simulated Key-Value Storage
//!
//! TigerStyle: In-memory storage that asks the fault injector before every
//! operation.
//!
//! | Operation | Fault channel   | Faults that apply                          |
//! |-----------|-----------------|--------------------------------------------|
//! | write     | `storage_write` | write fail, disk full, latency             |
//! | delete    | `storage_write` | write fail, disk full, latency             |
//! | read      | `storage_read`  | read fail, corruption, latency             |
//! | exists    | `storage_read`  | read fail, latency                         |
//! | keys      | `storage_read`  | read fail, latency                         |
//!
//! Any other fault drawn on a storage channel is not applicable: the
//! operation proceeds and the storage fault counter is untouched.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;

use crate::constants::{
    DST_STORAGE_LATENCY_MS_MAX_DEFAULT, DST_STORAGE_LATENCY_MS_MIN_DEFAULT,
    OPERATION_STORAGE_READ, OPERATION_STORAGE_WRITE, STORAGE_KEY_BYTES_MAX,
    STORAGE_VALUE_BYTES_MAX,
};
use crate::storage::{StorageBackend, StorageError, StorageResult};

use super::clock::SimClock;
use super::fault::{FaultInjector, FaultType};
use super::rng::DeterministicRng;

// =============================================================================
// Types
// =============================================================================

/// A stored value with its timestamps from the simulated clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// Stored bytes
    pub value: Vec<u8>,
    /// Time of the first write
    pub created_at_ms: u64,
    /// Time of the latest write
    pub modified_at_ms: u64,
}

/// Snapshot of storage activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// `write` calls
    pub writes_count: u64,
    /// `read`, `exists` and `keys` calls
    pub reads_count: u64,
    /// `delete` calls
    pub deletes_count: u64,
    /// Storage faults that took effect
    pub faults_injected_count: u64,
    /// Keys currently stored
    pub entries_count: u64,
    /// Sum of stored value lengths
    pub total_bytes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    writes_count: u64,
    reads_count: u64,
    deletes_count: u64,
    faults_injected_count: u64,
}

/// What the read path should do after consulting the injector.
enum ReadOutcome {
    Proceed,
    Corrupt,
}

#[derive(Debug)]
struct StorageState {
    entries: RefCell<BTreeMap<String, StorageEntry>>,
    counters: RefCell<Counters>,
    rng: RefCell<DeterministicRng>,
}

// =============================================================================
// SimStorage
// =============================================================================

/// Simulated key-value storage with deterministic fault injection.
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone)]
pub struct SimStorage {
    state: Rc<StorageState>,
    clock: SimClock,
    faults: Rc<FaultInjector>,
    latency_ms_min: u64,
    latency_ms_max: u64,
}

impl SimStorage {
    /// Create an empty store.
    ///
    /// `rng` drives corruption and latency choices and should be a stream
    /// forked for storage alone.
    #[must_use]
    pub fn new(clock: SimClock, rng: DeterministicRng, faults: Rc<FaultInjector>) -> Self {
        // Default range never exceeds the clock's step limit.
        let latency_ms_max = DST_STORAGE_LATENCY_MS_MAX_DEFAULT.min(clock.advance_ms_max());
        let latency_ms_min = DST_STORAGE_LATENCY_MS_MIN_DEFAULT.min(latency_ms_max);
        Self {
            state: Rc::new(StorageState {
                entries: RefCell::new(BTreeMap::new()),
                counters: RefCell::new(Counters::default()),
                rng: RefCell::new(rng),
            }),
            clock,
            faults,
            latency_ms_min,
            latency_ms_max,
        }
    }

    /// Set the range injected latency is drawn from.
    ///
    /// # Panics
    /// Panics if `min_ms > max_ms` or `max_ms` exceeds the clock's step limit.
    #[must_use]
    pub fn with_latency_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        assert!(
            min_ms <= max_ms,
            "storage latency min ({}) > max ({})",
            min_ms,
            max_ms
        );
        assert!(
            max_ms <= self.clock.advance_ms_max(),
            "storage latency max ({}) exceeds clock advance max ({})",
            max_ms,
            self.clock.advance_ms_max()
        );
        self.latency_ms_min = min_ms;
        self.latency_ms_max = max_ms;
        self
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    /// `Write` or `DiskFull` when such a fault is injected.
    ///
    /// # Panics
    /// Panics if the key is empty or either argument exceeds its size limit.
    pub async fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        // Preconditions
        assert_valid_key(key);
        assert!(
            value.len() <= STORAGE_VALUE_BYTES_MAX,
            "value {} bytes exceeds max {}",
            value.len(),
            STORAGE_VALUE_BYTES_MAX
        );

        self.state.counters.borrow_mut().writes_count += 1;
        self.check_write_fault(key)?;

        let now_ms = self.clock.now_ms();
        let mut entries = self.state.entries.borrow_mut();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.value = value.to_vec();
                entry.modified_at_ms = now_ms;
            }
            None => {
                entries.insert(
                    key.to_string(),
                    StorageEntry {
                        value: value.to_vec(),
                        created_at_ms: now_ms,
                        modified_at_ms: now_ms,
                    },
                );
            }
        }

        // Postcondition
        assert!(entries.contains_key(key), "key must exist after write");

        Ok(())
    }

    /// Fetch the value under `key`, or `None` if absent.
    ///
    /// Under an injected corruption the stored value is untouched; the
    /// returned copy has exactly one bit flipped.
    ///
    /// # Errors
    /// `Read` on an injected read failure; `Corruption` when corruption is
    /// injected and there is no data to corrupt.
    ///
    /// # Panics
    /// Panics if the key is empty or too long.
    pub async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        assert_valid_key(key);

        self.state.counters.borrow_mut().reads_count += 1;
        let outcome = self.check_read_fault(key)?;

        let value = self
            .state
            .entries
            .borrow()
            .get(key)
            .map(|entry| entry.value.clone());

        match outcome {
            ReadOutcome::Proceed => Ok(value),
            ReadOutcome::Corrupt => {
                self.record_fault();
                match value {
                    Some(value) if !value.is_empty() => Ok(Some(self.flip_one_bit(value))),
                    Some(_) => Err(StorageError::corruption(
                        key,
                        "injected corruption of empty value",
                    )),
                    None => Err(StorageError::corruption(
                        key,
                        "injected corruption of missing key",
                    )),
                }
            }
        }
    }

    /// Remove `key`. Returns true if it existed.
    ///
    /// Deletes share the write fault channel.
    ///
    /// # Errors
    /// `Write` or `DiskFull` when such a fault is injected.
    ///
    /// # Panics
    /// Panics if the key is empty or too long.
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        assert_valid_key(key);

        self.state.counters.borrow_mut().deletes_count += 1;
        self.check_write_fault(key)?;

        let mut entries = self.state.entries.borrow_mut();
        let existed = entries.remove(key).is_some();

        // Postcondition
        assert!(!entries.contains_key(key), "key must not exist after delete");

        Ok(existed)
    }

    /// Whether `key` is present.
    ///
    /// # Errors
    /// `Read` on an injected read failure.
    ///
    /// # Panics
    /// Panics if the key is empty or too long.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        assert_valid_key(key);

        self.state.counters.borrow_mut().reads_count += 1;
        if let ReadOutcome::Corrupt = self.check_read_fault(key)? {
            tracing::trace!(key = key, "Corruption not applicable to exists");
        }

        Ok(self.state.entries.borrow().contains_key(key))
    }

    /// Keys starting with `prefix`, sorted ascending. An empty prefix lists
    /// every key.
    ///
    /// # Errors
    /// `Read` on an injected read failure.
    pub async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.state.counters.borrow_mut().reads_count += 1;
        if let ReadOutcome::Corrupt = self.check_read_fault(prefix)? {
            tracing::trace!(prefix = prefix, "Corruption not applicable to keys");
        }

        let keys: Vec<String> = self
            .state
            .entries
            .borrow()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        // Postcondition
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys must be sorted");

        Ok(keys)
    }

    /// Inspect an entry without consulting faults or touching counters.
    #[must_use]
    pub fn get_entry(&self, key: &str) -> Option<StorageEntry> {
        self.state.entries.borrow().get(key).cloned()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.entries.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.entries.borrow().is_empty()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> StorageStats {
        let counters = self.state.counters.borrow();
        let entries = self.state.entries.borrow();
        StorageStats {
            writes_count: counters.writes_count,
            reads_count: counters.reads_count,
            deletes_count: counters.deletes_count,
            faults_injected_count: counters.faults_injected_count,
            entries_count: entries.len() as u64,
            total_bytes: entries.values().map(|entry| entry.value.len() as u64).sum(),
        }
    }

    /// Zero the operation and fault counters. Stored data is kept and the
    /// fault injector's own counters are not affected.
    pub fn reset_stats(&self) {
        *self.state.counters.borrow_mut() = Counters::default();
    }

    // =========================================================================
    // Fault handling
    // =========================================================================

    fn check_write_fault(&self, key: &str) -> StorageResult<()> {
        let Some(fault) = self.faults.should_inject(OPERATION_STORAGE_WRITE) else {
            return Ok(());
        };

        match fault {
            FaultType::StorageWriteFail => {
                self.record_fault();
                Err(StorageError::write(key, "injected write failure"))
            }
            FaultType::DiskFull => {
                self.record_fault();
                Err(StorageError::disk_full(key, "injected disk full"))
            }
            FaultType::StorageLatency => {
                self.inject_latency();
                Ok(())
            }
            FaultType::StorageReadFail
            | FaultType::StorageCorruption
            | FaultType::DbConnectionFail
            | FaultType::DbQueryTimeout
            | FaultType::DbDeadlock
            | FaultType::DbSerializationFail
            | FaultType::NetworkTimeout
            | FaultType::NetworkPartition
            | FaultType::NetworkPacketLoss
            | FaultType::NetworkDelay
            | FaultType::LlmTimeout
            | FaultType::LlmRateLimit
            | FaultType::LlmContextOverflow
            | FaultType::LlmInvalidResponse
            | FaultType::LlmServiceUnavailable => {
                tracing::trace!(
                    fault = fault.name(),
                    key = key,
                    "Fault not applicable to write path"
                );
                Ok(())
            }
        }
    }

    fn check_read_fault(&self, key: &str) -> StorageResult<ReadOutcome> {
        let Some(fault) = self.faults.should_inject(OPERATION_STORAGE_READ) else {
            return Ok(ReadOutcome::Proceed);
        };

        match fault {
            FaultType::StorageReadFail => {
                self.record_fault();
                Err(StorageError::read(key, "injected read failure"))
            }
            FaultType::StorageCorruption => Ok(ReadOutcome::Corrupt),
            FaultType::StorageLatency => {
                self.inject_latency();
                Ok(ReadOutcome::Proceed)
            }
            FaultType::StorageWriteFail
            | FaultType::DiskFull
            | FaultType::DbConnectionFail
            | FaultType::DbQueryTimeout
            | FaultType::DbDeadlock
            | FaultType::DbSerializationFail
            | FaultType::NetworkTimeout
            | FaultType::NetworkPartition
            | FaultType::NetworkPacketLoss
            | FaultType::NetworkDelay
            | FaultType::LlmTimeout
            | FaultType::LlmRateLimit
            | FaultType::LlmContextOverflow
            | FaultType::LlmInvalidResponse
            | FaultType::LlmServiceUnavailable => {
                tracing::trace!(
                    fault = fault.name(),
                    key = key,
                    "Fault not applicable to read path"
                );
                Ok(ReadOutcome::Proceed)
            }
        }
    }

    fn record_fault(&self) {
        self.state.counters.borrow_mut().faults_injected_count += 1;
    }

    fn inject_latency(&self) {
        let min_ms = i64::try_from(self.latency_ms_min).unwrap_or(i64::MAX);
        let max_ms = i64::try_from(self.latency_ms_max).unwrap_or(i64::MAX);
        let drawn_ms = self.state.rng.borrow_mut().next_int(min_ms, max_ms);
        let delay_ms = u64::try_from(drawn_ms).unwrap_or(0);

        self.record_fault();
        self.clock.advance_ms(delay_ms);
        tracing::debug!(delay_ms = delay_ms, "Injected storage latency");
    }

    /// Flip a single bit chosen by the storage RNG.
    fn flip_one_bit(&self, mut value: Vec<u8>) -> Vec<u8> {
        debug_assert!(!value.is_empty(), "cannot corrupt an empty value");

        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let bit_position = self
            .state
            .rng
            .borrow_mut()
            .next_int(0, (value.len() * 8 - 1) as i64) as usize;
        value[bit_position / 8] ^= 1 << (bit_position % 8);

        tracing::debug!(bit_position = bit_position, "Injected storage corruption");
        value
    }
}

fn assert_valid_key(key: &str) {
    assert!(!key.is_empty(), "key cannot be empty");
    assert!(
        key.len() <= STORAGE_KEY_BYTES_MAX,
        "key {} bytes exceeds max {}",
        key.len(),
        STORAGE_KEY_BYTES_MAX
    );
}

#[async_trait(?Send)]
impl StorageBackend for SimStorage {
    async fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        SimStorage::write(self, key, value).await
    }

    async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        SimStorage::read(self, key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        SimStorage::delete(self, key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        SimStorage::exists(self, key).await
    }

    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        SimStorage::keys(self, prefix).await
    }
}
