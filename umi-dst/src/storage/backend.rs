//! StorageBackend - Key-Value Storage Trait
//!
//! TigerStyle: One five-method surface shared by the simulator and any real
//! adapter, so test code is backend-agnostic.

use async_trait::async_trait;

use super::error::StorageResult;

/// Key-value storage backend.
///
/// Contract every implementation must honour:
/// - `read` of an absent key is `Ok(None)`, not an error.
/// - `delete` reports whether the key existed.
/// - `keys` returns matching keys in ascending order.
///
/// Futures are not required to be `Send`: simulated backends are
/// single-threaded.
#[async_trait(?Send)]
pub trait StorageBackend {
    /// Store `value` under `key`, replacing any previous value.
    async fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Fetch the value under `key`.
    async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Remove `key`. Returns true if it existed.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Whether `key` is present.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Keys starting with `prefix`, sorted ascending.
    async fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
