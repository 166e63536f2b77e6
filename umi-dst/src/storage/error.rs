//! Storage errors
//!
//! One taxonomy for real backends and the simulator: a simulated fault and a
//! real I/O failure surface as the same variant, so resilience code written
//! against one is exercised by the other.

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Recoverable storage failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A write or delete did not take effect
    #[error("storage write failed for key '{key}': {message}")]
    Write {
        /// Key being mutated
        key: String,
        /// Failure detail
        message: String,
    },

    /// A read, existence check or listing failed
    #[error("storage read failed for key '{key}': {message}")]
    Read {
        /// Key being read (or prefix for listings)
        key: String,
        /// Failure detail
        message: String,
    },

    /// Stored data could not be returned intact
    #[error("storage corruption for key '{key}': {message}")]
    Corruption {
        /// Key being read
        key: String,
        /// Failure detail
        message: String,
    },

    /// No space left for the mutation
    #[error("storage disk full writing key '{key}': {message}")]
    DiskFull {
        /// Key being mutated
        key: String,
        /// Failure detail
        message: String,
    },
}

impl StorageError {
    /// Create a write error.
    pub fn write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a read error.
    pub fn read(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a corruption error.
    pub fn corruption(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corruption {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a disk-full error.
    pub fn disk_full(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DiskFull {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Key the failed operation targeted.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Write { key, .. }
            | Self::Read { key, .. }
            | Self::Corruption { key, .. }
            | Self::DiskFull { key, .. } => key,
        }
    }

    /// Whether the failed operation was a mutation.
    #[must_use]
    pub fn is_write_path(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::DiskFull { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_and_display() {
        let err = StorageError::write("k", "injected");
        assert_eq!(err.to_string(), "storage write failed for key 'k': injected");
        assert_eq!(err.key(), "k");
        assert!(err.is_write_path());

        let err = StorageError::corruption("c", "bit flip");
        assert_eq!(err.to_string(), "storage corruption for key 'c': bit flip");
        assert!(!err.is_write_path());
    }

    #[test]
    fn test_variants_are_distinct() {
        assert_ne!(StorageError::read("k", "x"), StorageError::write("k", "x"));
        assert!(StorageError::disk_full("k", "x").is_write_path());
        assert!(!StorageError::read("k", "x").is_write_path());
    }
}
