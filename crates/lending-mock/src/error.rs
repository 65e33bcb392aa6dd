//! Error types for the lending-mock crate.
//!
//! This module defines semantic error enums for dataset generation, key-value
//! storage, the persisted user store, the query surface, sessions, and
//! settings, following the project's error handling conventions with
//! `thiserror`.
//!
//! Absence of a record is never an error: lookups return `Option` and status
//! updates return `bool`. Only storage and generation faults surface here.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::session::LoginValidationError;

/// Errors that can occur during dataset generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Failed to produce an identifier not already used in the dataset.
    #[error("failed to generate a unique user id after {max_attempts} attempts")]
    IdGenerationExhausted {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },
}

/// Errors raised by a key-value storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The storage directory could not be opened or created.
    #[error("failed to open storage directory at '{path}': {message}")]
    Open {
        /// Directory path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key '{key}'")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// Reading or writing a key failed.
    #[error("storage I/O failed for key '{key}': {message}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Description of the I/O error.
        message: String,
    },
}

/// Errors raised by the persisted user store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The dataset could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The persisted value does not have the expected shape.
    #[error("persisted value under '{key}' is corrupt: {message}")]
    Corrupt {
        /// Key holding the corrupt value.
        key: String,
        /// Deserialization error message.
        message: String,
    },

    /// The collection could not be serialized for persistence.
    #[error("failed to serialize value for '{key}': {message}")]
    Serialize {
        /// Key the value was destined for.
        key: String,
        /// Serialization error message.
        message: String,
    },
}

/// Errors raised by page requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Pages are numbered from one.
    #[error("page numbers start at 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPerPage,
}

/// Errors surfaced by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// The page request was invalid.
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError),
}

/// Errors raised by the session guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The submitted credentials were rejected.
    #[error(transparent)]
    Invalid(#[from] LoginValidationError),
    /// The session could not be read or written.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Store(StoreError::Storage(err))
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Environment or configuration file values could not be merged.
    #[error("failed to load settings: {message}")]
    Load {
        /// Description of the underlying configuration error.
        message: String,
    },
}
