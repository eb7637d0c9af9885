//! Key/value storage backing the client's persisted state.
//!
//! Values are opaque strings under a handful of fixed keys. Callers decide
//! the encoding; see [`crate::persist`].

mod file;

pub use file::FileStorage;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Fixed keys under which state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Token,
    User,
    Cart,
    Wishlist,
}

impl StorageKey {
    pub const ALL: [Self; 4] = [Self::Token, Self::User, Self::Cart, Self::Wishlist];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::User => "user",
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error for '{key}': {source}")]
    Io {
        key: StorageKey,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage directory unavailable: {0}")]
    Unavailable(String),
}

/// A string store with fixed keys.
pub trait Storage: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<StorageKey, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.values().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.values().remove(&key);
        Ok(())
    }
}
