//! Durable mirror of the task sequence.
//!
//! Defines the [`KeyValueStore`] boundary (one string document per key)
//! and [`TaskStorage`], the persistence adapter that writes the task
//! sequence under a fixed key.
//!
//! # Failure handling
//!
//! Storage is never allowed to take the session down:
//! 1. `save` and `clear` failures are logged and swallowed; the in-memory
//!    state stays the source of truth.
//! 2. `load` on a missing, unreadable or corrupted document logs and
//!    returns an empty sequence.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use eisenhower_core::codec::{self, STORAGE_KEY};
use eisenhower_core::task::Task;

/// Errors that can occur at the key-value storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading a stored document failed.
    #[error("read failed for {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing or removing a stored document failed.
    #[error("write failed for {path}: {source}")]
    Write {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The key cannot be mapped onto the store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string key-value store holding whole documents.
///
/// Implementations:
/// - [`FileStore`]: one file per key in a data directory
/// - [`MemoryStore`]: process-local map, for tests and dry runs
pub trait KeyValueStore: Send + Sync {
    /// Returns the document for `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the document for `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Persistence adapter for the task sequence.
///
/// Wraps a [`KeyValueStore`] and never returns an error to the caller.
pub struct TaskStorage<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TaskStorage<S> {
    /// Creates an adapter using the default [`STORAGE_KEY`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    /// Creates an adapter writing under a custom key.
    #[must_use]
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The key the task document is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The wrapped store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Writes the task sequence. Failures are logged, never returned.
    pub fn save(&self, tasks: &[Task]) {
        let document = match codec::encode(tasks) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::error!(
                    key = %self.key,
                    error = %err,
                    "failed to encode tasks for storage"
                );
                return;
            }
        };
        match self.store.set(&self.key, &document) {
            Ok(()) => {
                tracing::debug!(key = %self.key, count = tasks.len(), "saved tasks to storage");
            }
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to save tasks to storage");
            }
        }
    }

    /// Reads the task sequence back.
    ///
    /// Returns an empty `Vec` when nothing is stored or the stored document
    /// cannot be read or parsed.
    #[must_use]
    pub fn load(&self) -> Vec<Task> {
        let document = match self.store.get(&self.key) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored tasks");
                return Vec::new();
            }
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to load tasks from storage");
                return Vec::new();
            }
        };
        match codec::decode(&document) {
            Ok(tasks) => tasks,
            Err(err) => {
                tracing::error!(
                    key = %self.key,
                    error = %err,
                    "stored tasks are corrupted, ignoring"
                );
                Vec::new()
            }
        }
    }

    /// Removes the stored document. Failures are logged, never returned.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(&self.key) {
            tracing::error!(key = %self.key, error = %err, "failed to clear storage");
        }
    }
}
