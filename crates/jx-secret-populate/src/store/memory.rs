//! In-memory secret store
//!
//! Keeps keys in a shared map, useful for unit tests and dry runs.
//! Clones share the same data.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{Properties, SecretStore, validate_key};
use crate::error::{PopulateError, Result};

/// In-memory secret store
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    store: Arc<RwLock<HashMap<String, Properties>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub puts: usize,
}

impl MemorySecretStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated keys
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (String, Properties)>,
    {
        let store = Self::new();
        store
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(keys);
        store
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of every stored key
    pub fn snapshot(&self) -> HashMap<String, Properties> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, f: impl FnOnce(&mut OperationCounts)) {
        let mut ops = self.operations.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *ops);
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<Properties>> {
        validate_key(key)?;
        self.count(|ops| ops.gets += 1);

        let store = self
            .store
            .read()
            .map_err(|e| PopulateError::Store(e.to_string()))?;
        Ok(store.get(key).cloned())
    }

    fn put(&self, key: &str, properties: &Properties) -> Result<()> {
        validate_key(key)?;
        self.count(|ops| ops.puts += 1);

        let mut store = self
            .store
            .write()
            .map_err(|e| PopulateError::Store(e.to_string()))?;
        store.insert(key.to_string(), properties.clone());
        Ok(())
    }
}
