//! Secret store backends
//!
//! A store maps a key (e.g. `secret/data/jx/db`) to a set of string
//! properties, mirroring the shape of a Vault KV secret.

mod file;
mod memory;

pub use file::{FileSecretStore, STORE_DIR};
pub use memory::{MemorySecretStore, OperationCounts};

use indexmap::IndexMap;

use crate::error::{PopulateError, Result};

/// Properties stored under one key
pub type Properties = IndexMap<String, String>;

/// Facade over an external secret store
pub trait SecretStore {
    /// Read the properties of a key, `None` if the key doesn't exist
    fn get(&self, key: &str) -> Result<Option<Properties>>;

    /// Replace the properties of a key
    fn put(&self, key: &str, properties: &Properties) -> Result<()>;
}

impl<S: SecretStore + ?Sized> SecretStore for &S {
    fn get(&self, key: &str) -> Result<Option<Properties>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, properties: &Properties) -> Result<()> {
        (**self).put(key, properties)
    }
}

/// Check a key is a relative path of non-empty, non-dot segments
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| PopulateError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('/') {
        return Err(invalid("key must be relative"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid("key contains an empty segment")),
            "." | ".." => return Err(invalid("key contains a relative segment")),
            s if s.contains('\\') => return Err(invalid("key contains a backslash")),
            _ => {}
        }
    }
    Ok(())
}
