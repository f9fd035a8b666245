//! File-based secret store
//!
//! Stores each key as a JSON document in a local directory. Useful for:
//! - Running the postrenderer without a Vault
//! - Inspecting what would be populated
//! - Tests

use std::path::{Path, PathBuf};

use super::{Properties, SecretStore, validate_key};
use crate::error::{PopulateError, Result};

/// Store location relative to the working directory
pub const STORE_DIR: &str = ".jx/secret/store";

/// File-based secret store
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    /// Base directory for stored keys
    base_dir: PathBuf,
}

impl FileSecretStore {
    /// Create a new file store
    ///
    /// Directories are only created when a key is first written.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create a store at [`STORE_DIR`] inside a working directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_DIR))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file holding a key
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        let mut path = self.base_dir.clone();
        let (parents, name) = key.rsplit_once('/').unwrap_or(("", key));
        for segment in parents.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.json", name));
        Ok(path)
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<Properties>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let properties = serde_json::from_str(&content).map_err(|source| {
            PopulateError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(properties))
    }

    fn put(&self, key: &str, properties: &Properties) -> Result<()> {
        let path = self.key_path(key)?;

        if let Some(parent) = path.parent() {
            create_private_dir(parent)?;
        }

        let json = serde_json::to_string_pretty(properties).map_err(|source| {
            PopulateError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        write_private(&path, json.as_bytes())?;
        tracing::debug!(key, path = %path.display(), "wrote secret store key");

        Ok(())
    }
}

/// Create a directory and its parents, owner-only on Unix
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(dir)
    }

    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)
    }
}

/// Write plaintext secret material, readable by the owner only on Unix
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // mode only applies on creation
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(content)
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)
    }
}
