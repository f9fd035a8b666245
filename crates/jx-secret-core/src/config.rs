//! Run configuration
//!
//! The postrenderer is configured through environment variables so it can be
//! driven by `helm --postrender` without extra arguments:
//!
//! | Variable               | Field                 |
//! |------------------------|-----------------------|
//! | `JX_VAULT_MOUNT_POINT` | `vault_mount_point`   |
//! | `JX_VAULT_ROLE`        | `vault_role`          |
//! | `JX_DIR`               | `dir`                 |
//! | `JX_DEFAULT_NAMESPACE` | `default_namespace`   |
//! | `JX_NO_POPULATE`       | `disable_populate`    |

use std::path::PathBuf;

use crate::diagnostics::DEFAULT_LOG_FILE;
use crate::error::{CoreError, Result};

pub const ENV_VAULT_MOUNT_POINT: &str = "JX_VAULT_MOUNT_POINT";
pub const ENV_VAULT_ROLE: &str = "JX_VAULT_ROLE";
pub const ENV_DIR: &str = "JX_DIR";
pub const ENV_DEFAULT_NAMESPACE: &str = "JX_DEFAULT_NAMESPACE";
pub const ENV_NO_POPULATE: &str = "JX_NO_POPULATE";

/// Configuration for a single postrender run
///
/// Built once at entry and passed by reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostrenderConfig {
    /// Vault auth mount point used by generated ExternalSecrets
    pub vault_mount_point: Option<String>,

    /// Vault role used by generated ExternalSecrets
    pub vault_role: Option<String>,

    /// Working directory (secret store root, option validation)
    pub dir: Option<PathBuf>,

    /// Namespace applied to Secrets that don't declare one
    pub default_namespace: Option<String>,

    /// Skip populating the external secret store from inline Secret data
    pub disable_populate: bool,

    /// Append-only log file for non-fatal errors
    pub log_file: PathBuf,
}

impl Default for PostrenderConfig {
    fn default() -> Self {
        Self {
            vault_mount_point: None,
            vault_role: None,
            dir: None,
            default_namespace: None,
            disable_populate: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl PostrenderConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let disable_populate = match get(ENV_NO_POPULATE) {
            Some(value) => parse_bool(ENV_NO_POPULATE, &value)?,
            None => false,
        };

        Ok(Self {
            vault_mount_point: get(ENV_VAULT_MOUNT_POINT),
            vault_role: get(ENV_VAULT_ROLE),
            dir: get(ENV_DIR).map(PathBuf::from),
            default_namespace: get(ENV_DEFAULT_NAMESPACE),
            disable_populate,
            ..Self::default()
        })
    }

    /// Working directory, defaulting to the current directory
    pub fn dir_or_current(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Parse a boolean using the same spellings as Go's `strconv.ParseBool`
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(CoreError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}
