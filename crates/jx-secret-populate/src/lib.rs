//! jx-secret populate - fills an external secret store from Helm Secret data
//!
//! After the postrenderer converts Secrets into ExternalSecrets, the values
//! that were inline in the chart would be lost. [`StorePopulator`] writes them
//! into the store the ExternalSecrets read from, without overwriting values
//! that are already there.
//!
//! Stores implement [`SecretStore`]:
//! - [`FileSecretStore`]: JSON documents under a local directory
//! - [`MemorySecretStore`]: in-memory, with operation counts for tests

pub mod error;
pub mod populator;
pub mod store;

pub use error::{PopulateError, Result};
pub use populator::StorePopulator;
pub use store::{
    FileSecretStore, MemorySecretStore, OperationCounts, Properties, STORE_DIR, SecretStore,
    validate_key,
};
