//! jx-secret convert - Secret to ExternalSecret converter
//!
//! Implements [`jx_secret_core::Converter`] for the
//! [kubernetes-external-secrets](https://github.com/external-secrets/kubernetes-external-secrets)
//! Vault backend.
//!
//! # Example
//!
//! ```
//! use jx_secret_convert::{ConvertOptions, ExternalSecretConverter};
//! use jx_secret_core::{Converter, parse_document};
//!
//! let converter = ExternalSecretConverter::new(ConvertOptions::default()).unwrap();
//! let mut node = parse_document(
//!     "apiVersion: v1\nkind: Secret\nmetadata:\n  name: db\nstringData:\n  password: s3cr3t\n",
//! )
//! .unwrap();
//!
//! let resource = converter.convert(&mut node, "document 0").unwrap();
//! assert_eq!(resource.key(), "default/db");
//! assert_eq!(node["kind"].as_str(), Some("ExternalSecret"));
//! ```

pub mod converter;
pub mod error;

pub use converter::{
    ConvertOptions, DEFAULT_NAMESPACE, DEFAULT_VAULT_MOUNT_POINT, DEFAULT_VAULT_ROLE,
    ExternalSecretConverter, VAULT_BACKEND,
};
pub use error::{ConvertError, Result};
