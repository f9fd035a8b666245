//! jx-secret core - types and pipeline for the Helm secret postrenderer
//!
//! This crate provides the foundational pieces of the postrender hook:
//! - `manifest`: splitting a rendered manifest stream into sections and back
//! - `secret`: detecting `v1/Secret` documents and extracting their values
//! - `external_secret`: the typed `ExternalSecret` resource
//! - `pipeline`: the `Postrenderer` transform and its collaborator traits
//! - `diagnostics`: the best-effort sink for non-fatal errors
//! - `config`: the run configuration read once from the environment

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod external_secret;
pub mod manifest;
pub mod pipeline;
pub mod secret;

pub use config::PostrenderConfig;
pub use diagnostics::{DEFAULT_LOG_FILE, DiagnosticSink, FileSink, MemorySink};
pub use error::{CoreError, Result};
pub use external_secret::{
    EXTERNAL_SECRET_API_VERSION, EXTERNAL_SECRET_KIND, ExternalSecret, ExternalSecretData,
    ExternalSecretSpec, ResourceMetadata,
};
pub use manifest::{
    RESOURCES_SEPARATOR, Section, is_whitespace_or_comments, join_sections, split_sections,
};
pub use pipeline::{
    ConversionResult, Converter, PopulateReport, PopulateRequest, Populator, Postrenderer,
    ResourceRef, SecretValuesByResource, TransformOutcome,
};
pub use secret::{KindFilter, SecretValues, extract_secret_values, parse_document};
