//! The postrender transform
//!
//! ```text
//! stdin ─► split_sections ─► per section:
//!            blank/comments ───────────────────────────► verbatim
//!            parse ─► v1/Secret? ─ no ────────────────► verbatim
//!                         │ yes
//!                         ├─► extract_secret_values
//!                         └─► Converter::convert ─────► ExternalSecret YAML
//!          ─► join_sections ─► stdout
//!          ─► Populator::populate (once, if any Secret was converted)
//! ```
//!
//! A section that fails to parse or convert is reported to the
//! [`DiagnosticSink`] and emitted unchanged, so one bad document never
//! stops the rest of the release from rendering.

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::config::PostrenderConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::{CoreError, Result};
use crate::external_secret::ExternalSecret;
use crate::manifest::{Section, join_sections, split_sections};
use crate::secret::{KindFilter, SecretValues, extract_secret_values, parse_document};

/// Namespace and name of a converted resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace/name`, or just `name` without a namespace
    pub fn key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Rewrites a parsed Secret node into an ExternalSecret in place
pub trait Converter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `path` identifies the document in error messages
    fn convert(&self, node: &mut Value, path: &str) -> std::result::Result<ResourceRef, Self::Error>;
}

/// Extracted values keyed by `namespace/name`
pub type SecretValuesByResource = IndexMap<String, SecretValues>;

/// A converted Secret
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub resource: ResourceRef,
    pub external_secret: ExternalSecret,
    /// Plaintext values found in the original Secret
    pub values: SecretValues,
}

/// Everything the populator needs, borrowed from the transform outcome
#[derive(Debug, Clone, Copy)]
pub struct PopulateRequest<'a> {
    pub results: &'a [ConversionResult],
    pub values: &'a SecretValuesByResource,
}

/// Summary of a populate run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Store keys that received at least one property
    pub keys_written: usize,
    pub properties_written: usize,
    /// Properties already present in the store or with no value to write
    pub properties_skipped: usize,
}

/// Writes extracted values into the external secret store
pub trait Populator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn populate(&self, request: &PopulateRequest<'_>) -> std::result::Result<PopulateReport, Self::Error>;
}

/// Result of a transform run
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// The rewritten manifest stream
    pub output: String,
    /// Converted Secrets in input order
    pub results: Vec<ConversionResult>,
    pub secret_values: SecretValuesByResource,
    /// Sections that failed to parse or convert and were emitted unchanged
    pub failed_sections: usize,
    /// Set when the populator ran successfully
    pub populate_report: Option<PopulateReport>,
}

impl TransformOutcome {
    pub fn secret_count(&self) -> usize {
        self.results.len()
    }
}

enum SectionOutcome {
    Unchanged,
    Converted {
        text: String,
        result: ConversionResult,
    },
}

/// Converts Secrets in a rendered manifest stream into ExternalSecrets
pub struct Postrenderer<'a, C, P> {
    config: &'a PostrenderConfig,
    converter: C,
    populator: P,
    sink: &'a dyn DiagnosticSink,
    filter: KindFilter,
}

impl<'a, C, P> Postrenderer<'a, C, P>
where
    C: Converter,
    P: Populator,
{
    pub fn new(
        config: &'a PostrenderConfig,
        converter: C,
        populator: P,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            config,
            converter,
            populator,
            sink,
            filter: KindFilter::secret(),
        }
    }

    /// Transform a manifest stream
    ///
    /// Never fails: per-section and populate errors go to the sink.
    pub fn transform(&self, text: &str) -> TransformOutcome {
        let mut outcome = TransformOutcome::default();
        let mut texts: Vec<String> = Vec::new();

        for section in split_sections(text) {
            if section.is_blank() {
                texts.push(section.text.to_string());
                continue;
            }

            match self.convert_section(&section) {
                Ok(SectionOutcome::Unchanged) => texts.push(section.text.to_string()),
                Ok(SectionOutcome::Converted { text, result }) => {
                    tracing::debug!(resource = %result.resource, "converted Secret to ExternalSecret");
                    outcome
                        .secret_values
                        .insert(result.resource.key(), result.values.clone());
                    outcome.results.push(result);
                    texts.push(text);
                }
                Err(e) => {
                    self.sink
                        .record(&format!("failed to convert resource: {}", e));
                    outcome.failed_sections += 1;
                    texts.push(section.text.to_string());
                }
            }
        }

        outcome.output = join_sections(&texts);

        if outcome.secret_count() > 0 && !self.config.disable_populate {
            let request = PopulateRequest {
                results: &outcome.results,
                values: &outcome.secret_values,
            };
            match self.populator.populate(&request) {
                Ok(report) => {
                    tracing::info!(
                        keys = report.keys_written,
                        written = report.properties_written,
                        skipped = report.properties_skipped,
                        "populated external secret store"
                    );
                    outcome.populate_report = Some(report);
                }
                Err(e) => self.sink.record(&format!(
                    "ERROR: failed to populate external secret store: {}\n",
                    e
                )),
            }
        }

        outcome
    }

    fn convert_section(&self, section: &Section<'_>) -> Result<SectionOutcome> {
        let path = format!("document {}", section.index);
        let mut node = parse_document(section.text)?;
        if !self.filter.matches(&node) {
            return Ok(SectionOutcome::Unchanged);
        }

        let values = extract_secret_values(&node)?;

        let resource = self
            .converter
            .convert(&mut node, &path)
            .map_err(|e| CoreError::Conversion(e.to_string()))?;

        let text = serde_yaml::to_string(&node)?;
        let external_secret: ExternalSecret = serde_yaml::from_value(node)
            .map_err(|e| CoreError::InvalidExternalSecret(e.to_string()))?;

        Ok(SectionOutcome::Converted {
            text,
            result: ConversionResult {
                resource,
                external_secret,
                values,
            },
        })
    }
}
