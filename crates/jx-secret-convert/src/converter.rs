//! Secret to ExternalSecret conversion
//!
//! A Secret such as
//!
//! ```yaml
//! apiVersion: v1
//! kind: Secret
//! metadata:
//!   name: db
//!   namespace: jx
//! type: Opaque
//! stringData:
//!   password: s3cr3t
//! ```
//!
//! becomes an ExternalSecret reading every field from one Vault key named
//! after the Secret:
//!
//! ```yaml
//! apiVersion: kubernetes-client.io/v1
//! kind: ExternalSecret
//! metadata:
//!   name: db
//!   namespace: jx
//! spec:
//!   backendType: vault
//!   vaultMountPoint: kubernetes
//!   vaultRole: vault-infra
//!   data:
//!   - name: password
//!     key: secret/data/jx/db
//!     property: password
//!   template:
//!     type: Opaque
//! ```
//!
//! Secret values never reach the converted document.

use indexmap::IndexSet;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

use jx_secret_core::{
    Converter, EXTERNAL_SECRET_API_VERSION, EXTERNAL_SECRET_KIND, ExternalSecret,
    ExternalSecretData, ExternalSecretSpec, PostrenderConfig, ResourceMetadata, ResourceRef,
};

use crate::error::{ConvertError, Result};

pub const DEFAULT_VAULT_MOUNT_POINT: &str = "kubernetes";
pub const DEFAULT_VAULT_ROLE: &str = "vault-infra";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const VAULT_BACKEND: &str = "vault";

/// Options for the converter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub vault_mount_point: String,
    pub vault_role: String,
    /// Namespace for Secrets that don't declare one
    pub default_namespace: String,
    pub dir: Option<PathBuf>,
}

impl ConvertOptions {
    pub fn from_config(config: &PostrenderConfig) -> Self {
        Self {
            vault_mount_point: config.vault_mount_point.clone().unwrap_or_default(),
            vault_role: config.vault_role.clone().unwrap_or_default(),
            default_namespace: config.default_namespace.clone().unwrap_or_default(),
            dir: config.dir.clone(),
        }
    }

    /// Fill in defaults and check the working directory exists
    pub fn validate(&mut self) -> Result<()> {
        if self.vault_mount_point.is_empty() {
            self.vault_mount_point = DEFAULT_VAULT_MOUNT_POINT.to_string();
        }
        if self.vault_role.is_empty() {
            self.vault_role = DEFAULT_VAULT_ROLE.to_string();
        }
        if self.default_namespace.is_empty() {
            self.default_namespace = DEFAULT_NAMESPACE.to_string();
        }
        if let Some(dir) = &self.dir {
            if !dir.is_dir() {
                return Err(ConvertError::DirectoryNotFound(dir.clone()));
            }
        }
        Ok(())
    }
}

/// Converts `v1/Secret` nodes into Vault-backed ExternalSecrets
#[derive(Debug, Clone)]
pub struct ExternalSecretConverter {
    options: ConvertOptions,
}

impl ExternalSecretConverter {
    /// Create a converter, validating the options
    pub fn new(mut options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Vault key holding the values of a Secret
    pub fn vault_key(namespace: &str, name: &str) -> String {
        format!("secret/data/{}/{}", namespace, name)
    }

    /// Build the ExternalSecret for a Secret node without modifying it
    pub fn to_external_secret(&self, node: &Value, path: &str) -> Result<ExternalSecret> {
        let metadata = node.get("metadata");

        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ConvertError::MissingName {
                path: path.to_string(),
            })?
            .to_string();

        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.options.default_namespace)
            .to_string();

        let labels = string_map(metadata, "labels", path)?;
        let annotations = string_map(metadata, "annotations", path)?;
        let secret_type = node.get("type").and_then(Value::as_str);

        let key = Self::vault_key(&namespace, &name);
        let data = data_fields(node, path)?
            .into_iter()
            .map(|field| ExternalSecretData {
                key: key.clone(),
                property: Some(field.clone()),
                name: field,
            })
            .collect();

        Ok(ExternalSecret {
            api_version: EXTERNAL_SECRET_API_VERSION.to_string(),
            kind: EXTERNAL_SECRET_KIND.to_string(),
            metadata: ResourceMetadata {
                name: Some(name),
                namespace: Some(namespace),
                labels: labels.clone(),
                annotations: annotations.clone(),
            },
            spec: ExternalSecretSpec {
                backend_type: Some(VAULT_BACKEND.to_string()),
                vault_mount_point: Some(self.options.vault_mount_point.clone()),
                vault_role: Some(self.options.vault_role.clone()),
                data,
                template: secret_template(secret_type, labels, annotations),
            },
        })
    }
}

impl Converter for ExternalSecretConverter {
    type Error = ConvertError;

    fn convert(&self, node: &mut Value, path: &str) -> Result<ResourceRef> {
        let external_secret = self.to_external_secret(node, path)?;
        let resource = ResourceRef::new(external_secret.namespace(), external_secret.name());
        *node = serde_yaml::to_value(&external_secret)?;
        tracing::debug!(
            resource = %resource,
            fields = external_secret.spec.data.len(),
            "built ExternalSecret"
        );
        Ok(resource)
    }
}

/// Field names of `data` then `stringData`, without duplicates
fn data_fields(node: &Value, path: &str) -> Result<IndexSet<String>> {
    let mut fields = IndexSet::new();
    for data_path in ["data", "stringData"] {
        let Some(data) = node.get(data_path).filter(|d| !d.is_null()) else {
            continue;
        };
        let mapping = data.as_mapping().ok_or_else(|| ConvertError::InvalidField {
            path: path.to_string(),
            field: data_path.to_string(),
            message: "expected a mapping".to_string(),
        })?;
        for key in mapping.keys() {
            let field = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(ConvertError::InvalidField {
                        path: path.to_string(),
                        field: data_path.to_string(),
                        message: "field names must be scalars".to_string(),
                    });
                }
            };
            fields.insert(field);
        }
    }
    Ok(fields)
}

fn string_map(
    metadata: Option<&Value>,
    field: &str,
    path: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    match metadata.and_then(|m| m.get(field)) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConvertError::InvalidField {
                path: path.to_string(),
                field: format!("metadata.{}", field),
                message: e.to_string(),
            }),
    }
}

/// Template applied to the Secret generated by the operator
fn secret_template(
    secret_type: Option<&str>,
    labels: Option<BTreeMap<String, String>>,
    annotations: Option<BTreeMap<String, String>>,
) -> Option<Value> {
    let mut metadata = Mapping::new();
    if let Some(labels) = labels {
        metadata.insert("labels".into(), to_mapping(labels));
    }
    if let Some(annotations) = annotations {
        metadata.insert("annotations".into(), to_mapping(annotations));
    }

    let mut template = Mapping::new();
    if let Some(secret_type) = secret_type {
        template.insert("type".into(), secret_type.into());
    }
    if !metadata.is_empty() {
        template.insert("metadata".into(), Value::Mapping(metadata));
    }

    if template.is_empty() {
        None
    } else {
        Some(Value::Mapping(template))
    }
}

fn to_mapping(map: BTreeMap<String, String>) -> Value {
    Value::Mapping(
        map.into_iter()
            .map(|(k, v)| (Value::String(k), Value::String(v)))
            .collect(),
    )
}
