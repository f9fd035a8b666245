//! Typed `ExternalSecret` resource
//!
//! Only the fields the postrenderer and the populator read are typed;
//! `template` is kept as raw YAML so converters can put anything there.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API version of kubernetes-external-secrets resources
pub const EXTERNAL_SECRET_API_VERSION: &str = "kubernetes-client.io/v1";

/// Kind of kubernetes-external-secrets resources
pub const EXTERNAL_SECRET_KIND: &str = "ExternalSecret";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecret {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ResourceMetadata,
    #[serde(default)]
    pub spec: ExternalSecretSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_mount_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_role: Option<String>,
    #[serde(default)]
    pub data: Vec<ExternalSecretData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<serde_yaml::Value>,
}

/// One Secret field backed by a property of an external store key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSecretData {
    /// Field name in the generated Secret
    pub name: String,
    /// Key (path) in the external store
    pub key: String,
    /// Property of the key holding the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl ExternalSecretData {
    /// Property holding the value, falling back to the field name
    pub fn property_or_name(&self) -> &str {
        self.property.as_deref().unwrap_or(&self.name)
    }
}

impl ExternalSecret {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }
}
