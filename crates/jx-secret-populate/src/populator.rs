//! Lazy population of a secret store
//!
//! Every ExternalSecret data entry points at a store key and property. For
//! each entry the populator looks up the value the Helm chart put in the
//! original Secret and writes it, unless the store already holds a value.
//! Existing values always win so a re-install never clobbers rotated secrets.

use indexmap::IndexMap;

use jx_secret_core::{PopulateReport, PopulateRequest, Populator};

use crate::error::{PopulateError, Result};
use crate::store::{Properties, SecretStore};

/// Populates any [`SecretStore`] from converted Secrets
#[derive(Debug, Clone)]
pub struct StorePopulator<S> {
    store: S,
}

impl<S: SecretStore> StorePopulator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Values to write, grouped by store key
    fn pending_values(
        request: &PopulateRequest<'_>,
        report: &mut PopulateReport,
    ) -> IndexMap<String, Properties> {
        let mut pending: IndexMap<String, Properties> = IndexMap::new();

        for result in request.results {
            let values = request.values.get(&result.resource.key());
            for entry in &result.external_secret.spec.data {
                // values are keyed by Secret field, the store by property
                match values.and_then(|v| v.get(&entry.name)) {
                    Some(value) => {
                        pending
                            .entry(entry.key.clone())
                            .or_default()
                            .insert(entry.property_or_name().to_string(), value.clone());
                    }
                    None => {
                        tracing::debug!(
                            resource = %result.resource,
                            field = %entry.name,
                            "no value in chart, leaving store untouched"
                        );
                        report.properties_skipped += 1;
                    }
                }
            }
        }

        pending
    }
}

impl<S: SecretStore> Populator for StorePopulator<S> {
    type Error = PopulateError;

    fn populate(&self, request: &PopulateRequest<'_>) -> Result<PopulateReport> {
        let mut report = PopulateReport::default();

        for (key, wanted) in Self::pending_values(request, &mut report) {
            let mut current = self.store.get(&key)?.unwrap_or_default();
            let mut written = 0;

            for (property, value) in wanted {
                if current.get(&property).is_some_and(|v| !v.is_empty()) {
                    report.properties_skipped += 1;
                    continue;
                }
                current.insert(property, value);
                written += 1;
            }

            if written > 0 {
                self.store.put(&key, &current)?;
                tracing::info!(key = %key, properties = written, "populated secret store key");
                report.keys_written += 1;
                report.properties_written += written;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileSecretStore, MemorySecretStore, OperationCounts};
    use jx_secret_core::{
        ConversionResult, ExternalSecret, ExternalSecretData, ResourceRef, SecretValues,
        SecretValuesByResource,
    };
    use tempfile::TempDir;

    fn external_secret(namespace: &str, name: &str, fields: &[&str]) -> ExternalSecret {
        let yaml = format!(
            "apiVersion: kubernetes-client.io/v1\nkind: ExternalSecret\nmetadata:\n  name: {name}\n  namespace: {namespace}\n"
        );
        let mut es: ExternalSecret = serde_yaml::from_str(&yaml).unwrap();
        es.spec.data = fields
            .iter()
            .map(|f| ExternalSecretData {
                name: f.to_string(),
                key: format!("secret/data/{namespace}/{name}"),
                property: Some(f.to_string()),
            })
            .collect();
        es
    }

    fn values(pairs: &[(&str, &str)]) -> SecretValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn result(namespace: &str, name: &str, fields: &[&str], vals: SecretValues) -> ConversionResult {
        ConversionResult {
            resource: ResourceRef::new(namespace, name),
            external_secret: external_secret(namespace, name, fields),
            values: vals,
        }
    }

    fn by_resource(results: &[ConversionResult]) -> SecretValuesByResource {
        results
            .iter()
            .map(|r| (r.resource.key(), r.values.clone()))
            .collect()
    }

    #[test]
    fn test_populates_empty_store() {
        let results = vec![result(
            "jx",
            "db",
            &["username", "password"],
            values(&[("username", "admin"), ("password", "s3cr3t")]),
        )];
        let all = by_resource(&results);
        let store = MemorySecretStore::new();
        let populator = StorePopulator::new(store.clone());

        let report = populator
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(
            report,
            PopulateReport {
                keys_written: 1,
                properties_written: 2,
                properties_skipped: 0,
            }
        );
        let snapshot = store.snapshot();
        let stored = &snapshot["secret/data/jx/db"];
        assert_eq!(stored["username"], "admin");
        assert_eq!(stored["password"], "s3cr3t");
    }

    #[test]
    fn test_existing_values_are_kept() {
        let existing: Properties = values(&[("password", "rotated"), ("username", "")]);
        let store = MemorySecretStore::with_keys([("secret/data/jx/db".to_string(), existing)]);
        let results = vec![result(
            "jx",
            "db",
            &["username", "password"],
            values(&[("username", "admin"), ("password", "from-chart")]),
        )];
        let all = by_resource(&results);

        let report = StorePopulator::new(store.clone())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(report.properties_written, 1);
        assert_eq!(report.properties_skipped, 1);
        let snapshot = store.snapshot();
        let stored = &snapshot["secret/data/jx/db"];
        assert_eq!(stored["password"], "rotated");
        assert_eq!(stored["username"], "admin");
    }

    #[test]
    fn test_fully_populated_key_is_not_rewritten() {
        let store = MemorySecretStore::with_keys([(
            "secret/data/jx/db".to_string(),
            values(&[("password", "already")]),
        )]);
        let results = vec![result("jx", "db", &["password"], values(&[("password", "x")]))];
        let all = by_resource(&results);

        let report = StorePopulator::new(store.clone())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(report.keys_written, 0);
        assert_eq!(store.operation_counts(), OperationCounts { gets: 1, puts: 0 });
    }

    #[test]
    fn test_fields_without_values_are_skipped() {
        let results = vec![result("jx", "db", &["password", "token"], values(&[("password", "p")]))];
        let all = by_resource(&results);
        let store = MemorySecretStore::new();

        let report = StorePopulator::new(store.clone())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(report.properties_written, 1);
        assert_eq!(report.properties_skipped, 1);
        assert!(!store.snapshot()["secret/data/jx/db"].contains_key("token"));
    }

    #[test]
    fn test_property_differs_from_field_name() {
        let mut renamed = result("jx", "db", &["password"], values(&[("password", "p")]));
        renamed.external_secret.spec.data[0].property = Some("db-password".to_string());
        let results = vec![renamed];
        let all = by_resource(&results);
        let store = MemorySecretStore::new();

        let report = StorePopulator::new(store.clone())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(report.properties_written, 1);
        let snapshot = store.snapshot();
        let stored = &snapshot["secret/data/jx/db"];
        assert_eq!(stored["db-password"], "p");
        assert!(!stored.contains_key("password"));
    }

    #[test]
    fn test_many_secrets_many_keys() {
        let results = vec![
            result("jx", "a", &["k"], values(&[("k", "1")])),
            result("jx", "b", &["k"], values(&[("k", "2")])),
        ];
        let all = by_resource(&results);
        let store = MemorySecretStore::new();

        let report = StorePopulator::new(store.clone())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        assert_eq!(report.keys_written, 2);
        let snapshot = store.snapshot();
        assert_eq!(snapshot["secret/data/jx/a"]["k"], "1");
        assert_eq!(snapshot["secret/data/jx/b"]["k"], "2");
    }

    #[test]
    fn test_invalid_key_fails() {
        let mut bad = result("jx", "db", &["k"], values(&[("k", "v")]));
        bad.external_secret.spec.data[0].key = "/absolute".to_string();
        let results = vec![bad];
        let all = by_resource(&results);

        let err = StorePopulator::new(MemorySecretStore::new())
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap_err();
        assert!(matches!(err, PopulateError::InvalidKey { .. }));
    }

    #[test]
    fn test_file_store_end_to_end() {
        let dir = TempDir::new().unwrap();
        let store = FileSecretStore::in_dir(dir.path());
        let results = vec![result("jx", "db", &["password"], values(&[("password", "p")]))];
        let all = by_resource(&results);

        StorePopulator::new(&store)
            .populate(&PopulateRequest {
                results: &results,
                values: &all,
            })
            .unwrap();

        let stored = store.get("secret/data/jx/db").unwrap().unwrap();
        assert_eq!(stored["password"], "p");
    }
}
