//! Secret detection and value extraction

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{CoreError, Result};

/// Plaintext values of a Secret, keyed by data field name
pub type SecretValues = IndexMap<String, String>;

/// Matches resources by `apiVersion` and `kind`
///
/// Parsed from `<apiVersion>/<kind>` (e.g. `v1/Secret`, `apps/v1/Deployment`)
/// or a bare `<kind>` which matches any API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFilter {
    pub api_version: Option<String>,
    pub kind: String,
}

impl KindFilter {
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once('/') {
            Some((api_version, kind)) => Self {
                api_version: Some(api_version.to_string()),
                kind: kind.to_string(),
            },
            None => Self {
                api_version: None,
                kind: text.to_string(),
            },
        }
    }

    /// Filter for core `v1/Secret` resources
    pub fn secret() -> Self {
        Self::parse("v1/Secret")
    }

    pub fn matches(&self, node: &Value) -> bool {
        let kind = node.get("kind").and_then(Value::as_str);
        if kind != Some(self.kind.as_str()) {
            return false;
        }
        match &self.api_version {
            Some(api_version) => {
                node.get("apiVersion").and_then(Value::as_str) == Some(api_version.as_str())
            }
            None => true,
        }
    }
}

/// Parse a single manifest section as a generic YAML node
pub fn parse_document(text: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(text)?)
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    Base64,
    Plain,
}

/// Extract plaintext values from a Secret's `data` and `stringData`
///
/// `data` is read first and `stringData` second, so `stringData` wins when
/// both define the same field. Empty values are skipped. `data` values are
/// base64 decoded; values that aren't base64 of UTF-8 text are skipped.
pub fn extract_secret_values(node: &Value) -> Result<SecretValues> {
    let mut values = SecretValues::new();

    for (data_path, encoding) in [("data", Encoding::Base64), ("stringData", Encoding::Plain)] {
        let Some(data) = node.get(data_path) else {
            continue;
        };
        if data.is_null() {
            continue;
        }
        let fields = data.as_mapping().ok_or_else(|| CoreError::InvalidSecretData {
            field: data_path.to_string(),
            message: "expected a mapping".to_string(),
        })?;

        for (key, value) in fields {
            let field = scalar_to_string(key).ok_or_else(|| CoreError::InvalidSecretData {
                field: data_path.to_string(),
                message: "field names must be scalars".to_string(),
            })?;
            let Some(raw) = scalar_to_string(value) else {
                tracing::debug!(field = %field, "skipping non-scalar secret value");
                continue;
            };
            if raw.is_empty() {
                continue;
            }

            let plain = match encoding {
                Encoding::Plain => raw,
                Encoding::Base64 => match decode_base64(&field, &raw) {
                    Some(text) => text,
                    None => continue,
                },
            };
            values.insert(field, plain);
        }
    }

    Ok(values)
}

fn decode_base64(field: &str, encoded: &str) -> Option<String> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = match STANDARD.decode(cleaned.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                field = %field,
                error = %e,
                "secret value is not valid base64, not populating it"
            );
            return None;
        }
    };

    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::warn!(field = %field, "secret value is not UTF-8 text, not populating it");
            None
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Value {
        parse_document(text).unwrap()
    }

    #[test]
    fn test_kind_filter_parse() {
        assert_eq!(
            KindFilter::parse("v1/Secret"),
            KindFilter {
                api_version: Some("v1".to_string()),
                kind: "Secret".to_string()
            }
        );
        assert_eq!(
            KindFilter::parse("apps/v1/Deployment").api_version.as_deref(),
            Some("apps/v1")
        );
        assert_eq!(KindFilter::parse("Secret").api_version, None);
    }

    #[test]
    fn test_secret_filter_matches() {
        let filter = KindFilter::secret();
        assert!(filter.matches(&doc("apiVersion: v1\nkind: Secret\n")));
        assert!(!filter.matches(&doc("apiVersion: v1\nkind: ConfigMap\n")));
        assert!(!filter.matches(&doc(
            "apiVersion: kubernetes-client.io/v1\nkind: Secret\n"
        )));
        assert!(!filter.matches(&doc("kind: Secret\n")));
        assert!(!filter.matches(&doc("- a\n- b\n")));
    }

    #[test]
    fn test_kind_only_filter() {
        let filter = KindFilter::parse("Secret");
        assert!(filter.matches(&doc("apiVersion: whatever/v2\nkind: Secret\n")));
    }

    #[test]
    fn test_parse_document_error() {
        assert!(parse_document("a: [unclosed\n").is_err());
    }

    #[test]
    fn test_extract_string_data() {
        let node = doc("apiVersion: v1\nkind: Secret\nstringData:\n  password: abc\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["password"], "abc");
    }

    #[test]
    fn test_extract_data_is_decoded() {
        // "admin" / "s3cr3t"
        let node = doc("kind: Secret\ndata:\n  username: YWRtaW4=\n  password: czNjcjN0\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["username"], "admin");
        assert_eq!(values["password"], "s3cr3t");
    }

    #[test]
    fn test_string_data_overrides_data() {
        let node = doc(
            "kind: Secret\ndata:\n  token: ZnJvbS1kYXRh\n  other: eA==\nstringData:\n  token: from-string-data\n",
        );
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["token"], "from-string-data");
        assert_eq!(values["other"], "x");
        let keys: Vec<_> = values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["token", "other"]);
    }

    #[test]
    fn test_empty_values_skipped() {
        let node = doc("kind: Secret\ndata:\n  a: \"\"\n  b: ~\nstringData:\n  c: \"\"\n  d: v\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["d"], "v");
    }

    #[test]
    fn test_empty_string_data_keeps_data_value() {
        let node = doc("kind: Secret\ndata:\n  a: eA==\nstringData:\n  a: \"\"\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["a"], "x");
    }

    #[test]
    fn test_scalars_are_stringified() {
        let node = doc("kind: Secret\nstringData:\n  port: 5432\n  enabled: true\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["port"], "5432");
        assert_eq!(values["enabled"], "true");
    }

    #[test]
    fn test_multiline_base64() {
        let node = doc("kind: Secret\ndata:\n  cert: |\n    aGVsbG8g\n    d29ybGQ=\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["cert"], "hello world");
    }

    #[test]
    fn test_invalid_base64_skipped() {
        let node = doc("kind: Secret\ndata:\n  bad: \"not base64!\"\n  good: YQ==\n");
        let values = extract_secret_values(&node).unwrap();
        assert!(!values.contains_key("bad"));
        assert_eq!(values["good"], "a");
    }

    #[test]
    fn test_invalid_base64_falls_back_to_string_data() {
        let node = doc("kind: Secret\ndata:\n  token: \"%%%\"\nstringData:\n  token: plain\n");
        let values = extract_secret_values(&node).unwrap();
        assert_eq!(values["token"], "plain");
    }

    #[test]
    fn test_binary_data_skipped() {
        // 0xff 0xfe is not valid UTF-8
        let node = doc("kind: Secret\ndata:\n  keystore: //4=\n  user: YQ==\n");
        let values = extract_secret_values(&node).unwrap();
        assert!(!values.contains_key("keystore"));
        assert_eq!(values["user"], "a");
    }

    #[test]
    fn test_data_must_be_mapping() {
        let node = doc("kind: Secret\ndata:\n  - a\n");
        assert!(extract_secret_values(&node).is_err());
    }

    #[test]
    fn test_no_data() {
        let node = doc("kind: Secret\nmetadata:\n  name: empty\n");
        assert!(extract_secret_values(&node).unwrap().is_empty());
    }
}
