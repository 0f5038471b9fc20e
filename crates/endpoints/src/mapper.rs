//! FlattenMapper - expvar JSON to dot-joined typed values

use contracts::{ContractError, Mapper, MetricValue, TypedValue};
use serde_json::Value;

/// Flattens nested JSON objects into dot-joined keys
///
/// `{"memstats": {"Alloc": 42}}` with prefix `app` becomes
/// `app.memstats.Alloc = Int(42)`. Array elements get their index as a key
/// segment. Nulls are dropped.
#[derive(Debug, Clone, Default)]
pub struct FlattenMapper;

impl FlattenMapper {
    pub fn new() -> Self {
        Self
    }

    fn flatten(key: &str, value: &Value, out: &mut Vec<TypedValue>) {
        match value {
            Value::Null => {}
            Value::Bool(b) => out.push(TypedValue::new(key, MetricValue::Bool(*b))),
            Value::Number(n) => {
                let value = match n.as_i64() {
                    Some(i) => MetricValue::Int(i),
                    None => MetricValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                };
                out.push(TypedValue::new(key, value));
            }
            Value::String(s) => out.push(TypedValue::new(key, MetricValue::Text(s.clone()))),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    Self::flatten(&format!("{key}.{i}"), item, out);
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    Self::flatten(&format!("{key}.{k}"), v, out);
                }
            }
        }
    }
}

impl Mapper for FlattenMapper {
    fn values(&self, prefix: &str, payload: &[u8]) -> Result<Vec<TypedValue>, ContractError> {
        let root: Value = serde_json::from_slice(payload)
            .map_err(|e| ContractError::transform(prefix, e.to_string()))?;

        let mut out = Vec::new();
        match &root {
            Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    Self::flatten(&key, v, &mut out);
                }
            }
            _ => {
                return Err(ContractError::transform(
                    prefix,
                    "top-level payload is not a JSON object",
                ))
            }
        }
        Ok(out)
    }

    fn boxed_clone(&self) -> Box<dyn Mapper> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values_of(payload: &str) -> Vec<TypedValue> {
        FlattenMapper::new().values("app", payload.as_bytes()).unwrap()
    }

    #[test]
    fn test_nested_object_flattens_with_prefix() {
        let values = values_of(r#"{"memstats": {"Alloc": 42, "HeapSys": 7.5}}"#);
        assert_eq!(
            values,
            vec![
                TypedValue::new("app.memstats.Alloc", MetricValue::Int(42)),
                TypedValue::new("app.memstats.HeapSys", MetricValue::Float(7.5)),
            ]
        );
    }

    #[test]
    fn test_scalar_types() {
        let values = values_of(r#"{"up": true, "version": "1.2.3", "goroutines": 12}"#);
        assert!(values.contains(&TypedValue::new("app.up", MetricValue::Bool(true))));
        assert!(values.contains(&TypedValue::new(
            "app.version",
            MetricValue::Text("1.2.3".to_string())
        )));
        assert!(values.contains(&TypedValue::new("app.goroutines", MetricValue::Int(12))));
    }

    #[test]
    fn test_array_elements_get_index_segments() {
        let values = values_of(r#"{"pauses": [10, 20]}"#);
        assert_eq!(
            values,
            vec![
                TypedValue::new("app.pauses.0", MetricValue::Int(10)),
                TypedValue::new("app.pauses.1", MetricValue::Int(20)),
            ]
        );
    }

    #[test]
    fn test_nulls_dropped() {
        let values = values_of(r#"{"gone": null, "kept": 1}"#);
        assert_eq!(
            values,
            vec![TypedValue::new("app.kept", MetricValue::Int(1))]
        );
    }

    #[test]
    fn test_malformed_payload_is_transform_error() {
        let err = FlattenMapper::new()
            .values("app", b"not json")
            .unwrap_err();
        assert!(matches!(err, ContractError::Transform { reader, .. } if reader == "app"));
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = FlattenMapper::new().values("app", b"[1, 2]").unwrap_err();
        assert!(matches!(err, ContractError::Transform { .. }));
    }

    #[test]
    fn test_empty_prefix_keeps_bare_keys() {
        let values = FlattenMapper::new().values("", br#"{"x": 1}"#).unwrap();
        assert_eq!(values, vec![TypedValue::new("x", MetricValue::Int(1))]);
    }
}
