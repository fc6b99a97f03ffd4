//! Output containers a schema can load into.

use crate::error::{DecodeError, Result};
use crate::value::{Record, Value};

/// A mapping type that a loaded [`Record`] can be converted into.
///
/// Conversions keep every key, value and the field order.
pub trait OutputContainer: Sized {
    /// Convert the record produced by a load.
    fn from_record(record: Record) -> Result<Self>;
}

impl OutputContainer for Record {
    fn from_record(record: Record) -> Result<Self> {
        Ok(record)
    }
}

impl OutputContainer for Value {
    fn from_record(record: Record) -> Result<Self> {
        Ok(Value::Object(record))
    }
}

impl OutputContainer for Vec<(String, Value)> {
    fn from_record(record: Record) -> Result<Self> {
        Ok(record.into_iter().collect())
    }
}

/// JSON has no representation for NaN or infinity, so those are rejected
/// instead of being turned into `null`.
impl OutputContainer for serde_json::Map<String, serde_json::Value> {
    fn from_record(record: Record) -> Result<Self> {
        for (key, value) in &record {
            if has_non_finite(value) {
                return Err(DecodeError::validation(format!(
                    "field '{key}' holds a non-finite float, which JSON cannot represent"
                )));
            }
        }

        match serde_json::to_value(Value::Object(record)) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(DecodeError::validation(format!(
                "record serialized to non-object JSON: {other}"
            ))),
            Err(e) => Err(DecodeError::validation(format!(
                "record cannot be represented as JSON: {e}"
            ))),
        }
    }
}

fn has_non_finite(value: &Value) -> bool {
    match value {
        Value::Float(f) => !f.is_finite(),
        Value::Array(items) => items.iter().any(has_non_finite),
        Value::Object(record) => record.values().any(has_non_finite),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Record {
        let mut record = Record::new();
        record.insert("title".to_string(), Value::from("Empire Burlesque"));
        record.insert("price".to_string(), Value::Float(10.9));
        record.insert("tags".to_string(), Value::from(vec!["rock", "pop"]));
        record
    }

    #[test]
    fn test_pairs_keep_order() {
        let pairs = Vec::<(String, Value)>::from_record(sample()).unwrap();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["title", "price", "tags"]);
    }

    #[test]
    fn test_json_map_keeps_order_and_values() {
        let map = serde_json::Map::<String, serde_json::Value>::from_record(sample()).unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["title", "price", "tags"]);
        assert_eq!(map["price"], serde_json::json!(10.9));
        assert_eq!(map["tags"], serde_json::json!(["rock", "pop"]));
    }

    #[test]
    fn test_json_map_rejects_non_finite_floats() {
        let mut record = sample();
        record.insert("ratio".to_string(), Value::Float(f64::NAN));
        let err = serde_json::Map::<String, serde_json::Value>::from_record(record).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(ref m) if m.contains("'ratio'")));

        let mut nested = Record::new();
        nested.insert("price".to_string(), Value::Float(f64::INFINITY));
        let mut record = sample();
        record.insert("cds".to_string(), Value::from(vec![Value::Object(nested)]));
        assert!(serde_json::Map::<String, serde_json::Value>::from_record(record).is_err());
    }

    #[test]
    fn test_value_wraps_record() {
        let value = Value::from_record(sample()).unwrap();
        assert_eq!(value.as_object().map(Record::len), Some(3));
    }
}
