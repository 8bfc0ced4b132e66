//! Document normalization before INSERT generation.
//!
//! Array-valued fields have no relational counterpart, so each array is
//! replaced by a single string holding its JSON text. Nested documents are
//! normalized recursively and stay nested; if one reaches an INSERT the
//! literal formatter writes it as JSON text using the same rules.
//!
//! JSON rendering rules:
//! - Objects keep field order
//! - ObjectId: `{"$oid": "<24 hex>"}`
//! - DateTime: `{"$date": "<RFC 3339, ms, UTC>"}`
//! - Binary: `{"$binary": "<uppercase hex>"}`
//! - Guid: `{"$uuid": "<hyphenated>"}`
//! - Decimal: `{"$numberDecimal": "<text>"}`
//! - Non-finite doubles: the strings `"NaN"`, `"Infinity"`, `"-Infinity"`

use chrono::SecondsFormat;
use serde_json::{json, Map, Number, Value};

use crate::core::{Document, DocumentValue};

/// Replace array fields with their JSON text, recursing into nested documents.
pub fn normalize(document: &Document) -> Document {
    document
        .iter()
        .map(|(name, value)| {
            let normalized = match value {
                DocumentValue::Array(items) => DocumentValue::String(array_to_json(items)),
                DocumentValue::Document(nested) => DocumentValue::Document(normalize(nested)),
                other => other.clone(),
            };
            (name, normalized)
        })
        .collect()
}

/// Serialize an array to its JSON text.
pub fn array_to_json(items: &[DocumentValue]) -> String {
    Value::Array(items.iter().map(to_json).collect()).to_string()
}

/// Serialize a document to its JSON text.
pub fn document_to_json(document: &Document) -> String {
    document_value(document).to_string()
}

fn document_value(document: &Document) -> Value {
    let mut map = Map::with_capacity(document.len());
    for (name, value) in document.iter() {
        map.insert(name.to_string(), to_json(value));
    }
    Value::Object(map)
}

fn to_json(value: &DocumentValue) -> Value {
    match value {
        DocumentValue::Null => Value::Null,
        DocumentValue::String(s) => Value::String(s.clone()),
        DocumentValue::Int32(v) => Value::from(*v),
        DocumentValue::Int64(v) => Value::from(*v),
        DocumentValue::Double(v) => match Number::from_f64(*v) {
            Some(n) => Value::Number(n),
            None if v.is_nan() => Value::String("NaN".into()),
            None if *v > 0.0 => Value::String("Infinity".into()),
            None => Value::String("-Infinity".into()),
        },
        DocumentValue::Decimal(d) => json!({ "$numberDecimal": d.to_string() }),
        DocumentValue::Boolean(b) => Value::Bool(*b),
        DocumentValue::DateTime(dt) => {
            json!({ "$date": dt.to_rfc3339_opts(SecondsFormat::Millis, true) })
        }
        DocumentValue::Binary(bytes) => json!({ "$binary": hex::encode_upper(bytes) }),
        DocumentValue::ObjectId(oid) => json!({ "$oid": DocumentValue::object_id_hex(oid) }),
        DocumentValue::Guid(uuid) => json!({ "$uuid": uuid.hyphenated().to_string() }),
        DocumentValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        DocumentValue::Document(nested) => document_value(nested),
        DocumentValue::Unsupported { text, .. } => Value::String(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_scalars_pass_through() {
        let doc = Document::new()
            .with("name", "Alice")
            .with("age", 30)
            .with("active", true);
        assert_eq!(normalize(&doc), doc);
    }

    #[test]
    fn test_array_becomes_json_text() {
        let doc = Document::new().with(
            "tags",
            DocumentValue::Array(vec!["a".into(), "b".into(), DocumentValue::Int32(3)]),
        );
        let normalized = normalize(&doc);
        assert_eq!(
            normalized.get("tags"),
            Some(&DocumentValue::String(r#"["a","b",3]"#.into()))
        );
    }

    #[test]
    fn test_nested_document_is_normalized_and_kept() {
        let inner = Document::new()
            .with("zip", "10001")
            .with("lines", DocumentValue::Array(vec!["1 Main St".into()]));
        let doc = Document::new().with("address", inner);

        let normalized = normalize(&doc);
        match normalized.get("address") {
            Some(DocumentValue::Document(nested)) => {
                assert_eq!(
                    nested.get("lines"),
                    Some(&DocumentValue::String(r#"["1 Main St"]"#.into()))
                );
                assert_eq!(nested.get("zip"), Some(&DocumentValue::String("10001".into())));
            }
            other => panic!("expected nested document, got {:?}", other),
        }
    }

    #[test]
    fn test_field_order_preserved() {
        let doc = Document::new()
            .with("z", DocumentValue::Array(vec![]))
            .with("a", 1);
        let normalized = normalize(&doc);
        let names: Vec<&str> = normalized.keys().collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(normalized.get("z"), Some(&DocumentValue::String("[]".into())));
    }

    #[test]
    fn test_array_of_documents_and_special_values() {
        let oid = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let items = vec![
            DocumentValue::Document(Document::new().with("b", 2).with("a", 1)),
            DocumentValue::ObjectId(oid),
            DocumentValue::DateTime(when),
            DocumentValue::Binary(vec![0xde, 0xad]),
            DocumentValue::Decimal(Decimal::from_str("1.50").unwrap()),
            DocumentValue::Double(f64::NAN),
            DocumentValue::Null,
        ];
        assert_eq!(
            array_to_json(&items),
            concat!(
                r#"[{"b":2,"a":1},"#,
                r#"{"$oid":"000102030405060708090a0b"},"#,
                r#"{"$date":"2024-01-02T03:04:05.000Z"},"#,
                r#"{"$binary":"DEAD"},"#,
                r#"{"$numberDecimal":"1.50"},"#,
                r#""NaN",null]"#
            )
        );
    }
}
