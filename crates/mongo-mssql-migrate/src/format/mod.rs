//! SQL Server literal formatting for document values.
//!
//! Each literal carries its own quoting: strings, datetimes and identifiers
//! are single-quoted here, numbers, booleans and binaries are not, and the
//! statement builders insert the returned text as-is.
//!
//! Rules:
//! - Null: `NULL`
//! - String: `'...'` with embedded `'` doubled
//! - Int32/Int64/Decimal: decimal text
//! - Double: decimal text, or `1E-40` style when the digits would exceed the
//!   38-digit numeric literal limit (non-finite doubles become `NULL`)
//! - Boolean: `1` / `0`
//! - DateTime: `'YYYY-MM-DD HH:MM:SS.mmm'` (UTC)
//! - Binary: `0x` followed by uppercase hex digits
//! - ObjectId/Guid: `'...'` canonical text
//! - Document: its JSON text, quoted like a string
//! - Array and unsupported kinds fail with [`MigrateError::UnsupportedValue`]
//!
//! String literals carry no `N` prefix, so text outside the database code
//! page is converted by the server on its way into `NVARCHAR` columns and
//! characters it cannot represent are lost.

use tracing::warn;

use crate::core::DocumentValue;
use crate::error::{MigrateError, Result};
use crate::normalize::document_to_json;

/// DATETIME literal layout (millisecond precision, 24-hour clock).
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Largest precision SQL Server accepts in a numeric literal.
const MAX_NUMERIC_DIGITS: usize = 38;

/// Format a value as a SQL Server literal.
pub fn format_literal(value: &DocumentValue) -> Result<String> {
    let literal = match value {
        DocumentValue::Null => "NULL".to_string(),
        DocumentValue::String(s) => quote(s),
        DocumentValue::Int32(v) => v.to_string(),
        DocumentValue::Int64(v) => v.to_string(),
        DocumentValue::Decimal(d) => d.to_string(),
        DocumentValue::Double(f) => {
            if f.is_finite() {
                format_double(*f)
            } else {
                // SQL Server has no NaN/Infinity
                warn!("Converting non-finite double {} to NULL", f);
                "NULL".to_string()
            }
        }
        DocumentValue::Boolean(b) => String::from(if *b { "1" } else { "0" }),
        DocumentValue::DateTime(dt) => format!("'{}'", dt.format(DATETIME_FORMAT)),
        DocumentValue::Binary(bytes) => format!("0x{}", hex::encode_upper(bytes)),
        DocumentValue::ObjectId(oid) => format!("'{}'", DocumentValue::object_id_hex(oid)),
        DocumentValue::Guid(uuid) => format!("'{}'", uuid.hyphenated()),
        DocumentValue::Document(nested) => quote(&document_to_json(nested)),
        DocumentValue::Array(_) | DocumentValue::Unsupported { .. } => {
            return Err(MigrateError::unsupported_value(value.kind().name()));
        }
    };
    Ok(literal)
}

/// Plain decimal text, falling back to exponent form (a float literal) when
/// the plain text has more digits than a numeric literal may hold.
fn format_double(f: f64) -> String {
    let plain = f.to_string();
    let digits = plain.bytes().filter(u8::is_ascii_digit).count();
    if digits > MAX_NUMERIC_DIGITS {
        format!("{:E}", f)
    } else {
        plain
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnType, Document};
    use crate::typemap::map_type;
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    #[test]
    fn test_null_is_unquoted_keyword() {
        assert_eq!(format_literal(&DocumentValue::Null).unwrap(), "NULL");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(format_literal(&"O'Brien".into()).unwrap(), "'O''Brien'");
        assert_eq!(format_literal(&"''".into()).unwrap(), "''''''");
        assert_eq!(format_literal(&"".into()).unwrap(), "''");
    }

    #[test]
    fn test_numbers_are_unquoted() {
        assert_eq!(format_literal(&DocumentValue::Int32(-5)).unwrap(), "-5");
        assert_eq!(
            format_literal(&DocumentValue::Int64(9_007_199_254_740_993)).unwrap(),
            "9007199254740993"
        );
        assert_eq!(format_literal(&DocumentValue::Double(2.5)).unwrap(), "2.5");
        assert_eq!(format_literal(&DocumentValue::Double(30.0)).unwrap(), "30");
        assert_eq!(
            format_literal(&DocumentValue::Decimal(Decimal::from_str("-12.3400").unwrap()))
                .unwrap(),
            "-12.3400"
        );
    }

    #[test]
    fn test_non_finite_double_is_null() {
        assert_eq!(format_literal(&DocumentValue::Double(f64::NAN)).unwrap(), "NULL");
        assert_eq!(
            format_literal(&DocumentValue::Double(f64::NEG_INFINITY)).unwrap(),
            "NULL"
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(format_literal(&true.into()).unwrap(), "1");
        assert_eq!(format_literal(&false.into()).unwrap(), "0");
    }

    #[test]
    fn test_datetime_millisecond_precision() {
        let dt = Utc.with_ymd_and_hms(2023, 11, 5, 17, 4, 9).unwrap()
            + chrono::Duration::milliseconds(7);
        assert_eq!(
            format_literal(&DocumentValue::DateTime(dt)).unwrap(),
            "'2023-11-05 17:04:09.007'"
        );
    }

    #[test]
    fn test_binary_uppercase_hex() {
        assert_eq!(
            format_literal(&DocumentValue::Binary(vec![0x0a, 0xbc, 0xff])).unwrap(),
            "0x0ABCFF"
        );
        assert_eq!(format_literal(&DocumentValue::Binary(vec![])).unwrap(), "0x");
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let oid = [0x65, 0x4f, 0x1c, 0x2a, 0, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(
            format_literal(&DocumentValue::ObjectId(oid)).unwrap(),
            "'654f1c2a0000000000000001'"
        );
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            format_literal(&DocumentValue::Guid(uuid)).unwrap(),
            "'67e55044-10b1-426f-9247-bb680e5fe0c8'"
        );
    }

    #[test]
    fn test_extreme_doubles_use_exponent_form() {
        assert_eq!(format_literal(&DocumentValue::Double(1e-40)).unwrap(), "1E-40");
        assert_eq!(format_literal(&DocumentValue::Double(-2.5e-40)).unwrap(), "-2.5E-40");
        assert_eq!(format_literal(&DocumentValue::Double(1e300)).unwrap(), "1E300");
        // 38 digits still fit a numeric literal
        assert_eq!(
            format_literal(&DocumentValue::Double(1e37)).unwrap(),
            "10000000000000000000000000000000000000"
        );
        assert_eq!(
            format_literal(&DocumentValue::Double(0.1 + 0.2)).unwrap(),
            "0.30000000000000004"
        );
    }

    #[test]
    fn test_nested_document_is_json_text() {
        let nested = DocumentValue::Document(
            Document::new()
                .with("zip", "1")
                .with("note", "it's")
                .with("geo", Document::new().with("lat", 1)),
        );
        assert_eq!(
            format_literal(&nested).unwrap(),
            r#"'{"zip":"1","note":"it''s","geo":{"lat":1}}'"#
        );
        assert_eq!(
            format_literal(&DocumentValue::Document(Document::new())).unwrap(),
            "'{}'"
        );
    }

    #[test]
    fn test_arrays_and_unsupported_kinds_are_rejected() {
        let array = DocumentValue::Array(vec![DocumentValue::Int32(1)]);
        assert!(matches!(
            format_literal(&array),
            Err(MigrateError::UnsupportedValue { ref kind, .. }) if kind == "Array"
        ));

        let code = DocumentValue::Unsupported {
            kind: "JavaScriptCode".into(),
            text: "function() {}".into(),
        };
        let err = format_literal(&code).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported value of kind JavaScriptCode");
    }

    /// Value parsed back from a literal, the way the engine would read it
    /// into a column of the given type.
    #[derive(Debug, PartialEq)]
    enum Parsed {
        Text(String),
        Int(i64),
        Decimal(Decimal),
        Bit(bool),
        DateTime(NaiveDateTime),
        Bytes(Vec<u8>),
    }

    fn parse_literal(literal: &str, column: ColumnType) -> Parsed {
        let unquote = |l: &str| -> String {
            assert!(l.starts_with('\'') && l.ends_with('\'') && l.len() >= 2, "{}", l);
            l[1..l.len() - 1].replace("''", "'")
        };
        match column {
            ColumnType::Text => Parsed::Text(unquote(literal)),
            ColumnType::Integer32 | ColumnType::Integer64 => {
                Parsed::Int(literal.parse().unwrap())
            }
            ColumnType::Decimal => Parsed::Decimal(Decimal::from_str(literal).unwrap()),
            ColumnType::Boolean => Parsed::Bit(literal == "1"),
            ColumnType::DateTime => Parsed::DateTime(
                NaiveDateTime::parse_from_str(&unquote(literal), DATETIME_FORMAT).unwrap(),
            ),
            ColumnType::Binary => {
                let digits = literal.strip_prefix("0x").unwrap();
                Parsed::Bytes(hex::decode(digits).unwrap())
            }
        }
    }

    #[test]
    fn test_literals_parse_back_to_original_values() {
        let when: DateTime<Utc> = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 58).unwrap()
            + chrono::Duration::milliseconds(999);
        let cases: Vec<(DocumentValue, Parsed)> = vec![
            (
                "it's \"quoted\"".into(),
                Parsed::Text("it's \"quoted\"".into()),
            ),
            (DocumentValue::Int32(i32::MIN), Parsed::Int(i32::MIN as i64)),
            (DocumentValue::Int64(i64::MAX), Parsed::Int(i64::MAX)),
            (
                DocumentValue::Decimal(Decimal::from_str("123.456").unwrap()),
                Parsed::Decimal(Decimal::from_str("123.456").unwrap()),
            ),
            (
                DocumentValue::Double(0.125),
                Parsed::Decimal(Decimal::from_str("0.125").unwrap()),
            ),
            (true.into(), Parsed::Bit(true)),
            (false.into(), Parsed::Bit(false)),
            (DocumentValue::DateTime(when), Parsed::DateTime(when.naive_utc())),
            (
                DocumentValue::Binary(vec![0, 1, 254, 255]),
                Parsed::Bytes(vec![0, 1, 254, 255]),
            ),
        ];

        for (value, expected) in cases {
            let column = map_type(&value.kind()).unwrap();
            let literal = format_literal(&value).unwrap();
            assert_eq!(parse_literal(&literal, column), expected, "literal {}", literal);
        }
    }
}
