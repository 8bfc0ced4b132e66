//! BSON to [`DocumentValue`] conversion.
//!
//! Binary data is kept only for the generic subtypes; UUID subtypes become
//! [`DocumentValue::Guid`]. Every other BSON kind without a relational
//! counterpart (regex, code, timestamp, min/max key, ...) is carried as
//! [`DocumentValue::Unsupported`] so the mapping step can reject it by name.

use chrono::{DateTime, Utc};
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{Bson, Decimal128, Document as BsonDocument};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::{Document, DocumentValue};

/// Exponent bias of the IEEE 754-2008 decimal128 format.
const DECIMAL128_EXPONENT_BIAS: i32 = 6176;

/// Largest canonical decimal128 coefficient (10^34 - 1).
const DECIMAL128_MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

/// Convert a BSON document, preserving field order.
pub fn from_bson_document(doc: &BsonDocument) -> Document {
    doc.iter()
        .map(|(name, value)| (name.as_str(), from_bson(value)))
        .collect()
}

/// Convert a single BSON value.
pub fn from_bson(value: &Bson) -> DocumentValue {
    match value {
        Bson::Null | Bson::Undefined => DocumentValue::Null,
        Bson::String(s) => DocumentValue::String(s.clone()),
        Bson::Int32(v) => DocumentValue::Int32(*v),
        Bson::Int64(v) => DocumentValue::Int64(*v),
        Bson::Double(v) => DocumentValue::Double(*v),
        Bson::Boolean(v) => DocumentValue::Boolean(*v),
        Bson::ObjectId(oid) => DocumentValue::ObjectId(oid.bytes()),
        Bson::Array(items) => DocumentValue::Array(items.iter().map(from_bson).collect()),
        Bson::Document(doc) => DocumentValue::Document(from_bson_document(doc)),
        Bson::DateTime(dt) => match DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()) {
            Some(dt) => DocumentValue::DateTime(dt),
            None => unsupported("DateTime", value),
        },
        Bson::Decimal128(d) => match decimal128_to_decimal(d) {
            Some(dec) => DocumentValue::Decimal(dec),
            None => unsupported("Decimal128", value),
        },
        Bson::Binary(bin) => match bin.subtype {
            BinarySubtype::Generic | BinarySubtype::BinaryOld => {
                DocumentValue::Binary(bin.bytes.clone())
            }
            BinarySubtype::Uuid | BinarySubtype::UuidOld => match Uuid::from_slice(&bin.bytes) {
                Ok(uuid) => DocumentValue::Guid(uuid),
                Err(_) => unsupported("BinaryUuid", value),
            },
            other => unsupported(&format!("BinarySubtype({:#04x})", u8::from(other)), value),
        },
        Bson::RegularExpression(_) => unsupported("RegularExpression", value),
        Bson::JavaScriptCode(_) => unsupported("JavaScriptCode", value),
        Bson::JavaScriptCodeWithScope(_) => unsupported("JavaScriptCodeWithScope", value),
        Bson::Timestamp(_) => unsupported("Timestamp", value),
        Bson::Symbol(_) => unsupported("Symbol", value),
        Bson::MaxKey => unsupported("MaxKey", value),
        Bson::MinKey => unsupported("MinKey", value),
        Bson::DbPointer(_) => unsupported("DbPointer", value),
    }
}

fn unsupported(kind: &str, value: &Bson) -> DocumentValue {
    DocumentValue::Unsupported {
        kind: kind.to_string(),
        text: value.to_string(),
    }
}

/// Decode a BID-encoded decimal128.
///
/// Returns None for NaN, infinities and values that do not fit the 96-bit
/// mantissa / 28-digit scale of [`Decimal`].
pub fn decimal128_to_decimal(value: &Decimal128) -> Option<Decimal> {
    let bits = u128::from_le_bytes(value.bytes());
    let negative = bits >> 127 == 1;

    let (biased_exponent, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
        // NaN / Infinity
        if (bits >> 123) & 0b11 == 0b11 {
            return None;
        }
        // Large-coefficient form is always above 10^34 - 1, i.e. non-canonical zero
        (((bits >> 111) & 0x3fff) as i32, 0u128)
    } else {
        (((bits >> 113) & 0x3fff) as i32, bits & ((1u128 << 113) - 1))
    };

    let coefficient = if coefficient > DECIMAL128_MAX_COEFFICIENT {
        0
    } else {
        coefficient
    };
    let mut exponent = biased_exponent - DECIMAL128_EXPONENT_BIAS;
    let mut coefficient = coefficient;

    // Positive exponent: fold into the coefficient
    while exponent > 0 {
        coefficient = coefficient.checked_mul(10)?;
        exponent -= 1;
    }
    // Too many fractional digits: drop trailing zeros only
    while -exponent > 28 {
        if coefficient % 10 != 0 {
            return None;
        }
        coefficient /= 10;
        exponent += 1;
    }

    let mantissa = i128::try_from(coefficient).ok()?;
    let mut decimal = Decimal::try_from_i128_with_scale(mantissa, (-exponent) as u32).ok()?;
    decimal.set_sign_negative(negative);
    Some(decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::{doc, Binary, Regex};
    use std::str::FromStr;

    fn decimal128(negative: bool, exponent: i32, coefficient: u128) -> Decimal128 {
        let biased = (exponent + DECIMAL128_EXPONENT_BIAS) as u128;
        let mut bits = (biased << 113) | coefficient;
        if negative {
            bits |= 1u128 << 127;
        }
        Decimal128::from_bytes(bits.to_le_bytes())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(from_bson(&Bson::Int32(7)), DocumentValue::Int32(7));
        assert_eq!(from_bson(&Bson::Int64(7)), DocumentValue::Int64(7));
        assert_eq!(from_bson(&Bson::Null), DocumentValue::Null);
        assert_eq!(from_bson(&Bson::Undefined), DocumentValue::Null);
        assert_eq!(from_bson(&Bson::String("s".into())), DocumentValue::String("s".into()));
    }

    #[test]
    fn test_document_order_and_nesting() {
        let oid = ObjectId::parse_str("654f1c2a0000000000000001").unwrap();
        let source = doc! {
            "_id": oid,
            "name": "Alice",
            "tags": ["a", 1],
            "address": { "city": "NY" },
        };
        let doc = from_bson_document(&source);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["_id", "name", "tags", "address"]);
        assert_eq!(doc.get("_id"), Some(&DocumentValue::ObjectId(oid.bytes())));
        assert_eq!(
            doc.get("tags"),
            Some(&DocumentValue::Array(vec!["a".into(), DocumentValue::Int32(1)]))
        );
        assert_eq!(
            doc.get("address"),
            Some(&DocumentValue::Document(Document::new().with("city", "NY")))
        );
    }

    #[test]
    fn test_datetime() {
        let dt = mongodb::bson::DateTime::from_millis(1_700_000_000_123);
        match from_bson(&Bson::DateTime(dt)) {
            DocumentValue::DateTime(converted) => {
                assert_eq!(converted.timestamp_millis(), 1_700_000_000_123)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_binary_subtypes() {
        let generic = Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![1, 2, 3],
        });
        assert_eq!(from_bson(&generic), DocumentValue::Binary(vec![1, 2, 3]));

        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let uuid_bin = Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        });
        assert_eq!(from_bson(&uuid_bin), DocumentValue::Guid(uuid));

        let md5 = Bson::Binary(Binary {
            subtype: BinarySubtype::Md5,
            bytes: vec![0; 16],
        });
        assert!(matches!(
            from_bson(&md5),
            DocumentValue::Unsupported { ref kind, .. } if kind == "BinarySubtype(0x05)"
        ));
    }

    #[test]
    fn test_unsupported_kinds() {
        let regex = Bson::RegularExpression(Regex {
            pattern: "^a".into(),
            options: "i".into(),
        });
        assert_eq!(from_bson(&regex).kind().name(), "RegularExpression");
        assert_eq!(from_bson(&Bson::MinKey).kind().name(), "MinKey");
    }

    #[test]
    fn test_decimal128_decoding() {
        assert_eq!(
            decimal128_to_decimal(&decimal128(false, -2, 12345)),
            Some(Decimal::from_str("123.45").unwrap())
        );
        assert_eq!(
            decimal128_to_decimal(&decimal128(true, 0, 42)),
            Some(Decimal::from_str("-42").unwrap())
        );
        assert_eq!(
            decimal128_to_decimal(&decimal128(false, 3, 5)),
            Some(Decimal::from(5000))
        );
        assert_eq!(
            decimal128_to_decimal(&decimal128(false, -30, 1_000)),
            Some(Decimal::from_str("0.000000000000000000000000001").unwrap())
        );
    }

    #[test]
    fn test_decimal128_out_of_range() {
        // 10^33 does not fit the 96-bit mantissa
        assert_eq!(
            decimal128_to_decimal(&decimal128(false, 0, 10u128.pow(33))),
            None
        );
        // 30 significant fractional digits
        assert_eq!(decimal128_to_decimal(&decimal128(false, -30, 123)), None);

        let nan = Decimal128::from_bytes((0b11111u128 << 122).to_le_bytes());
        assert_eq!(decimal128_to_decimal(&nan), None);
        assert!(matches!(
            from_bson(&Bson::Decimal128(nan)),
            DocumentValue::Unsupported { ref kind, .. } if kind == "Decimal128"
        ));
    }
}
