//! Strategies for reconciling field kinds that disagree across documents.

use serde::{Deserialize, Serialize};

use crate::core::ValueKind;

/// Decides the kind recorded for a field that was already seen with `existing`
/// and is now seen with `incoming`.
pub trait InferencePolicy: Send + Sync {
    /// Policy name for logging.
    fn name(&self) -> &'static str;

    /// Kind to keep for the field.
    fn merge(&self, existing: &ValueKind, incoming: &ValueKind) -> ValueKind;
}

/// Keep the kind of the first document that contained the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSeen;

impl InferencePolicy for FirstSeen {
    fn name(&self) -> &'static str {
        "first_seen"
    }

    fn merge(&self, existing: &ValueKind, _incoming: &ValueKind) -> ValueKind {
        existing.clone()
    }
}

/// Widen to a kind that can hold both values.
///
/// Null yields to any kind, Int32 widens to Int64, mixed numerics widen to
/// Decimal and every other disagreement falls back to String.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidestType;

impl InferencePolicy for WidestType {
    fn name(&self) -> &'static str {
        "widest_type"
    }

    fn merge(&self, existing: &ValueKind, incoming: &ValueKind) -> ValueKind {
        if let Some(kind) = merge_trivial(existing, incoming) {
            return kind;
        }
        match (existing, incoming) {
            (ValueKind::Int32, ValueKind::Int64) | (ValueKind::Int64, ValueKind::Int32) => {
                ValueKind::Int64
            }
            (a, b) if a.is_numeric() && b.is_numeric() => ValueKind::Decimal,
            _ => ValueKind::String,
        }
    }
}

/// Any disagreement between non-null kinds stores the field as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionAsText;

impl InferencePolicy for UnionAsText {
    fn name(&self) -> &'static str {
        "union_as_text"
    }

    fn merge(&self, existing: &ValueKind, incoming: &ValueKind) -> ValueKind {
        merge_trivial(existing, incoming).unwrap_or(ValueKind::String)
    }
}

/// Equal kinds, or one side null.
fn merge_trivial(existing: &ValueKind, incoming: &ValueKind) -> Option<ValueKind> {
    match (existing, incoming) {
        (a, b) if a == b => Some(a.clone()),
        (ValueKind::Null, other) | (other, ValueKind::Null) => Some(other.clone()),
        _ => None,
    }
}

/// Configured schema policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// First document containing a field decides its kind.
    #[default]
    FirstSeen,

    /// Widen conflicting kinds.
    WidestType,

    /// Conflicting kinds become text.
    UnionAsText,
}

impl SchemaPolicy {
    /// Instantiate the strategy object.
    pub fn strategy(&self) -> Box<dyn InferencePolicy> {
        match self {
            SchemaPolicy::FirstSeen => Box::new(FirstSeen),
            SchemaPolicy::WidestType => Box::new(WidestType),
            SchemaPolicy::UnionAsText => Box::new(UnionAsText),
        }
    }
}
