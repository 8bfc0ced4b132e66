//! Schema inference over a collection's documents.
//!
//! Documents are scanned in the order given. A field is added to the
//! [`SchemaMap`] the first time it is seen, so column order is first-appearance
//! order. When a later document carries the field with a different kind, the
//! configured [`InferencePolicy`] decides what is recorded; the default
//! [`FirstSeen`] policy keeps the first kind.

mod policy;

pub use policy::{FirstSeen, InferencePolicy, SchemaPolicy, UnionAsText, WidestType};

use tracing::debug;

use crate::core::{Document, SchemaMap};

/// Infer a schema with the first-seen policy.
pub fn infer_schema(documents: &[Document]) -> SchemaMap {
    infer_schema_with(&FirstSeen, documents)
}

/// Infer a schema with an explicit policy.
pub fn infer_schema_with(policy: &dyn InferencePolicy, documents: &[Document]) -> SchemaMap {
    let mut schema = SchemaMap::new();

    for document in documents {
        for (name, value) in document.iter() {
            let kind = value.kind();
            match schema.get(name) {
                None => {
                    schema.record(name, kind);
                }
                Some(existing) if *existing != kind => {
                    let merged = policy.merge(existing, &kind);
                    if merged != *existing {
                        debug!(
                            "Field {}: {} -> {} ({})",
                            name,
                            existing,
                            merged,
                            policy.name()
                        );
                        schema.set_kind(name, merged);
                    }
                }
                Some(_) => {}
            }
        }
    }

    schema
}
