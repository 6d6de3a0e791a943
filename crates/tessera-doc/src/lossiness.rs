//! Which document fields survive a compile → decompile round trip.
//!
//! Every field of [`Document`] and [`Entity`] is listed here as either
//! portable (bit-for-bit equal after a round trip) or stripped (comes back at
//! its neutral default). [`unclassified_fields`] reports anything the tables
//! do not cover, so a new field cannot slip in without a decision.
//!
//! This contract is independent of the cross-engine portable component
//! subset in `tessera_ir::portable`: `tuning` survives the IR round trip
//! even though no adapter is required to honor it.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tessera_core::TesseraResult;

use crate::schema::{Document, DocumentMetadata, FORMAT_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    Portable,
    Stripped,
}

/// Top-level document fields, by wire name.
pub const DOCUMENT_FIELDS: &[(&str, FieldClass)] = &[
    ("id", FieldClass::Portable),
    ("name", FieldClass::Portable),
    ("formatVersion", FieldClass::Stripped),
    ("rootEntityId", FieldClass::Portable),
    ("entities", FieldClass::Portable),
    ("assets", FieldClass::Portable),
    ("wiring", FieldClass::Portable),
    ("environment", FieldClass::Portable),
    ("gameSettings", FieldClass::Stripped),
    ("metadata", FieldClass::Stripped),
];

/// Entity fields, by wire name.
pub const ENTITY_FIELDS: &[(&str, FieldClass)] = &[
    ("id", FieldClass::Portable),
    ("name", FieldClass::Portable),
    ("parentId", FieldClass::Portable),
    ("children", FieldClass::Portable),
    ("transform", FieldClass::Portable),
    ("components", FieldClass::Portable),
    ("tags", FieldClass::Stripped),
    ("visible", FieldClass::Portable),
    ("locked", FieldClass::Stripped),
    ("tuning", FieldClass::Portable),
];

fn lookup(table: &[(&str, FieldClass)], field: &str) -> Option<FieldClass> {
    table.iter().find(|(name, _)| *name == field).map(|(_, c)| *c)
}

pub fn classify_document_field(field: &str) -> Option<FieldClass> {
    lookup(DOCUMENT_FIELDS, field)
}

pub fn classify_entity_field(field: &str) -> Option<FieldClass> {
    lookup(ENTITY_FIELDS, field)
}

/// `doc` with every stripped field reset to the value decompilation
/// produces. A round trip of `doc` must equal this exactly.
pub fn strip_non_portable(doc: &Document) -> Document {
    let mut stripped = doc.clone();
    stripped.format_version = FORMAT_VERSION;
    stripped.game_settings = None;
    stripped.metadata = DocumentMetadata::default();
    for entity in stripped.entities.values_mut() {
        if !entity.tags.is_empty() || entity.locked {
            let entity = Arc::make_mut(entity);
            entity.tags.clear();
            entity.locked = false;
        }
    }
    stripped
}

/// Wire field names present in `doc` that neither table classifies.
/// Entity fields are reported as `entities.*.<field>`.
pub fn unclassified_fields(doc: &Document) -> TesseraResult<BTreeSet<String>> {
    let value = serde_json::to_value(doc)?;
    let mut unknown = BTreeSet::new();
    if let Value::Object(top) = &value {
        for key in top.keys() {
            if classify_document_field(key).is_none() {
                unknown.insert(key.clone());
            }
        }
        if let Some(Value::Object(entities)) = top.get("entities") {
            for entity in entities.values().filter_map(Value::as_object) {
                for key in entity.keys() {
                    if classify_entity_field(key).is_none() {
                        unknown.insert(format!("entities.*.{}", key));
                    }
                }
            }
        }
    }
    Ok(unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_is_portable() {
        assert_eq!(classify_entity_field("tuning"), Some(FieldClass::Portable));
        assert_eq!(classify_entity_field("tags"), Some(FieldClass::Stripped));
        assert_eq!(classify_document_field("metadata"), Some(FieldClass::Stripped));
        assert_eq!(classify_document_field("sparkles"), None);
    }

    #[test]
    fn test_strip_resets_stripped_fields() {
        let mut doc = Document::empty("Strip");
        doc.metadata.author = Some("ada".into());
        let root = doc.root_entity_id.clone();
        Arc::make_mut(doc.entities.get_mut(&root).unwrap()).locked = true;
        let stripped = strip_non_portable(&doc);
        assert_eq!(stripped.metadata, DocumentMetadata::default());
        assert!(!stripped.root().unwrap().locked);
        assert_eq!(stripped.name, doc.name);
    }
}
