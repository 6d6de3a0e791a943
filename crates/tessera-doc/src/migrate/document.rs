use serde_json::{Map, Value};
use tessera_core::TesseraResult;

use super::MigrationRegistry;
use crate::registry::ComponentRegistry;
use crate::schema::{parse_document, Document, UnknownComponentPolicy, FORMAT_VERSION};

/// The document format chain, ending at [`FORMAT_VERSION`].
pub fn document_migrations() -> MigrationRegistry {
    MigrationRegistry::new("document", "formatVersion", FORMAT_VERSION)
        .with(2, "add empty wiring list", add_wiring)
        .with(3, "engineOverrides -> tuning, hidden -> visible", rename_entity_fields)
}

fn add_wiring(mut doc: Map<String, Value>) -> Result<Value, String> {
    doc.entry("wiring")
        .or_insert_with(|| Value::Array(Vec::new()));
    Ok(Value::Object(doc))
}

fn rename_entity_fields(mut doc: Map<String, Value>) -> Result<Value, String> {
    if let Some(entities) = doc.get_mut("entities") {
        let entities = entities
            .as_object_mut()
            .ok_or("'entities' must be an object")?;
        for entity in entities.values_mut() {
            let Some(entity) = entity.as_object_mut() else {
                continue;
            };
            if let Some(overrides) = entity.remove("engineOverrides") {
                entity.insert("tuning".into(), overrides);
            }
            if let Some(hidden) = entity.remove("hidden") {
                let hidden = hidden.as_bool().ok_or("'hidden' must be a boolean")?;
                entity.insert("visible".into(), Value::Bool(!hidden));
            }
        }
    }
    Ok(Value::Object(doc))
}

/// Upgrade a saved document to the current format and validate it.
///
/// Saved content keeps unknown component types as opaque data.
pub fn migrate_document(raw: Value, registry: &ComponentRegistry) -> TesseraResult<Document> {
    migrate_document_with(raw, registry, UnknownComponentPolicy::PassThrough)
}

pub fn migrate_document_with(
    raw: Value,
    registry: &ComponentRegistry,
    policy: UnknownComponentPolicy,
) -> TesseraResult<Document> {
    let migrated = document_migrations().migrate(raw)?;
    parse_document(migrated, registry, policy)
}
