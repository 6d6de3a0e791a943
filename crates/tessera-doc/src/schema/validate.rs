use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tessera_core::{EntityId, TesseraError, TesseraResult};

use super::document::{Document, FORMAT_VERSION};
use super::entity::{Component, Entity};
use crate::registry::{ComponentDef, ComponentRegistry};

/// What to do with components whose type is not in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownComponentPolicy {
    /// Newly authored content: unknown types are an error.
    #[default]
    Reject,
    /// Saved or forward-compatible content: keep unknown components opaque.
    PassThrough,
}

/// Parse a document from its JSON wire form and validate it.
///
/// The document must already be at [`FORMAT_VERSION`]; older documents go
/// through [`crate::migrate::migrate_document`].
pub fn parse_document(
    raw: Value,
    registry: &ComponentRegistry,
    policy: UnknownComponentPolicy,
) -> TesseraResult<Document> {
    let doc: Document =
        serde_json::from_value(raw).map_err(|e| TesseraError::schema("document", e.to_string()))?;
    validate_document(&doc, registry, policy)
}

/// Validate a document and return it with component defaults applied.
pub fn validate_document(
    doc: &Document,
    registry: &ComponentRegistry,
    policy: UnknownComponentPolicy,
) -> TesseraResult<Document> {
    if doc.format_version == 0 {
        return Err(TesseraError::schema(
            "formatVersion",
            "must be a positive integer",
        ));
    }
    if doc.format_version != FORMAT_VERSION {
        return Err(TesseraError::schema(
            "formatVersion",
            format!(
                "expected {}, found {} (migrate the document first)",
                FORMAT_VERSION, doc.format_version
            ),
        ));
    }

    for (key, entity) in &doc.entities {
        if key != &entity.id {
            return Err(TesseraError::invariant(format!(
                "entity stored under '{}' has id '{}'",
                key, entity.id
            )));
        }
        if !entity.transform.position.is_finite()
            || !entity.transform.rotation.is_finite()
            || !entity.transform.scale.is_finite()
        {
            return Err(TesseraError::schema(
                format!("entities.{}.transform", entity.id),
                "non-finite transform",
            ));
        }
    }
    for (key, asset) in &doc.assets {
        if key != &asset.id {
            return Err(TesseraError::invariant(format!(
                "asset stored under '{}' has id '{}'",
                key, asset.id
            )));
        }
    }

    check_tree(doc).map_err(first_error)?;

    let mut validated = doc.clone();
    for entity in validated.entities.values_mut() {
        let components = validate_components(entity, registry, policy)?;
        if components != entity.components {
            Arc::make_mut(entity).components = components;
        }
    }
    Ok(validated)
}

fn first_error(mut errors: Vec<TesseraError>) -> TesseraError {
    errors.remove(0)
}

/// Validate every component of an entity and enforce singletons.
pub(crate) fn validate_components(
    entity: &Entity,
    registry: &ComponentRegistry,
    policy: UnknownComponentPolicy,
) -> TesseraResult<Vec<Component>> {
    let mut seen_singletons = HashSet::new();
    let mut out = Vec::with_capacity(entity.components.len());
    for component in &entity.components {
        match registry.get_component_def(&component.component_type) {
            Some(def) => {
                if def.singleton && !seen_singletons.insert(def.type_name) {
                    return Err(TesseraError::invariant(format!(
                        "entity '{}' has more than one {} component",
                        entity.id, def.type_name
                    )));
                }
                let properties = def.validate(&component.properties).map_err(|e| match e {
                    TesseraError::SchemaValidation { path, message } => TesseraError::schema(
                        format!("entities.{}.components.{}", entity.id, path),
                        message,
                    ),
                    other => other,
                })?;
                out.push(Component {
                    component_type: component.component_type.clone(),
                    properties,
                });
            }
            None => match policy {
                UnknownComponentPolicy::Reject => {
                    return Err(TesseraError::unknown_type(
                        "component",
                        &component.component_type,
                    ));
                }
                UnknownComponentPolicy::PassThrough => {
                    tracing::warn!(
                        entity = %entity.id,
                        component = %component.component_type,
                        "keeping unknown component type as opaque data"
                    );
                    out.push(Component {
                        component_type: component.component_type.clone(),
                        properties: opaque_properties(&component.properties),
                    });
                }
            },
        }
    }
    Ok(out)
}

/// Properties of a component the registry does not know. A `null` property
/// is the same as an unset one and is dropped.
pub(crate) fn opaque_properties(properties: &Map<String, Value>) -> Map<String, Value> {
    properties
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Check that `entities` forms a single tree rooted at `root_entity_id`.
///
/// Reports dangling parent/child references, children listed more than once,
/// parent/child disagreements, cycles and unreachable entities.
pub fn check_tree(doc: &Document) -> Result<(), Vec<TesseraError>> {
    let mut errors = Vec::new();

    match doc.entities.get(&doc.root_entity_id) {
        None => errors.push(TesseraError::invariant(format!(
            "root entity '{}' does not exist",
            doc.root_entity_id
        ))),
        Some(root) if root.parent_id.is_some() => errors.push(TesseraError::invariant(format!(
            "root entity '{}' has a parent",
            doc.root_entity_id
        ))),
        Some(_) => {}
    }

    for entity in doc.entities.values() {
        if entity.id != doc.root_entity_id {
            match &entity.parent_id {
                None => errors.push(TesseraError::invariant(format!(
                    "entity '{}' has no parent",
                    entity.id
                ))),
                Some(parent_id) => match doc.entities.get(parent_id) {
                    None => errors.push(TesseraError::invariant(format!(
                        "entity '{}' references missing parent '{}'",
                        entity.id, parent_id
                    ))),
                    Some(parent) => {
                        let count = parent.children.iter().filter(|c| *c == &entity.id).count();
                        if count != 1 {
                            errors.push(TesseraError::invariant(format!(
                                "parent '{}' lists '{}' {} times",
                                parent_id, entity.id, count
                            )));
                        }
                    }
                },
            }
        }

        for child_id in &entity.children {
            match doc.entities.get(child_id) {
                None => errors.push(TesseraError::invariant(format!(
                    "entity '{}' references missing child '{}'",
                    entity.id, child_id
                ))),
                Some(child) if child.parent_id.as_ref() != Some(&entity.id) => {
                    errors.push(TesseraError::invariant(format!(
                        "'{}' is listed as a child of '{}' but names another parent",
                        child_id, entity.id
                    )));
                }
                Some(_) => {}
            }
        }
    }

    // With consistent parent/child links every entity is reachable from the
    // root unless it sits on a cycle.
    if errors.is_empty() {
        let mut visited: HashSet<&EntityId> = HashSet::new();
        let mut stack = vec![&doc.root_entity_id];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                errors.push(TesseraError::invariant(format!("cycle at '{}'", id)));
                continue;
            }
            if let Some(entity) = doc.entities.get(id) {
                stack.extend(entity.children.iter());
            }
        }
        for id in doc.entities.keys() {
            if !visited.contains(id) {
                errors.push(TesseraError::invariant(format!(
                    "entity '{}' is not reachable from the root (cycle)",
                    id
                )));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check every wire against the current document: both endpoints exist, the
/// source declares the event and the target declares the action.
pub fn check_wiring(doc: &Document, registry: &ComponentRegistry) -> Vec<TesseraError> {
    let mut errors = Vec::new();
    for wire in &doc.wiring {
        let Some(source) = doc.get_entity(&wire.source_entity_id) else {
            errors.push(TesseraError::invariant(format!(
                "wire '{}' references missing source '{}'",
                wire.id, wire.source_entity_id
            )));
            continue;
        };
        let Some(target) = doc.get_entity(&wire.target_entity_id) else {
            errors.push(TesseraError::invariant(format!(
                "wire '{}' references missing target '{}'",
                wire.id, wire.target_entity_id
            )));
            continue;
        };
        if !entity_defs(source, registry).any(|def| def.has_event(&wire.source_event)) {
            errors.push(TesseraError::invariant(format!(
                "wire '{}': source '{}' has no event '{}'",
                wire.id, source.id, wire.source_event
            )));
        }
        if !entity_defs(target, registry).any(|def| def.has_action(&wire.target_action)) {
            errors.push(TesseraError::invariant(format!(
                "wire '{}': target '{}' has no action '{}'",
                wire.id, target.id, wire.target_action
            )));
        }
    }
    errors
}

fn entity_defs<'a>(
    entity: &'a Entity,
    registry: &'a ComponentRegistry,
) -> impl Iterator<Item = &'a ComponentDef> + 'a {
    entity
        .components
        .iter()
        .filter_map(|c| registry.get_component_def(&c.component_type))
}
