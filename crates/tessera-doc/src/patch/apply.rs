use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tessera_core::{EntityId, TesseraError, TesseraResult};

use super::operation::{
    EntitySnapshot, OperationKind, PatchOperation, PropertyTarget, OPERATION_VERSION,
};
use crate::registry::{property::parse_track, ComponentRegistry, ANIMATION_COMPONENT};
use crate::schema::validate::{opaque_properties, validate_components};
use crate::schema::{
    check_tree, Component, Document, Entity, EntityTransform, Keyframe, UnknownComponentPolicy,
};

/// Apply `op` to `doc`, returning the new document.
///
/// `doc` is never touched: the operation runs against a private copy that
/// shares every untouched entity with `doc`. A batch either applies in full
/// or not at all, and the entity tree is checked after every top-level
/// operation.
pub fn apply_operation(
    doc: &Document,
    op: &PatchOperation,
    registry: &ComponentRegistry,
) -> TesseraResult<Document> {
    let mut next = doc.clone();
    apply_in_place(&mut next, op, registry)?;
    check_tree(&next).map_err(|mut errors| errors.remove(0))?;
    tracing::debug!(op = %op.id, kind = op.type_name(), origin = ?op.origin, "applied operation");
    Ok(next)
}

fn apply_in_place(
    doc: &mut Document,
    op: &PatchOperation,
    registry: &ComponentRegistry,
) -> TesseraResult<()> {
    if op.version != OPERATION_VERSION {
        return Err(TesseraError::schema(
            "operation.version",
            format!(
                "operation {} is at version {}, expected {}",
                op.id, op.version, OPERATION_VERSION
            ),
        ));
    }

    match &op.kind {
        OperationKind::CreateEntity {
            entity,
            descendants,
            index,
            restore,
        } => create_entity(doc, entity, descendants, *index, *restore, registry),
        OperationKind::DeleteEntity { entity_id, .. } => delete_entity(doc, entity_id),
        OperationKind::Reparent {
            entity_id,
            new_parent_id,
            new_index,
            ..
        } => reparent(doc, entity_id, new_parent_id, *new_index),
        OperationKind::AddComponent {
            entity_id,
            component,
            index,
            restore,
        } => {
            let properties = match registry.get_component_def(&component.component_type) {
                Some(def) => {
                    let properties = def.validate(&component.properties)?;
                    if def.singleton && require_entity(doc, entity_id)?.has_component(def.type_name)
                    {
                        return Err(TesseraError::invariant(format!(
                            "entity '{}' already has a {} component",
                            entity_id, def.type_name
                        )));
                    }
                    properties
                }
                None if *restore => opaque_properties(&component.properties),
                None => {
                    return Err(TesseraError::unknown_type(
                        "component",
                        &component.component_type,
                    ))
                }
            };
            insert_at(
                &mut entity_mut(doc, entity_id)?.components,
                *index,
                Component {
                    component_type: component.component_type.clone(),
                    properties,
                },
            )
        }
        OperationKind::RemoveComponent {
            entity_id,
            component_type,
            previous_index,
            ..
        } => {
            let entity = entity_mut(doc, entity_id)?;
            let position = match previous_index {
                Some(i) => match entity.components.get(*i) {
                    Some(c) if &c.component_type == component_type => *i,
                    _ => {
                        return Err(TesseraError::invariant(format!(
                            "entity '{}' has no {} component at index {}",
                            entity_id, component_type, i
                        )))
                    }
                },
                None => entity
                    .components
                    .iter()
                    .rposition(|c| &c.component_type == component_type)
                    .ok_or_else(|| {
                        TesseraError::invariant(format!(
                            "entity '{}' has no {} component",
                            entity_id, component_type
                        ))
                    })?,
            };
            entity.components.remove(position);
            Ok(())
        }
        OperationKind::SetProperty {
            entity_id,
            target,
            value,
            ..
        } => {
            let entity = entity_mut(doc, entity_id)?;
            write_property(entity, target, value, registry)
        }
        OperationKind::AddKeyframe {
            entity_id,
            track,
            keyframe,
        } => {
            if !keyframe.time.is_finite() || keyframe.time < 0.0 {
                return Err(TesseraError::schema(
                    format!("tracks.{}", track),
                    "keyframe time must be >= 0",
                ));
            }
            let tracks = tracks_mut(doc, entity_id)?;
            let mut keyframes = read_track(tracks, track)?;
            if keyframes.iter().any(|k| k.time == keyframe.time) {
                return Err(TesseraError::invariant(format!(
                    "track '{}' already has a keyframe at {}",
                    track, keyframe.time
                )));
            }
            let at = keyframes.partition_point(|k| k.time < keyframe.time);
            keyframes.insert(at, keyframe.clone());
            write_track(tracks, track, keyframes)
        }
        OperationKind::RemoveKeyframe {
            entity_id,
            track,
            time,
            ..
        } => {
            let tracks = tracks_mut(doc, entity_id)?;
            let mut keyframes = read_track(tracks, track)?;
            let at = keyframes
                .iter()
                .position(|k| k.time == *time)
                .ok_or_else(|| {
                    TesseraError::invariant(format!(
                        "track '{}' has no keyframe at {}",
                        track, time
                    ))
                })?;
            keyframes.remove(at);
            write_track(tracks, track, keyframes)
        }
        OperationKind::AddChild {
            parent_id,
            child_id,
            index,
        } => {
            require_entity(doc, parent_id)?;
            let child = require_entity(doc, child_id)?;
            if child_id == &doc.root_entity_id || child.parent_id.is_some() {
                return Err(TesseraError::invariant(format!(
                    "entity '{}' is already attached",
                    child_id
                )));
            }
            if doc.is_ancestor_or_self(child_id, parent_id) {
                return Err(TesseraError::invariant(format!(
                    "attaching '{}' under '{}' would create a cycle",
                    child_id, parent_id
                )));
            }
            insert_at(&mut entity_mut(doc, parent_id)?.children, *index, child_id.clone())?;
            entity_mut(doc, child_id)?.parent_id = Some(parent_id.clone());
            Ok(())
        }
        OperationKind::RemoveChild {
            parent_id,
            child_id,
            ..
        } => {
            require_entity(doc, child_id)?;
            let parent = entity_mut(doc, parent_id)?;
            let at = parent
                .children
                .iter()
                .position(|c| c == child_id)
                .ok_or_else(|| {
                    TesseraError::invariant(format!(
                        "'{}' is not a child of '{}'",
                        child_id, parent_id
                    ))
                })?;
            parent.children.remove(at);
            entity_mut(doc, child_id)?.parent_id = None;
            Ok(())
        }
        OperationKind::BatchOp { operations } => {
            for child in operations {
                apply_in_place(doc, child, registry)?;
            }
            Ok(())
        }
    }
}

fn missing_entity(id: &EntityId) -> TesseraError {
    TesseraError::invariant(format!("entity '{}' does not exist", id))
}

fn require_entity<'a>(doc: &'a Document, id: &EntityId) -> TesseraResult<&'a Entity> {
    doc.get_entity(id).ok_or_else(|| missing_entity(id))
}

fn entity_mut<'a>(doc: &'a mut Document, id: &EntityId) -> TesseraResult<&'a mut Entity> {
    doc.entities
        .get_mut(id)
        .map(Arc::make_mut)
        .ok_or_else(|| missing_entity(id))
}

fn insert_at<T>(list: &mut Vec<T>, index: Option<usize>, item: T) -> TesseraResult<()> {
    match index {
        None => list.push(item),
        Some(i) if i <= list.len() => list.insert(i, item),
        Some(i) => {
            return Err(TesseraError::invariant(format!(
                "index {} is out of range for a list of {}",
                i,
                list.len()
            )))
        }
    }
    Ok(())
}

fn create_entity(
    doc: &mut Document,
    entity: &Entity,
    descendants: &[Entity],
    index: Option<usize>,
    restore: bool,
    registry: &ComponentRegistry,
) -> TesseraResult<()> {
    let policy = if restore {
        UnknownComponentPolicy::PassThrough
    } else {
        UnknownComponentPolicy::Reject
    };
    let parent_id = entity.parent_id.clone().ok_or_else(|| {
        TesseraError::invariant(format!("new entity '{}' has no parent", entity.id))
    })?;
    require_entity(doc, &parent_id)?;

    let mut ids = HashSet::new();
    for e in std::iter::once(entity).chain(descendants) {
        if doc.contains_entity(&e.id) || !ids.insert(&e.id) {
            return Err(TesseraError::invariant(format!(
                "entity id '{}' is already in use",
                e.id
            )));
        }
    }
    for e in descendants {
        if !e.parent_id.as_ref().is_some_and(|p| ids.contains(p)) {
            return Err(TesseraError::invariant(format!(
                "descendant '{}' is not parented inside the created subtree",
                e.id
            )));
        }
    }

    let mut validated = Vec::with_capacity(descendants.len() + 1);
    for e in std::iter::once(entity).chain(descendants) {
        let mut e = e.clone();
        e.components = validate_components(&e, registry, policy)?;
        validated.push(e);
    }
    insert_at(&mut entity_mut(doc, &parent_id)?.children, index, entity.id.clone())?;
    for e in validated {
        doc.entities.insert(e.id.clone(), Arc::new(e));
    }
    Ok(())
}

fn delete_entity(doc: &mut Document, entity_id: &EntityId) -> TesseraResult<()> {
    if entity_id == &doc.root_entity_id {
        return Err(TesseraError::invariant("the root entity cannot be deleted"));
    }
    let entity = require_entity(doc, entity_id)?;
    if let Some(parent_id) = entity.parent_id.clone() {
        if let Some(parent) = doc.entities.get_mut(&parent_id) {
            Arc::make_mut(parent).children.retain(|c| c != entity_id);
        }
    }
    for id in doc.subtree_ids(entity_id) {
        doc.entities.remove(&id);
    }
    Ok(())
}

fn reparent(
    doc: &mut Document,
    entity_id: &EntityId,
    new_parent_id: &EntityId,
    new_index: Option<usize>,
) -> TesseraResult<()> {
    if entity_id == &doc.root_entity_id {
        return Err(TesseraError::invariant("the root entity cannot be reparented"));
    }
    let old_parent_id = require_entity(doc, entity_id)?.parent_id.clone();
    require_entity(doc, new_parent_id)?;
    if doc.is_ancestor_or_self(entity_id, new_parent_id) {
        return Err(TesseraError::invariant(format!(
            "moving '{}' under '{}' would create a cycle",
            entity_id, new_parent_id
        )));
    }
    if let Some(old_parent_id) = old_parent_id {
        entity_mut(doc, &old_parent_id)?
            .children
            .retain(|c| c != entity_id);
    }
    insert_at(
        &mut entity_mut(doc, new_parent_id)?.children,
        new_index,
        entity_id.clone(),
    )?;
    entity_mut(doc, entity_id)?.parent_id = Some(new_parent_id.clone());
    Ok(())
}

fn component_position(
    entity: &Entity,
    component_type: &str,
    index: usize,
) -> TesseraResult<usize> {
    entity
        .components
        .iter()
        .enumerate()
        .filter(|(_, c)| c.component_type == component_type)
        .nth(index)
        .map(|(i, _)| i)
        .ok_or_else(|| {
            TesseraError::invariant(format!(
                "entity '{}' has no {} component #{}",
                entity.id, component_type, index
            ))
        })
}

/// Current value of `target` on `entity`. A component property that was
/// never set reads as its registry default.
pub(crate) fn read_property(
    entity: &Entity,
    target: &PropertyTarget,
    registry: &ComponentRegistry,
) -> TesseraResult<Value> {
    let value = match target {
        PropertyTarget::Name => Value::String(entity.name.clone()),
        PropertyTarget::Visible => Value::Bool(entity.visible),
        PropertyTarget::Locked => Value::Bool(entity.locked),
        PropertyTarget::Tags => serde_json::to_value(&entity.tags)?,
        PropertyTarget::Transform => serde_json::to_value(entity.transform)?,
        PropertyTarget::Tuning { engine } => entity
            .tuning
            .get(engine)
            .map(|block| Value::Object(block.clone()))
            .unwrap_or(Value::Null),
        PropertyTarget::Component {
            component_type,
            index,
            property,
        } => {
            let at = component_position(entity, component_type, *index)?;
            match entity.components[at].properties.get(property) {
                Some(value) => value.clone(),
                None => registry
                    .get_component_def(component_type)
                    .and_then(|def| def.property(property))
                    .map(|p| p.default.clone())
                    .unwrap_or(Value::Null),
            }
        }
    };
    Ok(value)
}

fn write_property(
    entity: &mut Entity,
    target: &PropertyTarget,
    value: &Value,
    registry: &ComponentRegistry,
) -> TesseraResult<()> {
    match target {
        PropertyTarget::Name => {
            entity.name = value
                .as_str()
                .ok_or_else(|| TesseraError::schema("name", "expected a string"))?
                .to_string();
        }
        PropertyTarget::Visible => {
            entity.visible = value
                .as_bool()
                .ok_or_else(|| TesseraError::schema("visible", "expected a boolean"))?;
        }
        PropertyTarget::Locked => {
            entity.locked = value
                .as_bool()
                .ok_or_else(|| TesseraError::schema("locked", "expected a boolean"))?;
        }
        PropertyTarget::Tags => {
            entity.tags = serde_json::from_value(value.clone())
                .map_err(|e| TesseraError::schema("tags", e.to_string()))?;
        }
        PropertyTarget::Transform => {
            let transform: EntityTransform = serde_json::from_value(value.clone())
                .map_err(|e| TesseraError::schema("transform", e.to_string()))?;
            if !transform.position.is_finite()
                || !transform.rotation.is_finite()
                || !transform.scale.is_finite()
            {
                return Err(TesseraError::schema("transform", "non-finite transform"));
            }
            entity.transform = transform;
        }
        PropertyTarget::Tuning { engine } => match value {
            Value::Null => {
                entity.tuning.remove(engine);
            }
            Value::Object(block) => {
                entity.tuning.insert(engine.clone(), block.clone());
            }
            _ => {
                return Err(TesseraError::schema(
                    format!("tuning.{}", engine),
                    "expected an object or null",
                ))
            }
        },
        PropertyTarget::Component {
            component_type,
            index,
            property,
        } => {
            let at = component_position(entity, component_type, *index)?;
            let properties = &mut entity.components[at].properties;
            match registry.get_component_def(component_type) {
                Some(def) => {
                    let value = def
                        .property(property)
                        .ok_or_else(|| {
                            TesseraError::schema(
                                format!("{}.{}", component_type, property),
                                "unknown property",
                            )
                        })?
                        .kind
                        .validate(&format!("{}.{}", component_type, property), value)?;
                    properties.insert(property.clone(), value);
                }
                // Opaque component: null unsets, matching how it reads back.
                None if value.is_null() => {
                    properties.remove(property);
                }
                None => {
                    properties.insert(property.clone(), value.clone());
                }
            }
        }
    }
    Ok(())
}

fn tracks_mut<'a>(
    doc: &'a mut Document,
    entity_id: &EntityId,
) -> TesseraResult<&'a mut Map<String, Value>> {
    let entity = entity_mut(doc, entity_id)?;
    let animation = entity
        .components
        .iter_mut()
        .find(|c| c.component_type == ANIMATION_COMPONENT)
        .ok_or_else(|| {
            TesseraError::invariant(format!(
                "entity '{}' has no {} component",
                entity_id, ANIMATION_COMPONENT
            ))
        })?;
    let tracks = animation
        .properties
        .entry("tracks")
        .or_insert_with(|| Value::Object(Map::new()));
    tracks
        .as_object_mut()
        .ok_or_else(|| TesseraError::schema("Animation.tracks", "expected an object of tracks"))
}

fn read_track(tracks: &Map<String, Value>, track: &str) -> TesseraResult<Vec<Keyframe>> {
    match tracks.get(track) {
        Some(value) => parse_track(&format!("Animation.tracks.{}", track), value),
        None => Ok(Vec::new()),
    }
}

fn write_track(
    tracks: &mut Map<String, Value>,
    track: &str,
    keyframes: Vec<Keyframe>,
) -> TesseraResult<()> {
    if keyframes.is_empty() {
        tracks.remove(track);
    } else {
        tracks.insert(track.to_string(), serde_json::to_value(keyframes)?);
    }
    Ok(())
}

/// Snapshot `entity_id` and its subtree as a `DeleteEntity` would see it.
pub(crate) fn snapshot(doc: &Document, entity_id: &EntityId) -> TesseraResult<EntitySnapshot> {
    let entity = require_entity(doc, entity_id)?.clone();
    let index = entity
        .parent_id
        .as_ref()
        .and_then(|p| doc.get_entity(p))
        .and_then(|parent| parent.children.iter().position(|c| c == entity_id));
    let descendants = doc
        .subtree_ids(entity_id)
        .into_iter()
        .skip(1)
        .filter_map(|id| doc.get_entity(&id).cloned())
        .collect();
    Ok(EntitySnapshot {
        entity,
        descendants,
        index,
    })
}
