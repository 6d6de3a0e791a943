//! Operation constructors. The ones that take a document read the state
//! they are about to replace so the resulting operation can be inverted.

use serde_json::Value;
use tessera_core::{EntityId, TesseraError, TesseraResult};

use super::apply::{read_property, snapshot};
use super::operation::{OperationKind, PatchOperation, PropertyTarget};
use crate::registry::{property::parse_track, ComponentRegistry, ANIMATION_COMPONENT};
use crate::schema::{Component, Document, Entity, Keyframe};

fn require<'a>(doc: &'a Document, id: &EntityId) -> TesseraResult<&'a Entity> {
    doc.get_entity(id)
        .ok_or_else(|| TesseraError::invariant(format!("entity '{}' does not exist", id)))
}

fn child_index(doc: &Document, parent_id: &EntityId, child_id: &EntityId) -> TesseraResult<usize> {
    require(doc, parent_id)?
        .children
        .iter()
        .position(|c| c == child_id)
        .ok_or_else(|| {
            TesseraError::invariant(format!("'{}' is not a child of '{}'", child_id, parent_id))
        })
}

/// Create `entity` (which names its parent) appended to the parent's children.
pub fn create_entity(entity: Entity) -> PatchOperation {
    PatchOperation::new(OperationKind::CreateEntity {
        entity,
        descendants: Vec::new(),
        index: None,
        restore: false,
    })
}

/// Create a fresh, empty entity under `parent_id`.
pub fn create_child(parent_id: &EntityId, name: &str) -> PatchOperation {
    create_entity(Entity::new(
        EntityId::generate(),
        name,
        Some(parent_id.clone()),
    ))
}

pub fn delete_entity(doc: &Document, entity_id: &EntityId) -> TesseraResult<PatchOperation> {
    Ok(PatchOperation::new(OperationKind::DeleteEntity {
        entity_id: entity_id.clone(),
        previous_state: Some(snapshot(doc, entity_id)?),
    }))
}

pub fn reparent(
    doc: &Document,
    entity_id: &EntityId,
    new_parent_id: &EntityId,
    new_index: Option<usize>,
) -> TesseraResult<PatchOperation> {
    let previous_parent_id = require(doc, entity_id)?.parent_id.clone();
    let previous_index = match &previous_parent_id {
        Some(parent_id) => Some(child_index(doc, parent_id, entity_id)?),
        None => None,
    };
    Ok(PatchOperation::new(OperationKind::Reparent {
        entity_id: entity_id.clone(),
        new_parent_id: new_parent_id.clone(),
        new_index,
        previous_parent_id,
        previous_index,
    }))
}

pub fn add_component(entity_id: &EntityId, component: Component) -> PatchOperation {
    PatchOperation::new(OperationKind::AddComponent {
        entity_id: entity_id.clone(),
        component,
        index: None,
        restore: false,
    })
}

/// Remove the last component of `component_type` on the entity.
pub fn remove_component(
    doc: &Document,
    entity_id: &EntityId,
    component_type: &str,
) -> TesseraResult<PatchOperation> {
    let entity = require(doc, entity_id)?;
    let index = entity
        .components
        .iter()
        .rposition(|c| c.component_type == component_type)
        .ok_or_else(|| {
            TesseraError::invariant(format!(
                "entity '{}' has no {} component",
                entity_id, component_type
            ))
        })?;
    Ok(PatchOperation::new(OperationKind::RemoveComponent {
        entity_id: entity_id.clone(),
        component_type: component_type.to_string(),
        previous_index: Some(index),
        previous_state: Some(entity.components[index].clone()),
    }))
}

pub fn set_property(
    doc: &Document,
    entity_id: &EntityId,
    target: PropertyTarget,
    value: Value,
    registry: &ComponentRegistry,
) -> TesseraResult<PatchOperation> {
    let previous_value = read_property(require(doc, entity_id)?, &target, registry)?;
    Ok(PatchOperation::new(OperationKind::SetProperty {
        entity_id: entity_id.clone(),
        target,
        value,
        previous_value: Some(previous_value),
    }))
}

pub fn add_keyframe(entity_id: &EntityId, track: &str, keyframe: Keyframe) -> PatchOperation {
    PatchOperation::new(OperationKind::AddKeyframe {
        entity_id: entity_id.clone(),
        track: track.to_string(),
        keyframe,
    })
}

pub fn remove_keyframe(
    doc: &Document,
    entity_id: &EntityId,
    track: &str,
    time: f64,
) -> TesseraResult<PatchOperation> {
    let tracks = require(doc, entity_id)?
        .component(ANIMATION_COMPONENT)
        .and_then(|c| c.properties.get("tracks"))
        .and_then(|t| t.get(track));
    let keyframes = match tracks {
        Some(value) => parse_track(track, value)?,
        None => Vec::new(),
    };
    let keyframe = keyframes
        .into_iter()
        .find(|k| k.time == time)
        .ok_or_else(|| {
            TesseraError::invariant(format!("track '{}' has no keyframe at {}", track, time))
        })?;
    Ok(PatchOperation::new(OperationKind::RemoveKeyframe {
        entity_id: entity_id.clone(),
        track: track.to_string(),
        time,
        previous_state: Some(keyframe),
    }))
}

pub fn add_child(parent_id: &EntityId, child_id: &EntityId, index: Option<usize>) -> PatchOperation {
    PatchOperation::new(OperationKind::AddChild {
        parent_id: parent_id.clone(),
        child_id: child_id.clone(),
        index,
    })
}

pub fn remove_child(
    doc: &Document,
    parent_id: &EntityId,
    child_id: &EntityId,
) -> TesseraResult<PatchOperation> {
    Ok(PatchOperation::new(OperationKind::RemoveChild {
        parent_id: parent_id.clone(),
        child_id: child_id.clone(),
        previous_index: Some(child_index(doc, parent_id, child_id)?),
    }))
}

pub fn batch(operations: Vec<PatchOperation>) -> PatchOperation {
    PatchOperation::new(OperationKind::BatchOp { operations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use serde_json::json;

    #[test]
    fn test_set_property_reads_default() {
        let registry = build_registry();
        let mut doc = Document::empty("Ops");
        let lamp = EntityId::new("lamp");
        doc.insert_child(
            Entity::new(lamp.clone(), "Lamp", Some(doc.root_entity_id.clone()))
                .with_component(Component::new("Light")),
        );
        let op = set_property(
            &doc,
            &lamp,
            PropertyTarget::Component {
                component_type: "Light".into(),
                index: 0,
                property: "intensity".into(),
            },
            json!(3.0),
            &registry,
        )
        .unwrap();
        match op.kind {
            OperationKind::SetProperty { previous_value, .. } => {
                assert_eq!(previous_value, Some(json!(1.0)))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reparent_captures_position() {
        let mut doc = Document::empty("Ops");
        let root = doc.root_entity_id.clone();
        let a = EntityId::new("a");
        let b = EntityId::new("b");
        doc.insert_child(Entity::new(a.clone(), "A", Some(root.clone())));
        doc.insert_child(Entity::new(b.clone(), "B", Some(root.clone())));
        let op = reparent(&doc, &b, &a, None).unwrap();
        match op.kind {
            OperationKind::Reparent {
                previous_parent_id,
                previous_index,
                ..
            } => {
                assert_eq!(previous_parent_id, Some(root));
                assert_eq!(previous_index, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_remove_missing_keyframe() {
        let mut doc = Document::empty("Ops");
        let e = EntityId::new("e");
        doc.insert_child(Entity::new(e.clone(), "E", Some(doc.root_entity_id.clone())));
        assert!(remove_keyframe(&doc, &e, "position.x", 0.0).is_err());
    }
}
