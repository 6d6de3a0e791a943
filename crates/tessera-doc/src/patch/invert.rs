use tessera_core::{OperationId, TesseraError, TesseraResult};

use super::operation::{EntitySnapshot, OperationKind, PatchOperation};

fn missing(op: &PatchOperation, field: &str) -> TesseraError {
    TesseraError::Inversion(format!(
        "{} operation {} carries no {}",
        op.type_name(),
        op.id,
        field
    ))
}

/// Compute the operation that undoes `op`.
///
/// This is a pure function of the operation's own payload: the "new" and
/// "previous" halves are swapped and nothing else is consulted. A batch is
/// inverted child by child in reverse order.
///
/// Removals and moves must record the position they took the item from;
/// inverting one that does not is an `Inversion` error.
pub fn invert(op: &PatchOperation) -> TesseraResult<PatchOperation> {
    let kind = match &op.kind {
        OperationKind::CreateEntity {
            entity,
            descendants,
            index,
            ..
        } => OperationKind::DeleteEntity {
            entity_id: entity.id.clone(),
            previous_state: Some(EntitySnapshot {
                entity: entity.clone(),
                descendants: descendants.clone(),
                index: *index,
            }),
        },
        OperationKind::DeleteEntity { previous_state, .. } => {
            let snapshot = previous_state
                .clone()
                .ok_or_else(|| missing(op, "previousState"))?;
            let index = snapshot
                .index
                .ok_or_else(|| missing(op, "previousState.index"))?;
            OperationKind::CreateEntity {
                entity: snapshot.entity,
                descendants: snapshot.descendants,
                index: Some(index),
                restore: true,
            }
        }
        OperationKind::Reparent {
            entity_id,
            new_parent_id,
            new_index,
            previous_parent_id,
            previous_index,
        } => OperationKind::Reparent {
            entity_id: entity_id.clone(),
            new_parent_id: previous_parent_id
                .clone()
                .ok_or_else(|| missing(op, "previousParentId"))?,
            new_index: Some(previous_index.ok_or_else(|| missing(op, "previousIndex"))?),
            previous_parent_id: Some(new_parent_id.clone()),
            previous_index: *new_index,
        },
        OperationKind::AddComponent {
            entity_id,
            component,
            index,
            ..
        } => OperationKind::RemoveComponent {
            entity_id: entity_id.clone(),
            component_type: component.component_type.clone(),
            previous_index: *index,
            previous_state: Some(component.clone()),
        },
        OperationKind::RemoveComponent {
            entity_id,
            previous_index,
            previous_state,
            ..
        } => OperationKind::AddComponent {
            entity_id: entity_id.clone(),
            component: previous_state
                .clone()
                .ok_or_else(|| missing(op, "previousState"))?,
            index: Some(previous_index.ok_or_else(|| missing(op, "previousIndex"))?),
            restore: true,
        },
        OperationKind::SetProperty {
            entity_id,
            target,
            value,
            previous_value,
        } => OperationKind::SetProperty {
            entity_id: entity_id.clone(),
            target: target.clone(),
            value: previous_value
                .clone()
                .ok_or_else(|| missing(op, "previousValue"))?,
            previous_value: Some(value.clone()),
        },
        OperationKind::AddKeyframe {
            entity_id,
            track,
            keyframe,
        } => OperationKind::RemoveKeyframe {
            entity_id: entity_id.clone(),
            track: track.clone(),
            time: keyframe.time,
            previous_state: Some(keyframe.clone()),
        },
        OperationKind::RemoveKeyframe {
            entity_id,
            track,
            previous_state,
            ..
        } => OperationKind::AddKeyframe {
            entity_id: entity_id.clone(),
            track: track.clone(),
            keyframe: previous_state
                .clone()
                .ok_or_else(|| missing(op, "previousState"))?,
        },
        OperationKind::AddChild {
            parent_id,
            child_id,
            index,
        } => OperationKind::RemoveChild {
            parent_id: parent_id.clone(),
            child_id: child_id.clone(),
            previous_index: *index,
        },
        OperationKind::RemoveChild {
            parent_id,
            child_id,
            previous_index,
        } => OperationKind::AddChild {
            parent_id: parent_id.clone(),
            child_id: child_id.clone(),
            index: Some(previous_index.ok_or_else(|| missing(op, "previousIndex"))?),
        },
        OperationKind::BatchOp { operations } => OperationKind::BatchOp {
            operations: operations
                .iter()
                .rev()
                .map(invert)
                .collect::<TesseraResult<Vec<_>>>()?,
        },
    };

    Ok(PatchOperation {
        id: OperationId::generate(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        origin: op.origin,
        version: op.version,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{ops, PropertyTarget};
    use crate::schema::{Component, Entity, Keyframe};
    use serde_json::json;
    use tessera_core::EntityId;

    #[test]
    fn test_set_property_swaps_values() {
        let op = PatchOperation::new(OperationKind::SetProperty {
            entity_id: EntityId::new("e"),
            target: PropertyTarget::Visible,
            value: json!(false),
            previous_value: Some(json!(true)),
        });
        let inverse = invert(&op).unwrap();
        assert_ne!(inverse.id, op.id);
        assert_eq!(inverse.origin, op.origin);
        match inverse.kind {
            OperationKind::SetProperty {
                value,
                previous_value,
                ..
            } => {
                assert_eq!(value, json!(true));
                assert_eq!(previous_value, Some(json!(false)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_previous_state_is_an_error() {
        let op = PatchOperation::new(OperationKind::DeleteEntity {
            entity_id: EntityId::new("e"),
            previous_state: None,
        });
        assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));

        let op = PatchOperation::new(OperationKind::SetProperty {
            entity_id: EntityId::new("e"),
            target: PropertyTarget::Name,
            value: json!("x"),
            previous_value: None,
        });
        assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));
    }

    #[test]
    fn test_removal_without_position_is_an_error() {
        let op = PatchOperation::new(OperationKind::RemoveComponent {
            entity_id: EntityId::new("e"),
            component_type: "MeshRenderer".into(),
            previous_index: None,
            previous_state: Some(Component::new("MeshRenderer")),
        });
        assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));

        let op = PatchOperation::new(OperationKind::Reparent {
            entity_id: EntityId::new("e"),
            new_parent_id: EntityId::new("b"),
            new_index: None,
            previous_parent_id: Some(EntityId::new("a")),
            previous_index: None,
        });
        assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));

        let op = PatchOperation::new(OperationKind::DeleteEntity {
            entity_id: EntityId::new("e"),
            previous_state: Some(EntitySnapshot {
                entity: Entity::new(EntityId::new("e"), "E", Some(EntityId::new("a"))),
                descendants: Vec::new(),
                index: None,
            }),
        });
        assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));
    }

    #[test]
    fn test_restoring_inverses_are_flagged() {
        let op = PatchOperation::new(OperationKind::RemoveComponent {
            entity_id: EntityId::new("e"),
            component_type: "Hologram".into(),
            previous_index: Some(1),
            previous_state: Some(Component::new("Hologram")),
        });
        match invert(&op).unwrap().kind {
            OperationKind::AddComponent { index, restore, .. } => {
                assert_eq!(index, Some(1));
                assert!(restore);
            }
            other => panic!("unexpected {:?}", other),
        }
        // Newly authored additions are not restorations.
        let added = ops::add_component(&EntityId::new("e"), Component::new("Light"));
        let OperationKind::AddComponent { restore, .. } = added.kind else {
            panic!("expected AddComponent");
        };
        assert!(!restore);
    }

    #[test]
    fn test_double_inversion_restores_payload() {
        let op = PatchOperation::new(OperationKind::AddKeyframe {
            entity_id: EntityId::new("e"),
            track: "rotation.y".into(),
            keyframe: Keyframe::new(0.5, json!(90.0)),
        });
        let twice = invert(&invert(&op).unwrap()).unwrap();
        assert_eq!(twice.kind, op.kind);
    }

    #[test]
    fn test_batch_inverts_in_reverse() {
        let a = PatchOperation::new(OperationKind::AddChild {
            parent_id: EntityId::new("p"),
            child_id: EntityId::new("a"),
            index: Some(0),
        });
        let b = PatchOperation::new(OperationKind::AddChild {
            parent_id: EntityId::new("p"),
            child_id: EntityId::new("b"),
            index: Some(1),
        });
        let batch = PatchOperation::new(OperationKind::BatchOp {
            operations: vec![a, b],
        });
        let OperationKind::BatchOp { operations } = invert(&batch).unwrap().kind else {
            panic!("expected a batch");
        };
        let children: Vec<_> = operations
            .iter()
            .map(|op| match &op.kind {
                OperationKind::RemoveChild { child_id, .. } => child_id.as_str().to_string(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(children, vec!["b", "a"]);
    }
}
