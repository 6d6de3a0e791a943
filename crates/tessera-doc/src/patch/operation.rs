use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tessera_core::{EntityId, OperationId, TesseraError, TesseraResult};

use crate::schema::{Component, Entity, Keyframe};

/// Current version of the operation wire format.
pub const OPERATION_VERSION: u32 = 1;

/// Every operation type name accepted on the wire.
pub const OPERATION_TYPES: &[&str] = &[
    "CreateEntity",
    "DeleteEntity",
    "Reparent",
    "AddComponent",
    "RemoveComponent",
    "SetProperty",
    "AddKeyframe",
    "RemoveKeyframe",
    "AddChild",
    "RemoveChild",
    "BatchOp",
];

/// Who produced an operation. Persisted, never interpreted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    User,
    Ai,
    System,
    Replay,
}

/// A deleted entity together with its whole subtree and its position in the
/// parent's child list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntitySnapshot {
    pub entity: Entity,
    #[serde(default)]
    pub descendants: Vec<Entity>,
    #[serde(default)]
    pub index: Option<usize>,
}

/// The field a `SetProperty` operation writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PropertyTarget {
    Name,
    Visible,
    Locked,
    Tags,
    Transform,
    /// One engine's tuning block. Writing `null` removes it.
    Tuning { engine: String },
    /// A property of the `index`-th component of `component_type` on the
    /// entity (counting only components of that type).
    Component {
        component_type: String,
        #[serde(default)]
        index: usize,
        property: String,
    },
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Missing field → `None`, explicit `null` → `Some(Value::Null)`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// The closed set of mutations. Destructive and overwriting kinds carry the
/// state they replace so that [`crate::patch::invert`] needs nothing but the
/// operation itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum OperationKind {
    /// Insert `entity` (and its `descendants`) under `entity.parent_id`.
    ///
    /// `restore` marks a subtree coming back from a `DeleteEntity` snapshot:
    /// unknown component types it carries are kept instead of rejected.
    CreateEntity {
        entity: Entity,
        #[serde(default)]
        descendants: Vec<Entity>,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        restore: bool,
    },
    DeleteEntity {
        entity_id: EntityId,
        #[serde(default)]
        previous_state: Option<EntitySnapshot>,
    },
    Reparent {
        entity_id: EntityId,
        new_parent_id: EntityId,
        #[serde(default)]
        new_index: Option<usize>,
        #[serde(default)]
        previous_parent_id: Option<EntityId>,
        #[serde(default)]
        previous_index: Option<usize>,
    },
    AddComponent {
        entity_id: EntityId,
        component: Component,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default, skip_serializing_if = "is_false")]
        restore: bool,
    },
    /// Removes the component at `previous_index` when given, otherwise the
    /// last component of `component_type`. Only the indexed form can be
    /// inverted.
    RemoveComponent {
        entity_id: EntityId,
        component_type: String,
        #[serde(default)]
        previous_index: Option<usize>,
        #[serde(default)]
        previous_state: Option<Component>,
    },
    SetProperty {
        entity_id: EntityId,
        target: PropertyTarget,
        value: Value,
        #[serde(
            default,
            deserialize_with = "present_value",
            skip_serializing_if = "Option::is_none"
        )]
        previous_value: Option<Value>,
    },
    AddKeyframe {
        entity_id: EntityId,
        track: String,
        keyframe: Keyframe,
    },
    RemoveKeyframe {
        entity_id: EntityId,
        track: String,
        time: f64,
        #[serde(default)]
        previous_state: Option<Keyframe>,
    },
    AddChild {
        parent_id: EntityId,
        child_id: EntityId,
        #[serde(default)]
        index: Option<usize>,
    },
    RemoveChild {
        parent_id: EntityId,
        child_id: EntityId,
        #[serde(default)]
        previous_index: Option<usize>,
    },
    BatchOp {
        operations: Vec<PatchOperation>,
    },
}

impl OperationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            OperationKind::CreateEntity { .. } => "CreateEntity",
            OperationKind::DeleteEntity { .. } => "DeleteEntity",
            OperationKind::Reparent { .. } => "Reparent",
            OperationKind::AddComponent { .. } => "AddComponent",
            OperationKind::RemoveComponent { .. } => "RemoveComponent",
            OperationKind::SetProperty { .. } => "SetProperty",
            OperationKind::AddKeyframe { .. } => "AddKeyframe",
            OperationKind::RemoveKeyframe { .. } => "RemoveKeyframe",
            OperationKind::AddChild { .. } => "AddChild",
            OperationKind::RemoveChild { .. } => "RemoveChild",
            OperationKind::BatchOp { .. } => "BatchOp",
        }
    }
}

/// One versioned, self-invertible mutation of a document.
///
/// On the wire the kind is flattened into `{"type": ..., "payload": {...}}`
/// next to the envelope fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawOperation")]
pub struct PatchOperation {
    pub id: OperationId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub origin: Origin,
    pub version: u32,
    #[serde(flatten)]
    pub kind: OperationKind,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOperation {
    id: OperationId,
    timestamp: i64,
    origin: Origin,
    version: u32,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl TryFrom<RawOperation> for PatchOperation {
    type Error = serde_json::Error;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let kind = serde_json::from_value(json!({ "type": raw.kind, "payload": raw.payload }))?;
        Ok(PatchOperation {
            id: raw.id,
            timestamp: raw.timestamp,
            origin: raw.origin,
            version: raw.version,
            kind,
        })
    }
}

impl PatchOperation {
    /// A user-originated operation at the current version, stamped now.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: OperationId::generate(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            origin: Origin::User,
            version: OPERATION_VERSION,
            kind,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Parse a current-version operation from its wire form.
///
/// Unknown operation types (anywhere in a batch) are reported as
/// [`TesseraError::UnknownType`]; older versions must go through
/// [`crate::migrate::migrate_operation`] first.
pub fn parse_operation(raw: Value) -> TesseraResult<PatchOperation> {
    check_envelope(&raw)?;
    serde_json::from_value(raw).map_err(|e| TesseraError::schema("operation", e.to_string()))
}

fn check_envelope(raw: &Value) -> TesseraResult<()> {
    let obj = raw
        .as_object()
        .ok_or_else(|| TesseraError::schema("operation", "expected an object"))?;
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TesseraError::schema("operation.type", "missing operation type"))?;
    if !OPERATION_TYPES.contains(&kind) {
        return Err(TesseraError::unknown_type("operation", kind));
    }
    match obj.get("version").and_then(Value::as_u64) {
        Some(v) if v == u64::from(OPERATION_VERSION) => {}
        Some(v) => {
            return Err(TesseraError::schema(
                "operation.version",
                format!(
                    "expected {}, found {} (migrate the operation first)",
                    OPERATION_VERSION, v
                ),
            ))
        }
        None => {
            return Err(TesseraError::schema(
                "operation.version",
                "missing or non-numeric version",
            ))
        }
    }
    if kind == "BatchOp" {
        if let Some(children) = raw["payload"]["operations"].as_array() {
            for child in children {
                check_envelope(child)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let op = PatchOperation::new(OperationKind::SetProperty {
            entity_id: EntityId::new("e1"),
            target: PropertyTarget::Name,
            value: json!("Crate"),
            previous_value: Some(json!("Box")),
        })
        .with_origin(Origin::Ai);
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["type"], json!("SetProperty"));
        assert_eq!(value["origin"], json!("ai"));
        assert_eq!(value["version"], json!(OPERATION_VERSION));
        assert_eq!(value["payload"]["entityId"], json!("e1"));
        assert_eq!(value["payload"]["target"], json!({ "kind": "name" }));
        assert_eq!(value["payload"]["previousValue"], json!("Box"));

        let parsed = parse_operation(value).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn test_null_previous_value_is_kept() {
        let op = PatchOperation::new(OperationKind::SetProperty {
            entity_id: EntityId::new("e1"),
            target: PropertyTarget::Tuning {
                engine: "unity".into(),
            },
            value: json!({ "lod": 2 }),
            previous_value: Some(Value::Null),
        });
        let parsed = parse_operation(serde_json::to_value(&op).unwrap()).unwrap();
        match parsed.kind {
            OperationKind::SetProperty { previous_value, .. } => {
                assert_eq!(previous_value, Some(Value::Null))
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut value = serde_json::to_value(PatchOperation::new(OperationKind::BatchOp {
            operations: vec![],
        }))
        .unwrap();
        value["type"] = json!("Explode");
        assert!(matches!(
            parse_operation(value),
            Err(TesseraError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_unknown_type_inside_batch_rejected() {
        let child = PatchOperation::new(OperationKind::AddChild {
            parent_id: EntityId::new("p"),
            child_id: EntityId::new("c"),
            index: None,
        });
        let mut child_value = serde_json::to_value(child).unwrap();
        child_value["type"] = json!("Teleport");
        let batch = PatchOperation::new(OperationKind::BatchOp { operations: vec![] });
        let mut value = serde_json::to_value(batch).unwrap();
        value["payload"]["operations"] = json!([child_value]);
        assert!(matches!(
            parse_operation(value),
            Err(TesseraError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_stale_version_rejected() {
        let mut value = serde_json::to_value(PatchOperation::new(OperationKind::BatchOp {
            operations: vec![],
        }))
        .unwrap();
        value["version"] = json!(0);
        assert!(matches!(
            parse_operation(value),
            Err(TesseraError::SchemaValidation { .. })
        ));
    }
}
