use serde_json::{Map, Value};
use tessera_core::TesseraResult;

use super::MigrationRegistry;
use crate::patch::{parse_operation, PatchOperation, OPERATION_VERSION};

/// The operation format chain, ending at [`OPERATION_VERSION`].
pub fn operation_migrations() -> MigrationRegistry {
    MigrationRegistry::new("operation", "version", OPERATION_VERSION).with(
        1,
        "kind -> type, old* -> previous*, default origin",
        upgrade_to_v1,
    )
}

fn upgrade_to_v1(mut op: Map<String, Value>) -> Result<Value, String> {
    if let Some(kind) = op.remove("kind") {
        op.entry("type").or_insert(kind);
    }
    op.entry("origin")
        .or_insert_with(|| Value::String("user".into()));

    if let Some(payload) = op.get_mut("payload").and_then(Value::as_object_mut) {
        for (old, new) in [("oldValue", "previousValue"), ("oldState", "previousState")] {
            if let Some(value) = payload.remove(old) {
                payload.insert(new.into(), value);
            }
        }
        if let Some(children) = payload.get_mut("operations").and_then(Value::as_array_mut) {
            for child in children.iter_mut() {
                let Value::Object(obj) = std::mem::take(child) else {
                    return Err("batch children must be objects".into());
                };
                let mut upgraded = upgrade_to_v1(obj)?;
                if let Some(obj) = upgraded.as_object_mut() {
                    obj.insert("version".into(), Value::from(1u32));
                }
                *child = upgraded;
            }
        }
    }
    Ok(Value::Object(op))
}

/// Upgrade a stored operation to the current version and parse it.
pub fn migrate_operation(raw: Value) -> TesseraResult<PatchOperation> {
    let migrated = operation_migrations().migrate(raw)?;
    parse_operation(migrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::OperationKind;
    use serde_json::json;

    #[test]
    fn test_v0_batch_children_upgraded() {
        let raw = json!({
            "id": "op-batch",
            "timestamp": 1,
            "version": 0,
            "kind": "BatchOp",
            "payload": {
                "operations": [{
                    "id": "op-child",
                    "timestamp": 1,
                    "version": 0,
                    "kind": "SetProperty",
                    "payload": {
                        "entityId": "e1",
                        "target": { "kind": "name" },
                        "value": "New",
                        "oldValue": "Old"
                    }
                }]
            }
        });
        let op = migrate_operation(raw).unwrap();
        assert_eq!(op.version, OPERATION_VERSION);
        let OperationKind::BatchOp { operations } = op.kind else {
            panic!("expected a batch");
        };
        assert_eq!(operations[0].version, OPERATION_VERSION);
        match &operations[0].kind {
            OperationKind::SetProperty { previous_value, .. } => {
                assert_eq!(previous_value, &Some(json!("Old")))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
