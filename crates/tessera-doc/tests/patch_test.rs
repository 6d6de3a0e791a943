use serde_json::json;
use tessera_core::{EntityId, TesseraError, Transform, Vec3};
use tessera_doc::patch::{ops, PropertyTarget};
use tessera_doc::registry::ANIMATION_COMPONENT;
use tessera_doc::schema::{Component, Entity, Keyframe};
use tessera_doc::{
    apply_operation, build_registry, invert, parse_document, ComponentRegistry, Document,
    OperationKind, PatchOperation, UnknownComponentPolicy,
};

struct Fixture {
    registry: ComponentRegistry,
    doc: Document,
    root: EntityId,
    crate_id: EntityId,
    shelf: EntityId,
    lamp: EntityId,
}

/// root ─┬─ shelf ── lamp (Light, Animation)
///       └─ crate (MeshRenderer)
fn fixture() -> Fixture {
    let registry = build_registry();
    let mut doc = Document::empty("Patch");
    let root = doc.root_entity_id.clone();
    let shelf = EntityId::new("shelf");
    let crate_id = EntityId::new("crate");
    let lamp = EntityId::new("lamp");
    doc.insert_child(Entity::new(shelf.clone(), "Shelf", Some(root.clone())));
    doc.insert_child(
        Entity::new(crate_id.clone(), "Crate", Some(root.clone()))
            .with_component(Component::new("MeshRenderer")),
    );
    doc.insert_child(
        Entity::new(lamp.clone(), "Lamp", Some(shelf.clone()))
            .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .with_component(Component::new("Light"))
            .with_component(Component::new(ANIMATION_COMPONENT).with(
                "tracks",
                json!({ "intensity": [{ "time": 0.0, "value": 1.0 }, { "time": 1.0, "value": 0.2 }] }),
            )),
    );
    // Normalize component defaults the way a loaded document would be.
    let raw = serde_json::to_value(&doc).unwrap();
    let doc = parse_document(raw, &registry, UnknownComponentPolicy::Reject).unwrap();
    Fixture {
        registry,
        doc,
        root,
        crate_id,
        shelf,
        lamp,
    }
}

fn assert_undoes(f: &Fixture, op: PatchOperation) {
    let after = apply_operation(&f.doc, &op, &f.registry).unwrap();
    assert_ne!(after, f.doc, "{} changed nothing", op.type_name());
    let inverse = invert(&op).unwrap();
    let restored = apply_operation(&after, &inverse, &f.registry).unwrap();
    assert_eq!(restored, f.doc, "{} was not undone", op.type_name());
}

#[test]
fn test_inverse_create_entity() {
    let f = fixture();
    assert_undoes(&f, ops::create_child(&f.shelf, "Book"));
}

#[test]
fn test_inverse_delete_entity_with_subtree() {
    let f = fixture();
    assert_undoes(&f, ops::delete_entity(&f.doc, &f.shelf).unwrap());
}

#[test]
fn test_inverse_reparent_restores_position() {
    let f = fixture();
    assert_undoes(&f, ops::reparent(&f.doc, &f.shelf, &f.crate_id, None).unwrap());
}

#[test]
fn test_inverse_add_component() {
    let f = fixture();
    let op = ops::add_component(&f.crate_id, Component::new("RigidBody"));
    assert_undoes(&f, op);
}

#[test]
fn test_inverse_remove_component() {
    let f = fixture();
    assert_undoes(&f, ops::remove_component(&f.doc, &f.lamp, "Light").unwrap());
}

#[test]
fn test_inverse_set_property_every_target() {
    let f = fixture();
    let targets = [
        (PropertyTarget::Name, json!("Big Crate")),
        (PropertyTarget::Visible, json!(false)),
        (PropertyTarget::Locked, json!(true)),
        (PropertyTarget::Tags, json!(["prop"])),
        (
            PropertyTarget::Transform,
            json!({ "position": { "x": 5.0, "y": 0.0, "z": 0.0 } }),
        ),
        (
            PropertyTarget::Tuning {
                engine: "unreal".into(),
            },
            json!({ "nanite": true }),
        ),
        (
            PropertyTarget::Component {
                component_type: "MeshRenderer".into(),
                index: 0,
                property: "color".into(),
            },
            json!("#ff0000"),
        ),
    ];
    for (target, value) in targets {
        let op = ops::set_property(&f.doc, &f.crate_id, target, value, &f.registry).unwrap();
        assert_undoes(&f, op);
    }
}

#[test]
fn test_inverse_keyframes() {
    let f = fixture();
    assert_undoes(
        &f,
        ops::add_keyframe(&f.lamp, "intensity", Keyframe::new(0.5, json!(0.6))),
    );
    assert_undoes(
        &f,
        ops::remove_keyframe(&f.doc, &f.lamp, "intensity", 1.0).unwrap(),
    );
}

#[test]
fn test_inverse_child_bookkeeping_pair() {
    let f = fixture();
    // Detach and attach elsewhere: a reparent spelled as two halves.
    let op = ops::batch(vec![
        ops::remove_child(&f.doc, &f.root, &f.crate_id).unwrap(),
        ops::add_child(&f.shelf, &f.crate_id, Some(0)),
    ]);
    let after = apply_operation(&f.doc, &op, &f.registry).unwrap();
    assert_eq!(
        after.get_entity(&f.crate_id).unwrap().parent_id,
        Some(f.shelf.clone())
    );
    assert_undoes(&f, op);
}

#[test]
fn test_batch_is_all_or_nothing() {
    let f = fixture();
    let op = ops::batch(vec![
        ops::set_property(
            &f.doc,
            &f.crate_id,
            PropertyTarget::Name,
            json!("Renamed"),
            &f.registry,
        )
        .unwrap(),
        ops::create_child(&f.root, "Ghost"),
        // Second renderer on the same entity: singleton violation.
        ops::add_component(&f.crate_id, Component::new("MeshRenderer")),
    ]);
    let result = apply_operation(&f.doc, &op, &f.registry);
    assert!(result.unwrap_err().is_invariant());
    assert_eq!(f.doc.get_entity(&f.crate_id).unwrap().name, "Crate");
    assert_eq!(f.doc.entity_count(), 4);
}

#[test]
fn test_batch_inverse_runs_in_reverse_order() {
    let f = fixture();
    // Move the crate under the shelf, then delete the shelf (and the crate).
    let move_op = ops::reparent(&f.doc, &f.crate_id, &f.shelf, None).unwrap();
    let moved = apply_operation(&f.doc, &move_op, &f.registry).unwrap();
    let delete_op = ops::delete_entity(&moved, &f.shelf).unwrap();
    let batch = ops::batch(vec![move_op.clone(), delete_op.clone()]);

    let after = apply_operation(&f.doc, &batch, &f.registry).unwrap();
    assert_eq!(after.entity_count(), 1);

    let restored = apply_operation(&after, &invert(&batch).unwrap(), &f.registry).unwrap();
    assert_eq!(restored, f.doc);

    // Undoing in forward order tries to move the crate back before the
    // shelf subtree exists again.
    let forward = ops::batch(vec![invert(&move_op).unwrap(), invert(&delete_op).unwrap()]);
    match apply_operation(&after, &forward, &f.registry) {
        Ok(doc) => assert_ne!(doc, f.doc),
        Err(e) => assert!(e.is_invariant()),
    }
}

#[test]
fn test_singleton_violation_leaves_document_unchanged() {
    let f = fixture();
    let before = f.doc.clone();
    let op = ops::add_component(&f.crate_id, Component::new("MeshRenderer"));
    let err = apply_operation(&f.doc, &op, &f.registry).unwrap_err();
    assert!(matches!(err, TesseraError::InvariantViolation(_)));
    assert_eq!(f.doc, before);
}

#[test]
fn test_missing_entity_is_rejected() {
    let f = fixture();
    let op = PatchOperation::new(OperationKind::SetProperty {
        entity_id: EntityId::new("nobody"),
        target: PropertyTarget::Visible,
        value: json!(false),
        previous_value: Some(json!(true)),
    });
    assert!(apply_operation(&f.doc, &op, &f.registry)
        .unwrap_err()
        .is_invariant());
}

/// A saved document carrying a component type this build does not know.
/// `prop` has components [Hologram, MeshRenderer, Light].
fn opaque_fixture() -> (ComponentRegistry, Document, EntityId) {
    let registry = build_registry();
    let mut doc = Document::empty("Opaque");
    let root = doc.root_entity_id.clone();
    let prop = EntityId::new("prop");
    doc.insert_child(
        Entity::new(prop.clone(), "Prop", Some(root))
            .with_component(Component::new("Hologram").with("tint", json!("blue")))
            .with_component(Component::new("MeshRenderer"))
            .with_component(Component::new("Light")),
    );
    let raw = serde_json::to_value(&doc).unwrap();
    let doc = parse_document(raw, &registry, UnknownComponentPolicy::PassThrough).unwrap();
    (registry, doc, prop)
}

fn component_types(doc: &Document, id: &EntityId) -> Vec<String> {
    doc.get_entity(id)
        .unwrap()
        .components
        .iter()
        .map(|c| c.component_type.clone())
        .collect()
}

#[test]
fn test_inverse_delete_entity_with_opaque_component() {
    let (registry, doc, prop) = opaque_fixture();
    let op = ops::delete_entity(&doc, &prop).unwrap();
    let after = apply_operation(&doc, &op, &registry).unwrap();
    let restored = apply_operation(&after, &invert(&op).unwrap(), &registry).unwrap();
    assert_eq!(restored, doc);
}

#[test]
fn test_inverse_remove_opaque_component_keeps_order() {
    let (registry, doc, prop) = opaque_fixture();
    let op = ops::remove_component(&doc, &prop, "Hologram").unwrap();
    let after = apply_operation(&doc, &op, &registry).unwrap();
    assert_eq!(component_types(&after, &prop), vec!["MeshRenderer", "Light"]);
    let restored = apply_operation(&after, &invert(&op).unwrap(), &registry).unwrap();
    assert_eq!(component_types(&restored, &prop), vec!["Hologram", "MeshRenderer", "Light"]);
    assert_eq!(restored, doc);
}

#[test]
fn test_inverse_remove_first_of_several_components_keeps_order() {
    let (registry, doc, prop) = opaque_fixture();
    let op = ops::remove_component(&doc, &prop, "MeshRenderer").unwrap();
    let after = apply_operation(&doc, &op, &registry).unwrap();
    let restored = apply_operation(&after, &invert(&op).unwrap(), &registry).unwrap();
    assert_eq!(restored, doc);
}

#[test]
fn test_unindexed_remove_component_cannot_be_inverted() {
    let (registry, doc, prop) = opaque_fixture();
    let op = PatchOperation::new(OperationKind::RemoveComponent {
        entity_id: prop.clone(),
        component_type: "MeshRenderer".into(),
        previous_index: None,
        previous_state: doc.get_entity(&prop).unwrap().component("MeshRenderer").cloned(),
    });
    // Still applicable, but there is no position to restore it to.
    let after = apply_operation(&doc, &op, &registry).unwrap();
    assert_eq!(component_types(&after, &prop), vec!["Hologram", "Light"]);
    assert!(matches!(invert(&op), Err(TesseraError::Inversion(_))));
}

#[test]
fn test_inverse_set_unset_opaque_property() {
    let (registry, doc, prop) = opaque_fixture();
    let target = PropertyTarget::Component {
        component_type: "Hologram".into(),
        index: 0,
        property: "hue".into(),
    };
    let op = ops::set_property(&doc, &prop, target, json!(5), &registry).unwrap();
    let after = apply_operation(&doc, &op, &registry).unwrap();
    let hologram = after.get_entity(&prop).unwrap().component("Hologram").unwrap();
    assert_eq!(hologram.properties["hue"], json!(5));

    let restored = apply_operation(&after, &invert(&op).unwrap(), &registry).unwrap();
    let hologram = restored.get_entity(&prop).unwrap().component("Hologram").unwrap();
    assert!(!hologram.properties.contains_key("hue"));
    assert_eq!(restored, doc);
}

#[test]
fn test_opaque_null_property_is_unset() {
    let registry = build_registry();
    let mut doc = Document::empty("Nulls");
    let root = doc.root_entity_id.clone();
    let prop = EntityId::new("prop");
    doc.insert_child(
        Entity::new(prop.clone(), "Prop", Some(root))
            .with_component(Component::new("Hologram").with("hue", json!(null))),
    );
    let raw = serde_json::to_value(&doc).unwrap();
    let doc = parse_document(raw, &registry, UnknownComponentPolicy::PassThrough).unwrap();
    let hologram = doc.get_entity(&prop).unwrap().component("Hologram").unwrap();
    assert!(hologram.properties.is_empty());
}

#[test]
fn test_authored_unknown_component_still_rejected() {
    let (registry, doc, prop) = opaque_fixture();
    let op = ops::add_component(&prop, Component::new("Teleporter"));
    assert!(matches!(
        apply_operation(&doc, &op, &registry),
        Err(TesseraError::UnknownType { .. })
    ));
}
