//! Document → canonical IR.

use std::collections::HashSet;

use tessera_core::EntityId;
use tessera_ir::{CanonicalIr, IrAsset, IrComponent, IrEnvironment, IrNode, IrWire, IR_VERSION};

use crate::registry::ComponentRegistry;
use crate::schema::{Component, Document, Entity};

/// Lowers a document into canonical IR.
///
/// Compilation is total over validated documents: every default is resolved,
/// the entity tree is flattened parent-first, and tuning is copied through
/// untouched. Fields outside the portable set (tags, locked, metadata,
/// format version, game settings) are dropped.
pub struct Compiler<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    pub fn compile(&self, doc: &Document) -> CanonicalIr {
        let mut nodes = Vec::with_capacity(doc.entity_count());
        let mut visited: HashSet<&EntityId> = HashSet::new();
        let mut stack = vec![&doc.root_entity_id];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(entity) = doc.entities.get(id) else {
                continue;
            };
            nodes.push(self.compile_entity(entity));
            stack.extend(entity.children.iter().rev());
        }

        let assets = doc
            .assets
            .values()
            .map(|a| IrAsset {
                id: a.id.clone(),
                kind: a.kind,
                name: a.name.clone(),
                uri: a.uri.clone(),
                data: a.data.clone(),
                metadata: a.metadata.clone(),
            })
            .collect();
        let wiring = doc
            .wiring
            .iter()
            .map(|w| IrWire {
                id: w.id.clone(),
                source_entity_id: w.source_entity_id.clone(),
                source_event: w.source_event.clone(),
                target_entity_id: w.target_entity_id.clone(),
                target_action: w.target_action.clone(),
                parameters: w.parameters.clone(),
            })
            .collect();

        let ir = CanonicalIr {
            ir_version: IR_VERSION,
            document_id: doc.id.clone(),
            name: doc.name.clone(),
            root_id: doc.root_entity_id.clone(),
            nodes,
            assets,
            wiring,
            environment: IrEnvironment::from(&doc.environment),
        };
        tracing::debug!(
            document = %doc.id,
            nodes = ir.nodes.len(),
            assets = ir.assets.len(),
            wires = ir.wiring.len(),
            "compiled document"
        );
        ir
    }

    fn compile_entity(&self, entity: &Entity) -> IrNode {
        IrNode {
            id: entity.id.clone(),
            name: entity.name.clone(),
            transform: entity.transform.into(),
            child_ids: entity.children.clone(),
            components: entity
                .components
                .iter()
                .map(|c| self.compile_component(&entity.id, c))
                .collect(),
            visible: entity.visible,
            tuning: entity.tuning.clone(),
        }
    }

    fn compile_component(&self, entity_id: &EntityId, component: &Component) -> IrComponent {
        let properties = match self.registry.get_component_def(&component.component_type) {
            Some(def) => def.resolve_defaults(&component.properties),
            None => {
                tracing::warn!(
                    entity = %entity_id,
                    component = %component.component_type,
                    "passing unknown component type through compilation"
                );
                component.properties.clone()
            }
        };
        IrComponent {
            component_type: component.component_type.clone(),
            properties,
        }
    }
}

/// Compile `doc` with `registry`. See [`Compiler`].
pub fn compile(doc: &Document, registry: &ComponentRegistry) -> CanonicalIr {
    Compiler::new(registry).compile(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use serde_json::json;
    use tessera_core::{Transform, Vec3};

    #[test]
    fn test_nodes_parent_first() {
        let registry = build_registry();
        let mut doc = Document::empty("Order");
        let root = doc.root_entity_id.clone();
        let a = EntityId::new("a");
        let b = EntityId::new("b");
        let c = EntityId::new("c");
        doc.insert_child(Entity::new(a.clone(), "A", Some(root.clone())));
        doc.insert_child(Entity::new(b.clone(), "B", Some(a.clone())));
        doc.insert_child(Entity::new(c.clone(), "C", Some(root.clone())));

        let ir = compile(&doc, &registry);
        let order: Vec<&str> = ir.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec![root.as_str(), "a", "b", "c"]);
    }

    #[test]
    fn test_defaults_resolved() {
        let registry = build_registry();
        let mut doc = Document::empty("Defaults");
        let lamp = EntityId::new("lamp");
        doc.insert_child(
            Entity::new(lamp.clone(), "Lamp", Some(doc.root_entity_id.clone()))
                .with_transform(Transform::from_position(Vec3::new(0.0, 3.0, 0.0)))
                .with_component(Component::new("Light")),
        );
        let ir = compile(&doc, &registry);
        let node = ir.get_node("lamp").unwrap();
        let light = node.component("Light").unwrap();
        assert_eq!(light.properties["kind"], json!("point"));
        assert_eq!(node.transform.scale, Vec3::ONE);
        assert!(node.tuning.is_empty());
    }

    #[test]
    fn test_unknown_component_passes_through() {
        let registry = build_registry();
        let mut doc = Document::empty("Forward");
        let e = EntityId::new("e");
        doc.insert_child(
            Entity::new(e, "E", Some(doc.root_entity_id.clone()))
                .with_component(Component::new("Hologram").with("hue", json!(120))),
        );
        let ir = compile(&doc, &registry);
        let hologram = ir.get_node("e").unwrap().component("Hologram").unwrap();
        assert_eq!(hologram.properties["hue"], json!(120));
    }
}
