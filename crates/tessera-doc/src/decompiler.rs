//! Canonical IR → document.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tessera_core::EntityId;
use tessera_ir::CanonicalIr;

use crate::schema::{
    Asset, Component, Document, DocumentMetadata, Entity, Environment, Wire, FORMAT_VERSION,
};

/// Rebuild a document from IR.
///
/// Tree pointers come from each node's `childIds`. Fields the IR does not
/// carry come back at their neutral defaults: current format version, empty
/// metadata, no game settings, no tags, unlocked.
pub fn decompile(ir: &CanonicalIr) -> Document {
    let parents: HashMap<&EntityId, &EntityId> = ir
        .nodes
        .iter()
        .flat_map(|n| n.child_ids.iter().map(move |c| (c, &n.id)))
        .collect();

    let entities: BTreeMap<EntityId, Arc<Entity>> = ir
        .nodes
        .iter()
        .map(|node| {
            let entity = Entity {
                id: node.id.clone(),
                name: node.name.clone(),
                parent_id: parents.get(&node.id).map(|p| (*p).clone()),
                children: node.child_ids.clone(),
                transform: node.transform.into(),
                components: node
                    .components
                    .iter()
                    .map(|c| Component {
                        component_type: c.component_type.clone(),
                        properties: c.properties.clone(),
                    })
                    .collect(),
                tags: Vec::new(),
                visible: node.visible,
                locked: false,
                tuning: node.tuning.clone(),
            };
            (node.id.clone(), Arc::new(entity))
        })
        .collect();

    let assets = ir
        .assets
        .iter()
        .map(|a| {
            let asset = Asset {
                id: a.id.clone(),
                kind: a.kind,
                name: a.name.clone(),
                uri: a.uri.clone(),
                data: a.data.clone(),
                metadata: a.metadata.clone(),
            };
            (a.id.clone(), asset)
        })
        .collect();

    let wiring = ir
        .wiring
        .iter()
        .map(|w| Wire {
            id: w.id.clone(),
            source_entity_id: w.source_entity_id.clone(),
            source_event: w.source_event.clone(),
            target_entity_id: w.target_entity_id.clone(),
            target_action: w.target_action.clone(),
            parameters: w.parameters.clone(),
        })
        .collect();

    tracing::debug!(document = %ir.document_id, nodes = ir.nodes.len(), "decompiled IR");

    Document {
        id: ir.document_id.clone(),
        name: ir.name.clone(),
        format_version: FORMAT_VERSION,
        root_entity_id: ir.root_id.clone(),
        entities,
        assets,
        wiring,
        environment: Environment::from(&ir.environment),
        game_settings: None,
        metadata: DocumentMetadata::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_ir::{IrBuilder, NodeBuilder};

    #[test]
    fn test_tree_rebuilt_from_child_ids() {
        let mut builder = IrBuilder::new("doc-1", "Built", "root");
        builder.add_node(NodeBuilder::new("table", "Table").position(1.0, 0.0, 0.0).build());
        builder.add_child("table", NodeBuilder::new("cup", "Cup").hidden().build());
        let doc = decompile(&builder.build());

        assert!(crate::schema::check_tree(&doc).is_ok());
        let cup = doc.get_entity(&EntityId::new("cup")).unwrap();
        assert_eq!(cup.parent_id, Some(EntityId::new("table")));
        assert!(!cup.visible);
        assert!(cup.tags.is_empty());
        assert!(doc.root().unwrap().parent_id.is_none());
        assert_eq!(doc.format_version, FORMAT_VERSION);
    }
}
