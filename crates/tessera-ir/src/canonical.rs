use serde::{Deserialize, Serialize};
use tessera_core::EntityId;

use crate::asset::IrAsset;
use crate::environment::IrEnvironment;
use crate::node::IrNode;
use crate::wire::IrWire;

/// Current version of the IR wire format.
pub const IR_VERSION: u32 = 1;

/// A compiled scene, the root of the canonical IR.
///
/// Nodes are stored flat in topological order: every parent precedes all of
/// its descendants, and the root is first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIr {
    pub ir_version: u32,
    /// Identifier of the document this IR was compiled from.
    pub document_id: String,
    pub name: String,
    pub root_id: EntityId,
    pub nodes: Vec<IrNode>,
    /// Assets ordered by id.
    pub assets: Vec<IrAsset>,
    pub wiring: Vec<IrWire>,
    pub environment: IrEnvironment,
}

impl CanonicalIr {
    /// Get a node by its ID.
    pub fn get_node(&self, id: &str) -> Option<&IrNode> {
        self.nodes.iter().find(|n| n.id.0 == id)
    }

    /// The root node, if the sequence is non-empty.
    pub fn root(&self) -> Option<&IrNode> {
        self.nodes.first()
    }

    /// Number of nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parse IR from its JSON wire format.
    pub fn from_json(raw: &str) -> tessera_core::TesseraResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
