use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera_core::{EntityId, Transform};

/// Engine-specific tuning: engine name → free-form settings.
///
/// Never interpreted by the pipeline; adapters read the entry for their own
/// engine and ignore the rest.
pub type Tuning = BTreeMap<String, serde_json::Map<String, serde_json::Value>>;

/// A compiled component: type name plus fully resolved properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A compiled entity. Nodes live in a flat, topologically ordered sequence;
/// the tree is expressed only through `child_ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrNode {
    pub id: EntityId,
    pub name: String,
    /// Fully explicit transform.
    pub transform: Transform,
    /// Ordered ids of direct children.
    pub child_ids: Vec<EntityId>,
    pub components: Vec<IrComponent>,
    pub visible: bool,
    /// Always present, possibly empty.
    pub tuning: Tuning,
}

impl IrNode {
    /// Create a visible node with an identity transform and nothing attached.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            transform: Transform::identity(),
            child_ids: Vec::new(),
            components: Vec::new(),
            visible: true,
            tuning: Tuning::new(),
        }
    }

    /// First component of the given type.
    pub fn component(&self, component_type: &str) -> Option<&IrComponent> {
        self.components
            .iter()
            .find(|c| c.component_type == component_type)
    }
}
