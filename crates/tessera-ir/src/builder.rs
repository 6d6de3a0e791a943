use tessera_core::{EntityId, Quat, Transform, Vec3};

use crate::canonical::{CanonicalIr, IR_VERSION};
use crate::environment::{IrEnvironment, SkyboxKind};
use crate::node::{IrComponent, IrNode};

/// Neutral environment: dark grey sky, no fog, soft white ambient light,
/// earth gravity.
pub fn neutral_environment() -> IrEnvironment {
    IrEnvironment {
        skybox_kind: SkyboxKind::Color,
        skybox_color: "#1a1a1a".to_string(),
        skybox_asset_id: None,
        fog_enabled: false,
        fog_color: "#ffffff".to_string(),
        fog_near: 10.0,
        fog_far: 100.0,
        ambient_color: "#ffffff".to_string(),
        ambient_intensity: 0.4,
        gravity: Vec3::new(0.0, -9.81, 0.0),
    }
}

/// A builder for constructing canonical IR programmatically.
/// Useful for adapters, interchange tooling and unit testing.
///
/// Nodes added through [`IrBuilder::add_node`] become children of the root;
/// use [`IrBuilder::add_child`] for deeper hierarchies.
pub struct IrBuilder {
    ir: CanonicalIr,
}

impl IrBuilder {
    pub fn new(document_id: impl Into<String>, name: impl Into<String>, root_id: &str) -> Self {
        let root = IrNode::new(EntityId::new(root_id), "Root");
        Self {
            ir: CanonicalIr {
                ir_version: IR_VERSION,
                document_id: document_id.into(),
                name: name.into(),
                root_id: EntityId::new(root_id),
                nodes: vec![root],
                assets: Vec::new(),
                wiring: Vec::new(),
                environment: neutral_environment(),
            },
        }
    }

    /// Append a node under the root.
    pub fn add_node(&mut self, node: IrNode) -> &mut Self {
        let root_id = self.ir.root_id.clone();
        self.add_child(root_id.as_str(), node)
    }

    /// Append a node under an already added parent.
    pub fn add_child(&mut self, parent_id: &str, node: IrNode) -> &mut Self {
        if let Some(parent) = self.ir.nodes.iter_mut().find(|n| n.id.0 == parent_id) {
            parent.child_ids.push(node.id.clone());
        }
        self.ir.nodes.push(node);
        self
    }

    /// Build and return the IR.
    pub fn build(self) -> CanonicalIr {
        self.ir
    }
}

/// A builder for constructing a single IR node.
pub struct NodeBuilder {
    node: IrNode,
}

impl NodeBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            node: IrNode::new(EntityId::new(id), name),
        }
    }

    pub fn position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.node.transform.position = Vec3::new(x, y, z);
        self
    }

    pub fn scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.node.transform.scale = Vec3::new(x, y, z);
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.node.transform.rotation = rotation;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.node.transform = transform;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.node.visible = false;
        self
    }

    pub fn component(
        mut self,
        component_type: &str,
        properties: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.node.components.push(IrComponent {
            component_type: component_type.to_string(),
            properties,
        });
        self
    }

    pub fn tuning(
        mut self,
        engine: &str,
        settings: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.node.tuning.insert(engine.to_string(), settings);
        self
    }

    pub fn build(self) -> IrNode {
        self.node
    }
}
