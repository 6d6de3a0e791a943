use serde::{Deserialize, Serialize};
use tessera_core::{EntityId, Quat, Transform, Vec3};
use tessera_ir::Tuning;

/// Authored transform. Every axis may be omitted on the wire and is filled
/// with its identity value on parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for EntityTransform {
    fn default() -> Self {
        Transform::identity().into()
    }
}

impl From<Transform> for EntityTransform {
    fn from(t: Transform) -> Self {
        Self {
            position: t.position,
            rotation: t.rotation,
            scale: t.scale,
        }
    }
}

impl From<EntityTransform> for Transform {
    fn from(t: EntityTransform) -> Self {
        Transform {
            position: t.position,
            rotation: t.rotation,
            scale: t.scale,
        }
    }
}

/// A typed bag of properties attached to an entity. The property schema is
/// owned by the component registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Component {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Builder: set one property.
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }
}

fn default_true() -> bool {
    true
}

/// A node of the document's entity tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// `None` only for the root.
    #[serde(default)]
    pub parent_id: Option<EntityId>,
    #[serde(default)]
    pub children: Vec<EntityId>,
    #[serde(default)]
    pub transform: EntityTransform,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Engine-specific data keyed by engine name; never interpreted here.
    #[serde(default)]
    pub tuning: Tuning,
}

impl Entity {
    /// A visible, unlocked entity with an identity transform.
    pub fn new(id: EntityId, name: impl Into<String>, parent_id: Option<EntityId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            children: Vec::new(),
            transform: EntityTransform::default(),
            components: Vec::new(),
            tags: Vec::new(),
            visible: true,
            locked: false,
            tuning: Tuning::new(),
        }
    }

    /// Builder: set the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform.into();
        self
    }

    /// Builder: add a component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// First component of the given type.
    pub fn component(&self, component_type: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.component_type == component_type)
    }

    pub fn has_component(&self, component_type: &str) -> bool {
        self.component(component_type).is_some()
    }
}
