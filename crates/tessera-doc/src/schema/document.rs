use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tessera_core::{AssetId, EntityId, Quat, Transform, Vec3};

use super::asset::{Asset, Wire};
use super::entity::{Component, Entity};
use super::environment::{Environment, GameSettings};
use crate::registry::ComponentRegistry;

/// Current version of the document wire format.
pub const FORMAT_VERSION: u32 = 3;

/// Bookkeeping about the document itself. Never carried into the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DocumentMetadata {
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub updated_at: i64,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// The authoritative, editor-facing scene description.
///
/// A document is an immutable value once handed out: every mutation entry
/// point returns a new document. Entities are stored behind `Arc` so a new
/// version shares every entity it did not touch with its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub format_version: u32,
    pub root_entity_id: EntityId,
    pub entities: BTreeMap<EntityId, Arc<Entity>>,
    #[serde(default)]
    pub assets: BTreeMap<AssetId, Asset>,
    #[serde(default)]
    pub wiring: Vec<Wire>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub game_settings: Option<GameSettings>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// A document holding only a root entity.
    pub fn empty(name: impl Into<String>) -> Self {
        let root_id = EntityId::generate();
        let root = Entity::new(root_id.clone(), "Root", None);
        let now = chrono::Utc::now().timestamp_millis();
        let mut entities = BTreeMap::new();
        entities.insert(root_id.clone(), Arc::new(root));
        Self {
            id: tessera_core::id::document_id(),
            name: name.into(),
            format_version: FORMAT_VERSION,
            root_entity_id: root_id,
            entities,
            assets: BTreeMap::new(),
            wiring: Vec::new(),
            environment: Environment::default(),
            game_settings: None,
            metadata: DocumentMetadata {
                created_at: now,
                updated_at: now,
                ..DocumentMetadata::default()
            },
        }
    }

    /// A starter scene: a camera, a sun light and a ground plane under the
    /// root. Built directly, outside of undo history; component properties
    /// are filled from the registry defaults.
    pub fn default_scene(name: impl Into<String>, registry: &ComponentRegistry) -> Self {
        let mut doc = Self::empty(name);
        let root_id = doc.root_entity_id.clone();

        let component = |component_type: &str, overrides: serde_json::Value| {
            let overrides = overrides.as_object().cloned().unwrap_or_default();
            let properties = match registry.get_component_def(component_type) {
                Some(def) => def.resolve_defaults(&overrides),
                None => overrides,
            };
            Component {
                component_type: component_type.to_string(),
                properties,
            }
        };

        let camera = Entity::new(EntityId::generate(), "Main Camera", Some(root_id.clone()))
            .with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 8.0)))
            .with_component(component("Camera", json!({ "primary": true })));
        let sun = Entity::new(EntityId::generate(), "Sun", Some(root_id.clone()))
            .with_transform(
                Transform::from_position(Vec3::new(5.0, 10.0, 5.0))
                    .with_rotation(Quat::from_yaw_degrees(45.0)),
            )
            .with_component(component(
                "Light",
                json!({ "kind": "directional", "castShadows": true }),
            ));
        let ground = Entity::new(EntityId::generate(), "Ground", Some(root_id))
            .with_transform(Transform::identity().with_scale(Vec3::new(20.0, 1.0, 20.0)))
            .with_component(component(
                "MeshRenderer",
                json!({ "mesh": "plane", "color": "#808080", "castShadows": false }),
            ));

        for entity in [camera, sun, ground] {
            doc.insert_child(entity);
        }
        doc
    }

    /// Attach a freshly built entity under its `parent_id`. Construction
    /// helper for whole-document builds; edits go through patch operations.
    pub fn insert_child(&mut self, entity: Entity) {
        if let Some(parent_id) = &entity.parent_id {
            if let Some(parent) = self.entities.get_mut(parent_id) {
                Arc::make_mut(parent).children.push(entity.id.clone());
            }
        }
        self.entities.insert(entity.id.clone(), Arc::new(entity));
    }

    pub fn root(&self) -> Option<&Entity> {
        self.get_entity(&self.root_entity_id)
    }

    pub fn get_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id).map(|e| e.as_ref())
    }

    pub fn contains_entity(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Ids of `id` and all of its descendants, parents before children.
    pub fn subtree_ids(&self, id: &EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if out.contains(&current) {
                continue;
            }
            if let Some(entity) = self.entities.get(&current) {
                stack.extend(entity.children.iter().rev().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: &EntityId, id: &EntityId) -> bool {
        let mut current = Some(id.clone());
        let mut steps = 0;
        while let Some(cur) = current {
            if &cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.entities.len() {
                return false;
            }
            current = self.entities.get(&cur).and_then(|e| e.parent_id.clone());
        }
        false
    }
}
