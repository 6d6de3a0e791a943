//! The component registry: a table from component type name to property
//! schema, defaults, singleton constraint and editor/event/action metadata.
//!
//! The table is built once by [`build_registry`] and is read-only afterwards;
//! every lookup takes it as an explicit argument.

mod builtin;
pub mod property;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tessera_core::{TesseraError, TesseraResult};

pub use builtin::build_registry;
pub use property::{EditorHint, PropertyDef, PropertyKind};

/// Component type name that owns animation keyframe tracks.
pub const ANIMATION_COMPONENT: &str = "Animation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Rendering,
    Physics,
    Audio,
    Gameplay,
    Logic,
    Settings,
}

impl std::fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentCategory::Rendering => write!(f, "rendering"),
            ComponentCategory::Physics => write!(f, "physics"),
            ComponentCategory::Audio => write!(f, "audio"),
            ComponentCategory::Gameplay => write!(f, "gameplay"),
            ComponentCategory::Logic => write!(f, "logic"),
            ComponentCategory::Settings => write!(f, "settings"),
        }
    }
}

impl std::str::FromStr for ComponentCategory {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rendering" => Ok(ComponentCategory::Rendering),
            "physics" => Ok(ComponentCategory::Physics),
            "audio" => Ok(ComponentCategory::Audio),
            "gameplay" => Ok(ComponentCategory::Gameplay),
            "logic" => Ok(ComponentCategory::Logic),
            "settings" => Ok(ComponentCategory::Settings),
            other => Err(TesseraError::unknown_type("component category", other)),
        }
    }
}

/// A named event or action exposed to the wiring system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDef {
    pub name: &'static str,
    pub label: &'static str,
}

/// Definition of one component type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub type_name: &'static str,
    pub category: ComponentCategory,
    pub description: &'static str,
    /// At most one instance per entity.
    pub singleton: bool,
    pub properties: Vec<PropertyDef>,
    pub events: Vec<PortDef>,
    pub actions: Vec<PortDef>,
}

impl ComponentDef {
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Every property at its default value.
    pub fn defaults(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .map(|p| (p.name.to_string(), p.default.clone()))
            .collect()
    }

    /// Property name → editor hint.
    pub fn editor_hints(&self) -> BTreeMap<&'static str, &EditorHint> {
        self.properties.iter().map(|p| (p.name, &p.hint)).collect()
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name == name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a.name == name)
    }

    /// Validate `properties`, filling every omitted property with its default.
    pub fn validate(&self, properties: &Map<String, Value>) -> TesseraResult<Map<String, Value>> {
        for key in properties.keys() {
            if self.property(key).is_none() {
                return Err(TesseraError::schema(
                    format!("{}.{}", self.type_name, key),
                    "unknown property",
                ));
            }
        }
        let mut resolved = Map::new();
        for prop in &self.properties {
            let value = match properties.get(prop.name) {
                Some(value) => prop
                    .kind
                    .validate(&format!("{}.{}", self.type_name, prop.name), value)?,
                None => prop.default.clone(),
            };
            resolved.insert(prop.name.to_string(), value);
        }
        Ok(resolved)
    }

    /// Overlay `properties` on the defaults without validating. Used for
    /// values that already passed [`ComponentDef::validate`].
    pub fn resolve_defaults(&self, properties: &Map<String, Value>) -> Map<String, Value> {
        let mut resolved = self.defaults();
        for (key, value) in properties {
            resolved.insert(key.clone(), value.clone());
        }
        resolved
    }
}

/// Immutable table of component definitions keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    defs: BTreeMap<&'static str, ComponentDef>,
}

impl ComponentRegistry {
    fn register(&mut self, def: ComponentDef) {
        self.defs.insert(def.type_name, def);
    }

    pub fn get_component_def(&self, component_type: &str) -> Option<&ComponentDef> {
        self.defs.get(component_type)
    }

    /// Like [`ComponentRegistry::get_component_def`], failing with an
    /// unknown-type error.
    pub fn require(&self, component_type: &str) -> TesseraResult<&ComponentDef> {
        self.get_component_def(component_type)
            .ok_or_else(|| TesseraError::unknown_type("component", component_type))
    }

    pub fn contains(&self, component_type: &str) -> bool {
        self.defs.contains_key(component_type)
    }

    /// Validate and default a component's properties.
    pub fn validate_component_properties(
        &self,
        component_type: &str,
        properties: &Map<String, Value>,
    ) -> TesseraResult<Map<String, Value>> {
        self.require(component_type)?.validate(properties)
    }

    /// All definitions, ordered by type name.
    pub fn list_components(&self) -> Vec<&ComponentDef> {
        self.defs.values().collect()
    }

    pub fn list_components_by_category(&self, category: ComponentCategory) -> Vec<&ComponentDef> {
        self.defs
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
