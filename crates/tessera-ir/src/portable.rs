//! The portable component subset.
//!
//! Component types and properties every rendering-engine adapter must
//! support. This is a cross-engine rendering guarantee and is independent of
//! the IR round-trip contract: a node's `tuning` survives compilation
//! unchanged, yet is never part of this subset.

use crate::node::{IrComponent, IrNode};

/// A component type every adapter must render, with its guaranteed
/// properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortableComponent {
    pub component_type: &'static str,
    pub properties: &'static [&'static str],
}

pub const PORTABLE_COMPONENTS: &[PortableComponent] = &[
    PortableComponent {
        component_type: "MeshRenderer",
        properties: &["mesh", "color", "opacity", "castShadows", "receiveShadows"],
    },
    PortableComponent {
        component_type: "Light",
        properties: &["kind", "color", "intensity", "range"],
    },
    PortableComponent {
        component_type: "Camera",
        properties: &["projection", "fov", "near", "far"],
    },
    PortableComponent {
        component_type: "RigidBody",
        properties: &["bodyType", "mass"],
    },
    PortableComponent {
        component_type: "Collider",
        properties: &["shape", "size", "radius", "isTrigger"],
    },
    PortableComponent {
        component_type: "AudioSource",
        properties: &["audioAssetId", "volume", "loop", "autoplay"],
    },
];

/// Portable definition for a component type.
pub fn portable_component(component_type: &str) -> Option<&'static PortableComponent> {
    PORTABLE_COMPONENTS
        .iter()
        .find(|p| p.component_type == component_type)
}

pub fn is_portable_component(component_type: &str) -> bool {
    portable_component(component_type).is_some()
}

/// A component reduced to its portable properties, or `None` for a
/// non-portable type.
pub fn portable_view(component: &IrComponent) -> Option<IrComponent> {
    let def = portable_component(&component.component_type)?;
    let properties = component
        .properties
        .iter()
        .filter(|(key, _)| def.properties.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Some(IrComponent {
        component_type: component.component_type.clone(),
        properties,
    })
}

/// Components on a node that fall outside the portable subset.
pub fn non_portable_components(node: &IrNode) -> Vec<&IrComponent> {
    node.components
        .iter()
        .filter(|c| !is_portable_component(&c.component_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeBuilder;
    use serde_json::json;

    fn props(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_portable_lookup() {
        assert!(is_portable_component("MeshRenderer"));
        assert!(!is_portable_component("Script"));
    }

    #[test]
    fn test_portable_view_drops_extra_properties() {
        let component = IrComponent {
            component_type: "Camera".into(),
            properties: props(json!({ "fov": 60.0, "near": 0.1, "far": 500.0, "projection": "perspective", "orthoSize": 5.0 })),
        };
        let view = portable_view(&component).unwrap();
        assert_eq!(view.properties.len(), 4);
        assert!(!view.properties.contains_key("orthoSize"));
    }

    #[test]
    fn test_tuning_is_not_a_portable_concern() {
        let node = NodeBuilder::new("n", "N")
            .component("Script", props(json!({})))
            .tuning("unity", props(json!({ "layer": 8 })))
            .build();
        assert_eq!(non_portable_components(&node).len(), 1);
        assert!(node.tuning.get("unity").is_some());
    }
}
