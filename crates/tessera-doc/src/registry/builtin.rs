use serde_json::{json, Value};
use tessera_ir::AssetKind;

use super::{
    ComponentCategory, ComponentDef, ComponentRegistry, EditorHint, PortDef, PropertyDef,
    PropertyKind, ANIMATION_COMPONENT,
};

fn number(name: &'static str, default: f64, min: Option<f64>, max: Option<f64>) -> PropertyDef {
    let hint = match (min, max) {
        (Some(min), Some(max)) => EditorHint::Slider {
            min,
            max,
            step: if max - min <= 1.0 { 0.01 } else { 0.1 },
        },
        _ => EditorHint::Number { step: 0.1 },
    };
    PropertyDef::new(name, PropertyKind::Number { min, max }, json!(default), hint)
}

fn integer(name: &'static str, default: i64, min: Option<i64>) -> PropertyDef {
    PropertyDef::new(
        name,
        PropertyKind::Integer { min, max: None },
        json!(default),
        EditorHint::Number { step: 1.0 },
    )
}

fn toggle(name: &'static str, default: bool) -> PropertyDef {
    PropertyDef::new(name, PropertyKind::Boolean, json!(default), EditorHint::Toggle)
}

fn color(name: &'static str, default: &str) -> PropertyDef {
    PropertyDef::new(name, PropertyKind::Color, json!(default), EditorHint::Color)
}

fn text(name: &'static str, default: &str) -> PropertyDef {
    PropertyDef::new(
        name,
        PropertyKind::Text,
        json!(default),
        EditorHint::Text { multiline: false },
    )
}

fn choice(name: &'static str, options: &'static [&'static str], default: &str) -> PropertyDef {
    PropertyDef::new(
        name,
        PropertyKind::Choice { options },
        json!(default),
        EditorHint::Select { options },
    )
}

fn asset_ref(name: &'static str, asset_kind: AssetKind) -> PropertyDef {
    PropertyDef::new(
        name,
        PropertyKind::AssetRef,
        Value::Null,
        EditorHint::AssetRef { asset_kind },
    )
}

fn port(name: &'static str, label: &'static str) -> PortDef {
    PortDef { name, label }
}

/// Build the process-wide component table. Call once at startup and share
/// the result; the set of definitions is fixed.
pub fn build_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::default();

    registry.register(ComponentDef {
        type_name: "MeshRenderer",
        category: ComponentCategory::Rendering,
        description: "Draws a primitive or imported mesh with a flat material.",
        singleton: true,
        properties: vec![
            choice(
                "mesh",
                &["box", "sphere", "plane", "cylinder", "capsule", "custom"],
                "box",
            ),
            asset_ref("meshAssetId", AssetKind::Model),
            asset_ref("materialAssetId", AssetKind::Material),
            color("color", "#ffffff"),
            number("opacity", 1.0, Some(0.0), Some(1.0)),
            toggle("castShadows", true),
            toggle("receiveShadows", true),
        ],
        events: vec![],
        actions: vec![port("show", "Show"), port("hide", "Hide")],
    });

    registry.register(ComponentDef {
        type_name: "Light",
        category: ComponentCategory::Rendering,
        description: "A directional, point or spot light source.",
        singleton: false,
        properties: vec![
            choice("kind", &["directional", "point", "spot"], "point"),
            color("color", "#ffffff"),
            number("intensity", 1.0, Some(0.0), Some(100.0)),
            number("range", 10.0, Some(0.0), None),
            number("spotAngle", 45.0, Some(1.0), Some(179.0)),
            toggle("castShadows", false),
        ],
        events: vec![],
        actions: vec![
            port("turnOn", "Turn on"),
            port("turnOff", "Turn off"),
            port("toggle", "Toggle"),
        ],
    });

    registry.register(ComponentDef {
        type_name: "Camera",
        category: ComponentCategory::Rendering,
        description: "A viewpoint the scene can be rendered from.",
        singleton: true,
        properties: vec![
            choice("projection", &["perspective", "orthographic"], "perspective"),
            number("fov", 60.0, Some(1.0), Some(179.0)),
            number("near", 0.1, Some(0.001), None),
            number("far", 1000.0, Some(0.01), None),
            number("orthoSize", 5.0, Some(0.01), None),
            toggle("primary", false),
        ],
        events: vec![],
        actions: vec![port("activate", "Make active")],
    });

    registry.register(ComponentDef {
        type_name: ANIMATION_COMPONENT,
        category: ComponentCategory::Rendering,
        description: "Keyframed property tracks played back over time.",
        singleton: true,
        properties: vec![
            PropertyDef::new("tracks", PropertyKind::Tracks, json!({}), EditorHint::Timeline),
            asset_ref("clipAssetId", AssetKind::Animation),
            toggle("loop", true),
            toggle("autoplay", true),
            number("speed", 1.0, Some(0.0), None),
        ],
        events: vec![port("onComplete", "Finished playing")],
        actions: vec![
            port("play", "Play"),
            port("pause", "Pause"),
            port("stop", "Stop"),
        ],
    });

    registry.register(ComponentDef {
        type_name: "RigidBody",
        category: ComponentCategory::Physics,
        description: "Makes the entity take part in the physics simulation.",
        singleton: true,
        properties: vec![
            choice("bodyType", &["dynamic", "static", "kinematic"], "dynamic"),
            number("mass", 1.0, Some(0.0), None),
            number("friction", 0.5, Some(0.0), Some(1.0)),
            number("restitution", 0.0, Some(0.0), Some(1.0)),
            number("gravityScale", 1.0, None, None),
        ],
        events: vec![port("onCollision", "On collision")],
        actions: vec![port("applyImpulse", "Apply impulse")],
    });

    registry.register(ComponentDef {
        type_name: "Collider",
        category: ComponentCategory::Physics,
        description: "A collision volume, optionally acting as a trigger.",
        singleton: false,
        properties: vec![
            choice("shape", &["box", "sphere", "capsule", "mesh"], "box"),
            PropertyDef::new(
                "size",
                PropertyKind::Vector3,
                json!({ "x": 1.0, "y": 1.0, "z": 1.0 }),
                EditorHint::Vector3,
            ),
            number("radius", 0.5, Some(0.0), None),
            toggle("isTrigger", false),
        ],
        events: vec![
            port("onTriggerEnter", "On trigger enter"),
            port("onTriggerExit", "On trigger exit"),
        ],
        actions: vec![],
    });

    registry.register(ComponentDef {
        type_name: "AudioSource",
        category: ComponentCategory::Audio,
        description: "Plays an audio asset, optionally positioned in 3D.",
        singleton: false,
        properties: vec![
            asset_ref("audioAssetId", AssetKind::Audio),
            number("volume", 1.0, Some(0.0), Some(1.0)),
            toggle("loop", false),
            toggle("autoplay", false),
            toggle("spatial", true),
        ],
        events: vec![port("onEnded", "Playback ended")],
        actions: vec![port("play", "Play"), port("stop", "Stop")],
    });

    registry.register(ComponentDef {
        type_name: "SpawnPoint",
        category: ComponentCategory::Gameplay,
        description: "A location players spawn at.",
        singleton: false,
        properties: vec![integer("team", 0, Some(0)), integer("priority", 0, None)],
        events: vec![port("onSpawn", "Player spawned")],
        actions: vec![],
    });

    registry.register(ComponentDef {
        type_name: "Interactable",
        category: ComponentCategory::Gameplay,
        description: "Lets players interact with the entity when in range.",
        singleton: true,
        properties: vec![
            text("prompt", "Interact"),
            number("range", 2.0, Some(0.0), None),
            toggle("enabled", true),
        ],
        events: vec![port("onInteract", "On interact")],
        actions: vec![port("enable", "Enable"), port("disable", "Disable")],
    });

    registry.register(ComponentDef {
        type_name: "Script",
        category: ComponentCategory::Logic,
        description: "Attaches a script asset with free-form parameters.",
        singleton: false,
        properties: vec![
            asset_ref("scriptAssetId", AssetKind::Script),
            toggle("enabled", true),
            PropertyDef::new("params", PropertyKind::Json, json!({}), EditorHint::Code),
        ],
        events: vec![port("onMessage", "Script message")],
        actions: vec![port("run", "Run")],
    });

    registry.register(ComponentDef {
        type_name: "Trigger",
        category: ComponentCategory::Logic,
        description: "A spherical zone that fires events as things enter and leave.",
        singleton: false,
        properties: vec![
            number("radius", 1.0, Some(0.0), None),
            toggle("once", false),
            toggle("enabled", true),
            PropertyDef::new("target", PropertyKind::EntityRef, Value::Null, EditorHint::EntityRef),
        ],
        events: vec![port("onEnter", "On enter"), port("onExit", "On exit")],
        actions: vec![port("enable", "Enable"), port("disable", "Disable")],
    });

    registry.register(ComponentDef {
        type_name: "PostProcessing",
        category: ComponentCategory::Settings,
        description: "Camera post-processing settings.",
        singleton: true,
        properties: vec![
            toggle("bloom", false),
            number("bloomIntensity", 0.5, Some(0.0), Some(5.0)),
            number("exposure", 1.0, Some(0.0), Some(10.0)),
            choice("toneMapping", &["none", "aces", "reinhard"], "aces"),
        ],
        events: vec![],
        actions: vec![],
    });

    registry
}
