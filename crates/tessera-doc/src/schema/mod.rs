//! The document schema: entities, components, assets, wiring, environment
//! and game settings, plus parse-time validation.

pub mod asset;
pub mod document;
pub mod entity;
pub mod environment;
pub mod keyframe;
pub mod validate;

pub use asset::{Asset, Wire};
pub use document::{Document, DocumentMetadata, FORMAT_VERSION};
pub use entity::{Component, Entity, EntityTransform};
pub use environment::{AmbientLight, Environment, Fog, GameSettings, RespawnRules, Skybox};
pub use keyframe::{Easing, Keyframe};
pub use validate::{check_tree, check_wiring, parse_document, validate_document, UnknownComponentPolicy};
