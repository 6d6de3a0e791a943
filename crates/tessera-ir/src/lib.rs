//! # tessera-ir
//!
//! The Tessera canonical Intermediate Representation (IR): a flat, fully
//! explicit, engine-neutral form of a scene.
//!
//! Rendering-engine adapters consume this crate only; it deliberately has no
//! knowledge of the editable document or of patch operations.

pub mod asset;
pub mod builder;
pub mod canonical;
pub mod environment;
pub mod node;
pub mod portable;
pub mod validate;
pub mod wire;

pub use asset::{AssetKind, IrAsset};
pub use builder::{neutral_environment, IrBuilder, NodeBuilder};
pub use canonical::{CanonicalIr, IR_VERSION};
pub use environment::{IrEnvironment, SkyboxKind};
pub use node::{IrComponent, IrNode, Tuning};
pub use portable::{is_portable_component, PortableComponent, PORTABLE_COMPONENTS};
pub use validate::validate_ir;
pub use wire::IrWire;
