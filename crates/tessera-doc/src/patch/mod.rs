//! Patch operations: the closed set of self-invertible document mutations,
//! their application, inversion and an undo/redo history built on both.

mod apply;
mod history;
mod invert;
mod operation;
pub mod ops;

pub use apply::apply_operation;
pub use history::History;
pub use invert::invert;
pub use operation::{
    parse_operation, EntitySnapshot, OperationKind, Origin, PatchOperation, PropertyTarget,
    OPERATION_TYPES, OPERATION_VERSION,
};
