//! # tessera-doc
//!
//! The editor-facing scene document and everything that changes or lowers it:
//! the component registry, schema validation, self-invertible patch
//! operations, versioned migrations, and the document ⇄ canonical IR
//! compiler/decompiler with its lossiness contract.

pub mod compiler;
pub mod decompiler;
pub mod lossiness;
pub mod migrate;
pub mod patch;
pub mod registry;
pub mod schema;

pub use compiler::{compile, Compiler};
pub use decompiler::decompile;
pub use lossiness::{strip_non_portable, unclassified_fields, FieldClass};
pub use migrate::{migrate_document, migrate_operation};
pub use patch::{apply_operation, invert, History, OperationKind, Origin, PatchOperation};
pub use registry::{build_registry, ComponentDef, ComponentRegistry};
pub use schema::{parse_document, validate_document, Document, Entity, UnknownComponentPolicy};
