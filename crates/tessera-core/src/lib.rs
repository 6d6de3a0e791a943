//! # tessera-core
//!
//! Core types and primitives for the Tessera scene pipeline.
//! This crate contains foundational types shared across all Tessera crates:
//! identifiers, transforms, content hashes, configuration and error types.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod math;

pub use config::*;

pub use error::{TesseraError, TesseraResult};
pub use hash::ContentHash;
pub use id::{AssetId, EntityId, OperationId, WireId};
pub use math::{Quat, Transform, Vec3};
