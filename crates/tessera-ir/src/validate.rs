use std::collections::{HashMap, HashSet};

use tessera_core::TesseraError;

use crate::canonical::{CanonicalIr, IR_VERSION};

/// Validate canonical IR for structural correctness.
///
/// Decompilation assumes this has passed; malformed IR must be rejected here
/// rather than inside the decompiler.
pub fn validate_ir(ir: &CanonicalIr) -> Result<(), Vec<TesseraError>> {
    let mut errors = Vec::new();

    if ir.ir_version == 0 || ir.ir_version > IR_VERSION {
        errors.push(TesseraError::IrValidation(format!(
            "unsupported IR version {} (supported: 1..={})",
            ir.ir_version, IR_VERSION
        )));
    }

    match ir.nodes.first() {
        None => errors.push(TesseraError::IrValidation(
            "IR must contain at least the root node".into(),
        )),
        Some(first) if first.id != ir.root_id => {
            errors.push(TesseraError::IrValidation(format!(
                "first node '{}' is not the root '{}'",
                first.id, ir.root_id
            )));
        }
        Some(_) => {}
    }

    // Position of every node; duplicates are reported once.
    let mut positions = HashMap::new();
    for (index, node) in ir.nodes.iter().enumerate() {
        if positions.insert(&node.id, index).is_some() {
            errors.push(TesseraError::IrValidation(format!(
                "duplicate node id: {}",
                node.id
            )));
        }
        if !node.transform.is_finite() {
            errors.push(TesseraError::IrValidation(format!(
                "node '{}' has a non-finite transform",
                node.id
            )));
        }
    }

    let mut owned = HashSet::new();
    for (index, node) in ir.nodes.iter().enumerate() {
        for child in &node.child_ids {
            match positions.get(child) {
                None => errors.push(TesseraError::IrValidation(format!(
                    "node '{}' references missing child '{}'",
                    node.id, child
                ))),
                Some(&child_index) if child_index <= index => {
                    errors.push(TesseraError::IrValidation(format!(
                        "child '{}' does not follow its parent '{}'",
                        child, node.id
                    )));
                }
                Some(_) => {}
            }
            if !owned.insert(child) {
                errors.push(TesseraError::IrValidation(format!(
                    "node '{}' is listed as a child more than once",
                    child
                )));
            }
        }
    }

    for node in &ir.nodes {
        if node.id != ir.root_id && !owned.contains(&node.id) {
            errors.push(TesseraError::IrValidation(format!(
                "node '{}' is not reachable from the root",
                node.id
            )));
        }
    }
    if owned.contains(&ir.root_id) {
        errors.push(TesseraError::IrValidation(format!(
            "root '{}' is listed as a child",
            ir.root_id
        )));
    }

    let mut asset_ids = HashSet::new();
    for asset in &ir.assets {
        if !asset_ids.insert(&asset.id) {
            errors.push(TesseraError::IrValidation(format!(
                "duplicate asset id: {}",
                asset.id
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
