use tessera_core::TesseraResult;

use super::apply::apply_operation;
use super::invert::invert;
use super::operation::PatchOperation;
use crate::registry::ComponentRegistry;
use crate::schema::Document;

/// Undo/redo stacks of applied operations.
///
/// History never holds documents; it takes the caller's current document
/// and returns the next one, so every value it has handed out stays valid.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<PatchOperation>,
    redo_stack: Vec<PatchOperation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op` and record it. Clears the redo stack.
    pub fn apply(
        &mut self,
        doc: &Document,
        op: PatchOperation,
        registry: &ComponentRegistry,
    ) -> TesseraResult<Document> {
        let next = apply_operation(doc, &op, registry)?;
        self.undo_stack.push(op);
        self.redo_stack.clear();
        Ok(next)
    }

    /// Undo the most recent operation. `Ok(None)` when there is nothing to undo.
    pub fn undo(
        &mut self,
        doc: &Document,
        registry: &ComponentRegistry,
    ) -> TesseraResult<Option<Document>> {
        let Some(op) = self.undo_stack.last() else {
            return Ok(None);
        };
        let previous = apply_operation(doc, &invert(op)?, registry)?;
        if let Some(op) = self.undo_stack.pop() {
            self.redo_stack.push(op);
        }
        Ok(Some(previous))
    }

    /// Re-apply the most recently undone operation.
    pub fn redo(
        &mut self,
        doc: &Document,
        registry: &ComponentRegistry,
    ) -> TesseraResult<Option<Document>> {
        let Some(op) = self.redo_stack.last() else {
            return Ok(None);
        };
        let next = apply_operation(doc, op, registry)?;
        if let Some(op) = self.redo_stack.pop() {
            self.undo_stack.push(op);
        }
        Ok(Some(next))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ops;
    use crate::registry::build_registry;

    #[test]
    fn test_undo_redo_cycle() {
        let registry = build_registry();
        let mut history = History::new();
        let doc = Document::empty("History");
        let root = doc.root_entity_id.clone();

        let created = history
            .apply(&doc, ops::create_child(&root, "Box"), &registry)
            .unwrap();
        assert_eq!(created.entity_count(), 2);
        assert!(history.can_undo());

        let undone = history.undo(&created, &registry).unwrap().unwrap();
        assert_eq!(undone, doc);
        assert!(history.can_redo());

        let redone = history.redo(&undone, &registry).unwrap().unwrap();
        assert_eq!(redone, created);
        assert!(history.redo(&redone, &registry).unwrap().is_none());
    }
}
