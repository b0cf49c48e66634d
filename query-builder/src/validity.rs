//! Bookkeeping of conditions currently in edit mode.

use crate::block::{BlockId, QueryBlock};
use crate::registry::ComparatorValue;
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub is_valid: bool,
    /// Value typed so far, not yet committed to the condition.
    pub pending_value: Option<ComparatorValue>,
}

#[derive(Debug, Default)]
pub struct EditValidityTracker {
    entries: HashMap<BlockId, EditState>,
}

impl EditValidityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an entry, valid until told otherwise.
    pub fn start_edit(&mut self, condition: BlockId, value: Option<ComparatorValue>) {
        self.entries.insert(
            condition,
            EditState {
                is_valid: true,
                pending_value: value,
            },
        );
    }

    /// Updates validity of an open entry. Conditions not being edited are ignored.
    pub fn set_validity(&mut self, condition: BlockId, is_valid: bool) {
        if let Some(state) = self.entries.get_mut(&condition) {
            state.is_valid = is_valid;
        }
    }

    /// Stores a new pending value with its validity. Returns false when the
    /// condition is not being edited.
    pub fn update(
        &mut self,
        condition: BlockId,
        value: Option<ComparatorValue>,
        is_valid: bool,
    ) -> bool {
        match self.entries.get_mut(&condition) {
            Some(state) => {
                state.pending_value = value;
                state.is_valid = is_valid;
                true
            }
            None => false,
        }
    }

    pub fn end_edit(&mut self, condition: BlockId) -> Option<EditState> {
        self.entries.remove(&condition)
    }

    pub fn get(&self, condition: BlockId) -> Option<&EditState> {
        self.entries.get(&condition)
    }

    pub fn is_editing(&self, condition: BlockId) -> bool {
        self.entries.contains_key(&condition)
    }

    /// Drops entries of every condition under `block`, `block` included.
    pub fn forget_subtree(&mut self, block: &QueryBlock) {
        for id in block.condition_ids() {
            if self.entries.remove(&id).is_some() {
                debug!("Dropped edit state of removed condition {}", id);
            }
        }
    }

    pub fn has_invalid(&self) -> bool {
        self.entries.values().any(|state| !state.is_valid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
