//! One query editing session: the block tree, the edits in progress and the
//! lookup tables used to build and check conditions.

use crate::block::{BlockId, ConditionBlock, OperatorKind, QueryBlock, QueryTree};
use crate::compiler::{Pagination, QueryCompiler, QueryDocument, SortSpec};
use crate::config::QueryBuilderConfig;
use crate::errors::EditError;
use crate::properties_tree::PropertiesTree;
use crate::registry::{normalize_input, Comparator, ComparatorRegistry, EditorInput, Space};
use crate::schema::IndexProperty;
use crate::validity::{EditState, EditValidityTracker};
use log::{debug, warn};

#[derive(Debug)]
pub struct QueryBuilder {
    config: QueryBuilderConfig,
    registry: ComparatorRegistry,
    tree: QueryTree,
    edits: EditValidityTracker,
}

impl QueryBuilder {
    pub fn new(config: QueryBuilderConfig, spaces: Vec<Space>) -> Self {
        let registry = ComparatorRegistry::new(spaces, config.timezone());
        Self {
            config,
            registry,
            tree: QueryTree::new(),
            edits: EditValidityTracker::new(),
        }
    }

    pub fn config(&self) -> &QueryBuilderConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComparatorRegistry {
        &self.registry
    }

    pub fn set_spaces(&mut self, spaces: Vec<Space>) {
        self.registry.set_spaces(spaces);
    }

    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    pub fn edits(&self) -> &EditValidityTracker {
        &self.edits
    }

    /// Starts over with an empty tree.
    pub fn reset(&mut self) {
        self.tree = QueryTree::new();
        self.edits.clear();
        debug!("Query builder reset");
    }

    /// New condition holding the comparator's default value.
    pub fn new_condition(&self, property: IndexProperty, comparator: Comparator) -> ConditionBlock {
        let value = self.registry.default_value_for(comparator);
        ConditionBlock::new(Some(property), Some(comparator), value)
    }

    /// New condition using the first comparator of the property's type, if any.
    pub fn condition_for_property(&self, property: IndexProperty) -> Option<ConditionBlock> {
        let comparators = self.registry.comparators_for(&property.property_type);
        let comparator = *comparators.first()?;
        Some(self.new_condition(property, comparator))
    }

    /// Adds `block` under `parent`.
    ///
    /// Every condition in `block` must be well-formed. The root holds a
    /// single operand. Adding an operator to a non-empty root puts the
    /// current operand inside the new operator; adding a condition there is
    /// rejected.
    pub fn add_block(&mut self, parent: BlockId, block: QueryBlock) -> Result<BlockId, EditError> {
        self.check_well_formed(&block)?;
        let root_id = self.tree.root_id();
        let existing = match self.tree.main_block().map(QueryBlock::id) {
            Some(existing) if parent == root_id => existing,
            _ => return self.tree.add_operand(parent, block),
        };

        let QueryBlock::Operator(operator) = &block else {
            return Err(EditError::OperandLimitExceeded {
                kind: OperatorKind::Root,
                limit: 1,
            });
        };
        if block.contains_root() {
            return Err(EditError::RootNotNestable);
        }
        if !operator.has_free_slot() {
            return Err(EditError::OperandLimitExceeded {
                kind: operator.kind(),
                limit: operator
                    .kind()
                    .max_operands()
                    .unwrap_or(operator.operands().len()),
            });
        }

        let new_id = block.id();
        let previous = self.tree.replace_operand(parent, existing, block)?;
        self.tree.add_operand(new_id, previous)?;
        Ok(new_id)
    }

    pub fn replace_block(
        &mut self,
        parent: BlockId,
        old: BlockId,
        block: QueryBlock,
    ) -> Result<(), EditError> {
        self.check_well_formed(&block)?;
        let replaced = self.tree.replace_operand(parent, old, block)?;
        self.edits.forget_subtree(&replaced);
        Ok(())
    }

    /// Removes `block` and ends the edits of every condition under it.
    pub fn remove_block(&mut self, parent: BlockId, block: BlockId) -> Result<(), EditError> {
        let removed = self.tree.remove_operand(parent, block)?;
        self.edits.forget_subtree(&removed);
        Ok(())
    }

    pub fn surround_block(
        &mut self,
        block: BlockId,
        parent: BlockId,
        kind: OperatorKind,
    ) -> Result<BlockId, EditError> {
        self.tree.surround(block, parent, kind)
    }

    pub fn change_operator(
        &mut self,
        block: BlockId,
        parent: BlockId,
        kind: OperatorKind,
    ) -> Result<BlockId, EditError> {
        self.tree.change_operator(block, parent, kind)
    }

    pub fn flatten_block(&mut self, block: BlockId, parent: BlockId) -> Result<(), EditError> {
        self.tree.flatten(block, parent)
    }

    /// Puts a condition in edit mode with its current value as the pending one.
    pub fn start_condition_edit(&mut self, condition: BlockId) -> Result<(), EditError> {
        let value = self.condition(condition)?.value.clone();
        self.edits.start_edit(condition, value);
        Ok(())
    }

    /// Applies an editor event to the pending value. Returns whether the
    /// pending value is now valid.
    pub fn update_condition_edit(
        &mut self,
        condition: BlockId,
        input: EditorInput,
    ) -> Result<bool, EditError> {
        let comparator = self.condition(condition)?.comparator;
        let pending = self
            .edits
            .get(condition)
            .ok_or(EditError::EditNotStarted(condition))?
            .pending_value
            .as_ref();

        let value = normalize_input(pending, input);
        let is_valid = match comparator {
            Some(comparator) => self.registry.is_valid(comparator, value.as_ref()),
            None => true,
        };
        self.edits.update(condition, value, is_valid);
        Ok(is_valid)
    }

    /// Commits the pending value and leaves edit mode. An invalid value is
    /// not committed and the condition stays in edit mode.
    pub fn finish_condition_edit(&mut self, condition: BlockId) -> Result<(), EditError> {
        let EditState {
            is_valid,
            pending_value,
        } = self
            .edits
            .get(condition)
            .cloned()
            .ok_or(EditError::EditNotStarted(condition))?;
        if !is_valid {
            return Err(EditError::InvalidValue(condition));
        }

        self.tree
            .find_condition_mut(condition)
            .ok_or(EditError::BlockNotFound(condition))?
            .value = pending_value;
        self.edits.end_edit(condition);
        Ok(())
    }

    /// Leaves edit mode and drops the pending value.
    pub fn cancel_condition_edit(&mut self, condition: BlockId) -> Result<(), EditError> {
        self.edits
            .end_edit(condition)
            .map(|_| ())
            .ok_or(EditError::EditNotStarted(condition))
    }

    /// False while any condition being edited holds an invalid value, or a
    /// condition in the tree is not well-formed.
    pub fn can_submit(&self) -> bool {
        !self.edits.has_invalid()
            && self
                .tree
                .conditions()
                .into_iter()
                .all(|condition| condition.is_well_formed(&self.registry))
    }

    /// Score ordering in the configured direction.
    pub fn default_sort(&self) -> SortSpec {
        SortSpec::by_score(self.config.sort_direction)
    }

    /// Compiles the current tree, or returns `None` when submitting is blocked.
    pub fn compile(
        &self,
        visible: Option<&PropertiesTree>,
        sort: &SortSpec,
        pagination: &Pagination,
    ) -> Option<QueryDocument> {
        if !self.can_submit() {
            warn!("Query not compiled, a condition is invalid");
            return None;
        }
        let compiler = QueryCompiler::new(&self.config);
        let document = compiler.compile(self.tree.root(), visible, sort, pagination);
        Some(document)
    }

    fn check_well_formed(&self, block: &QueryBlock) -> Result<(), EditError> {
        let malformed = block
            .conditions()
            .into_iter()
            .find(|condition| !condition.is_well_formed(&self.registry));
        match malformed {
            Some(condition) => {
                warn!("Rejected malformed condition {}", condition.id());
                Err(EditError::MalformedCondition(condition.id()))
            }
            None => Ok(()),
        }
    }

    fn condition(&self, id: BlockId) -> Result<&ConditionBlock, EditError> {
        match self.tree.find(id) {
            Some(QueryBlock::Condition(condition)) => Ok(condition),
            Some(QueryBlock::Operator(_)) => Err(EditError::NotACondition(id)),
            None => Err(EditError::BlockNotFound(id)),
        }
    }
}
