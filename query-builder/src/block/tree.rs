use crate::block::types::{BlockId, ConditionBlock, OperatorBlock, OperatorKind, QueryBlock};
use crate::errors::EditError;
use log::debug;

/// The block tree of one editing session, held by its root operator.
///
/// Every edit names the blocks it touches by id, together with the id of
/// their parent. An edit either applies completely or returns an error and
/// leaves the tree as it was.
#[derive(Debug)]
pub struct QueryTree {
    root: OperatorBlock,
}

impl Default for QueryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryTree {
    pub fn new() -> Self {
        Self {
            root: OperatorBlock::new(OperatorKind::Root),
        }
    }

    pub fn root(&self) -> &OperatorBlock {
        &self.root
    }

    pub fn root_id(&self) -> BlockId {
        self.root.id()
    }

    /// The single operand of the root, if any.
    pub fn main_block(&self) -> Option<&QueryBlock> {
        self.root.operands().first()
    }

    pub fn is_empty(&self) -> bool {
        self.root.operands().is_empty()
    }

    /// Any block except the root.
    pub fn find(&self, id: BlockId) -> Option<&QueryBlock> {
        self.root.find(id)
    }

    pub fn find_operator(&self, id: BlockId) -> Option<&OperatorBlock> {
        self.root.find_operator(id)
    }

    pub fn find_condition(&self, id: BlockId) -> Option<&ConditionBlock> {
        self.find(id).and_then(QueryBlock::as_condition)
    }

    pub fn find_condition_mut(&mut self, id: BlockId) -> Option<&mut ConditionBlock> {
        match self.root.find_mut(id) {
            Some(QueryBlock::Condition(condition)) => Some(condition),
            _ => None,
        }
    }

    pub fn parent_of(&self, id: BlockId) -> Option<BlockId> {
        self.root.parent_of(id)
    }

    pub fn level(&self) -> usize {
        self.main_block().map_or(0, QueryBlock::level)
    }

    pub fn conditions(&self) -> Vec<&ConditionBlock> {
        self.main_block()
            .map_or_else(Vec::new, QueryBlock::conditions)
    }

    /// Appends `block` to the operands of `parent`.
    pub fn add_operand(
        &mut self,
        parent: BlockId,
        block: QueryBlock,
    ) -> Result<BlockId, EditError> {
        if block.contains_root() {
            return Err(EditError::RootNotNestable);
        }
        let id = block.id();
        self.operator_mut(parent)?.push_operand(block)?;
        debug!("Added block {} to {}", id, parent);
        Ok(id)
    }

    /// Puts `block` in place of `old` and returns the replaced subtree.
    pub fn replace_operand(
        &mut self,
        parent: BlockId,
        old: BlockId,
        block: QueryBlock,
    ) -> Result<QueryBlock, EditError> {
        if block.contains_root() {
            return Err(EditError::RootNotNestable);
        }
        let (operator, position) = self.operand_position(parent, old)?;
        let replaced = std::mem::replace(&mut operator.operands_mut()[position], block);
        debug!("Replaced block {} in {}", old, parent);
        Ok(replaced)
    }

    /// Detaches `block` from `parent` and returns it.
    pub fn remove_operand(
        &mut self,
        parent: BlockId,
        block: BlockId,
    ) -> Result<QueryBlock, EditError> {
        let (operator, position) = self.operand_position(parent, block)?;
        let removed = operator.operands_mut().remove(position);
        debug!("Removed block {} from {}", block, parent);
        Ok(removed)
    }

    /// Wraps `block` in a new operator of `kind`, keeping its position.
    /// Returns the id of the wrapper.
    pub fn surround(
        &mut self,
        block: BlockId,
        parent: BlockId,
        kind: OperatorKind,
    ) -> Result<BlockId, EditError> {
        if kind == OperatorKind::Root {
            return Err(EditError::RootNotNestable);
        }
        let (operator, position) = self.operand_position(parent, block)?;
        let operands = operator.operands_mut();
        let inner = operands.remove(position);
        let mut wrapper = OperatorBlock::new(kind);
        let wrapper_id = wrapper.id();
        wrapper.operands_mut().push(inner);
        operands.insert(position, wrapper.into());
        debug!("Surrounded block {} with {} {}", block, kind, wrapper_id);
        Ok(wrapper_id)
    }

    /// Re-types operator `block` to `kind`. Operands move over unchanged; the
    /// re-typed operator gets a new id, which is returned.
    pub fn change_operator(
        &mut self,
        block: BlockId,
        parent: BlockId,
        kind: OperatorKind,
    ) -> Result<BlockId, EditError> {
        if kind == OperatorKind::Root {
            return Err(EditError::RootNotNestable);
        }
        let (operator, position) = self.operand_position(parent, block)?;
        let QueryBlock::Operator(target) = &mut operator.operands_mut()[position] else {
            return Err(EditError::NotAnOperator(block));
        };
        let count = target.operands().len();
        if !kind.accepts(count) {
            return Err(EditError::OperatorChangeNotAllowed {
                to: kind,
                operands: count,
            });
        }
        target.retype(kind);
        let changed_id = target.id();
        debug!("Changed block {} to {} {}", block, kind, changed_id);
        Ok(changed_id)
    }

    /// Removes operator `block` and puts its operands in its place.
    pub fn flatten(&mut self, block: BlockId, parent: BlockId) -> Result<(), EditError> {
        if !self.can_flatten_into(block, parent)? {
            return Err(EditError::FlattenNotAllowed(block));
        }
        let (operator, position) = self.operand_position(parent, block)?;
        let operands = operator.operands_mut();
        if let QueryBlock::Operator(target) = operands.remove(position) {
            let spliced = target.into_operands();
            debug!(
                "Flattened block {} into {} ({} operands)",
                block,
                parent,
                spliced.len()
            );
            operands.splice(position..position, spliced);
        }
        Ok(())
    }

    pub fn can_add_operand(&self, parent: BlockId) -> bool {
        self.find_operator(parent)
            .is_some_and(OperatorBlock::has_free_slot)
    }

    /// Kinds operator `block` may be re-typed to, in menu order.
    pub fn allowed_operator_changes(&self, block: BlockId) -> Vec<OperatorKind> {
        let Some(operator) = self.find(block).and_then(QueryBlock::as_operator) else {
            return Vec::new();
        };
        let count = operator.operands().len();
        OperatorKind::SELECTABLE
            .into_iter()
            .filter(|kind| *kind != operator.kind() && kind.accepts(count))
            .collect()
    }

    pub fn can_flatten(&self, block: BlockId) -> bool {
        self.parent_of(block)
            .and_then(|parent| self.can_flatten_into(block, parent).ok())
            .unwrap_or(false)
    }

    fn can_flatten_into(&self, block: BlockId, parent: BlockId) -> Result<bool, EditError> {
        let operator = self.operator(parent)?;
        let position = operator
            .position_of(block)
            .ok_or(EditError::BlockNotFound(block))?;
        let QueryBlock::Operator(target) = &operator.operands()[position] else {
            return Err(EditError::NotAnOperator(block));
        };
        let spliced = target.operands().len();
        let remaining = operator.operands().len() - 1;
        Ok(spliced == 0 || operator.kind().accepts(remaining + spliced))
    }

    fn operator(&self, id: BlockId) -> Result<&OperatorBlock, EditError> {
        match self.root.find_operator(id) {
            Some(operator) => Ok(operator),
            None if self.find(id).is_some() => Err(EditError::NotAnOperator(id)),
            None => Err(EditError::BlockNotFound(id)),
        }
    }

    fn operator_mut(&mut self, id: BlockId) -> Result<&mut OperatorBlock, EditError> {
        self.operator(id)?;
        self.root
            .find_operator_mut(id)
            .ok_or(EditError::BlockNotFound(id))
    }

    fn operand_position(
        &mut self,
        parent: BlockId,
        block: BlockId,
    ) -> Result<(&mut OperatorBlock, usize), EditError> {
        let operator = self.operator_mut(parent)?;
        let position = operator
            .position_of(block)
            .ok_or(EditError::BlockNotFound(block))?;
        Ok((operator, position))
    }
}
