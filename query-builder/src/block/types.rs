use crate::errors::EditError;
use crate::registry::{Comparator, ComparatorRegistry, ComparatorValue};
use crate::schema::IndexProperty;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a block. Two structurally equal blocks never
/// share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    pub(crate) fn next() -> Self {
        BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    And,
    Or,
    Not,
    Root,
}

impl OperatorKind {
    /// Kinds a user can pick for a new or re-typed operator.
    pub const SELECTABLE: [OperatorKind; 3] =
        [OperatorKind::And, OperatorKind::Or, OperatorKind::Not];

    /// `None` means unbounded.
    pub fn max_operands(&self) -> Option<usize> {
        match self {
            OperatorKind::And | OperatorKind::Or => None,
            OperatorKind::Not | OperatorKind::Root => Some(1),
        }
    }

    pub fn accepts(&self, operands: usize) -> bool {
        self.max_operands().map_or(true, |max| operands <= max)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::And => "and",
            OperatorKind::Or => "or",
            OperatorKind::Not => "not",
            OperatorKind::Root => "root",
        }
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and" => Ok(OperatorKind::And),
            "or" => Ok(OperatorKind::Or),
            "not" => Ok(OperatorKind::Not),
            "root" => Ok(OperatorKind::Root),
            _ => anyhow::bail!("Unknown operator: {}", s),
        }
    }
}

/// Leaf of the tree: `property comparator value`
#[derive(Debug)]
pub struct ConditionBlock {
    id: BlockId,
    pub property: Option<IndexProperty>,
    pub comparator: Option<Comparator>,
    pub value: Option<ComparatorValue>,
}

impl ConditionBlock {
    pub fn new(
        property: Option<IndexProperty>,
        comparator: Option<Comparator>,
        value: Option<ComparatorValue>,
    ) -> Self {
        Self {
            id: BlockId::next(),
            property,
            comparator,
            value,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// All parts are set and the value passes the comparator's validator.
    pub fn is_well_formed(&self, registry: &ComparatorRegistry) -> bool {
        match (&self.property, self.comparator) {
            (Some(_), Some(comparator)) => {
                self.value.is_some() && registry.is_valid(comparator, self.value.as_ref())
            }
            _ => false,
        }
    }

    fn deep_clone(&self) -> Self {
        Self::new(self.property.clone(), self.comparator, self.value.clone())
    }
}

#[derive(Debug)]
pub struct OperatorBlock {
    id: BlockId,
    kind: OperatorKind,
    operands: Vec<QueryBlock>,
}

impl OperatorBlock {
    pub fn new(kind: OperatorKind) -> Self {
        Self {
            id: BlockId::next(),
            kind,
            operands: Vec::new(),
        }
    }

    pub fn with_operands(kind: OperatorKind, operands: Vec<QueryBlock>) -> Result<Self, EditError> {
        let mut block = Self::new(kind);
        for operand in operands {
            block.push_operand(operand)?;
        }
        Ok(block)
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn operands(&self) -> &[QueryBlock] {
        &self.operands
    }

    pub fn has_free_slot(&self) -> bool {
        self.kind.accepts(self.operands.len() + 1)
    }

    /// Appends `operand`, refusing to exceed the kind's cap or to nest a root.
    pub fn push_operand(&mut self, operand: QueryBlock) -> Result<(), EditError> {
        if operand.contains_root() {
            return Err(EditError::RootNotNestable);
        }
        self.check_free_slot()?;
        self.operands.push(operand);
        Ok(())
    }

    pub(crate) fn check_free_slot(&self) -> Result<(), EditError> {
        match self.kind.max_operands() {
            Some(limit) if self.operands.len() >= limit => Err(EditError::OperandLimitExceeded {
                kind: self.kind,
                limit,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn operands_mut(&mut self) -> &mut Vec<QueryBlock> {
        &mut self.operands
    }

    /// Switches to `kind` under a new id, keeping the operands.
    pub(crate) fn retype(&mut self, kind: OperatorKind) {
        self.id = BlockId::next();
        self.kind = kind;
    }

    pub(crate) fn into_operands(self) -> Vec<QueryBlock> {
        self.operands
    }

    pub(crate) fn position_of(&self, id: BlockId) -> Option<usize> {
        self.operands.iter().position(|operand| operand.id() == id)
    }

    /// Searches operands at any depth. The block itself is not a candidate.
    pub fn find(&self, id: BlockId) -> Option<&QueryBlock> {
        let mut stack: Vec<&QueryBlock> = self.operands.iter().collect();
        while let Some(block) = stack.pop() {
            if block.id() == id {
                return Some(block);
            }
            if let QueryBlock::Operator(operator) = block {
                stack.extend(operator.operands.iter());
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: BlockId) -> Option<&mut QueryBlock> {
        let mut stack: Vec<&mut QueryBlock> = self.operands.iter_mut().collect();
        while let Some(block) = stack.pop() {
            if block.id() == id {
                return Some(block);
            }
            if let QueryBlock::Operator(operator) = block {
                stack.extend(operator.operands.iter_mut());
            }
        }
        None
    }

    /// Like [`find`](Self::find) restricted to operators, including `self`.
    pub fn find_operator(&self, id: BlockId) -> Option<&OperatorBlock> {
        if self.id == id {
            return Some(self);
        }
        match self.find(id) {
            Some(QueryBlock::Operator(operator)) => Some(operator),
            _ => None,
        }
    }

    pub fn find_operator_mut(&mut self, id: BlockId) -> Option<&mut OperatorBlock> {
        if self.id == id {
            return Some(self);
        }
        match self.find_mut(id) {
            Some(QueryBlock::Operator(operator)) => Some(operator),
            _ => None,
        }
    }

    /// Id of the operator directly holding `id`.
    pub fn parent_of(&self, id: BlockId) -> Option<BlockId> {
        let mut stack: Vec<&OperatorBlock> = vec![self];
        while let Some(operator) = stack.pop() {
            for operand in &operator.operands {
                if operand.id() == id {
                    return Some(operator.id);
                }
                if let QueryBlock::Operator(nested) = operand {
                    stack.push(nested);
                }
            }
        }
        None
    }

    pub(crate) fn level(&self) -> usize {
        1 + self
            .operands
            .iter()
            .map(QueryBlock::level)
            .max()
            .unwrap_or(0)
    }

    fn deep_clone(&self) -> Self {
        Self {
            id: BlockId::next(),
            kind: self.kind,
            operands: self.operands.iter().map(QueryBlock::deep_clone).collect(),
        }
    }
}

#[derive(Debug)]
pub enum QueryBlock {
    Condition(ConditionBlock),
    Operator(OperatorBlock),
}

impl From<ConditionBlock> for QueryBlock {
    fn from(condition: ConditionBlock) -> Self {
        QueryBlock::Condition(condition)
    }
}

impl From<OperatorBlock> for QueryBlock {
    fn from(operator: OperatorBlock) -> Self {
        QueryBlock::Operator(operator)
    }
}

impl QueryBlock {
    pub fn id(&self) -> BlockId {
        match self {
            QueryBlock::Condition(condition) => condition.id,
            QueryBlock::Operator(operator) => operator.id,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionBlock> {
        match self {
            QueryBlock::Condition(condition) => Some(condition),
            QueryBlock::Operator(_) => None,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorBlock> {
        match self {
            QueryBlock::Operator(operator) => Some(operator),
            QueryBlock::Condition(_) => None,
        }
    }

    /// Height of the subtree: 1 for conditions and empty operators.
    pub fn level(&self) -> usize {
        match self {
            QueryBlock::Condition(_) => 1,
            QueryBlock::Operator(operator) => operator.level(),
        }
    }

    /// Deep copy with fresh ids throughout.
    pub fn deep_clone(&self) -> QueryBlock {
        match self {
            QueryBlock::Condition(condition) => QueryBlock::Condition(condition.deep_clone()),
            QueryBlock::Operator(operator) => QueryBlock::Operator(operator.deep_clone()),
        }
    }

    /// Equality of kinds, operands and condition contents, ignoring ids.
    pub fn same_structure(&self, other: &QueryBlock) -> bool {
        match (self, other) {
            (QueryBlock::Condition(a), QueryBlock::Condition(b)) => {
                a.property == b.property && a.comparator == b.comparator && a.value == b.value
            }
            (QueryBlock::Operator(a), QueryBlock::Operator(b)) => {
                a.kind == b.kind
                    && a.operands.len() == b.operands.len()
                    && a.operands
                        .iter()
                        .zip(&b.operands)
                        .all(|(a, b)| a.same_structure(b))
            }
            _ => false,
        }
    }

    /// Every condition in this subtree, the block itself included.
    pub fn conditions(&self) -> Vec<&ConditionBlock> {
        let mut conditions = Vec::new();
        let mut stack = vec![self];
        while let Some(block) = stack.pop() {
            match block {
                QueryBlock::Condition(condition) => conditions.push(condition),
                QueryBlock::Operator(operator) => stack.extend(operator.operands.iter()),
            }
        }
        conditions
    }

    pub fn condition_ids(&self) -> Vec<BlockId> {
        self.conditions()
            .into_iter()
            .map(ConditionBlock::id)
            .collect()
    }

    pub fn contains_root(&self) -> bool {
        let mut stack = vec![self];
        while let Some(block) = stack.pop() {
            if let QueryBlock::Operator(operator) = block {
                if operator.kind == OperatorKind::Root {
                    return true;
                }
                stack.extend(operator.operands.iter());
            }
        }
        false
    }
}
