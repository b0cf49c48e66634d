//! The query block tree and its structural edits.

mod tree;
mod types;

pub use tree::QueryTree;
pub use types::{BlockId, ConditionBlock, OperatorBlock, OperatorKind, QueryBlock};

#[cfg(test)]
mod tests;
