use crate::block::{BlockId, OperatorKind};

/// Error types for loading mappings, configuration and search responses
#[derive(Debug)]
pub enum QueryBuilderError {
    IoError(std::io::Error),
    SerdeJsonError(serde_json::Error),
    SerdeYamlError(serde_yaml_ng::Error),
    InvalidMapping(String),
}

impl From<std::io::Error> for QueryBuilderError {
    fn from(err: std::io::Error) -> Self {
        QueryBuilderError::IoError(err)
    }
}

impl From<serde_json::Error> for QueryBuilderError {
    fn from(err: serde_json::Error) -> Self {
        QueryBuilderError::SerdeJsonError(err)
    }
}

impl From<serde_yaml_ng::Error> for QueryBuilderError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        QueryBuilderError::SerdeYamlError(err)
    }
}

impl std::fmt::Display for QueryBuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryBuilderError::IoError(err) => write!(f, "IO error: {}", err),
            QueryBuilderError::SerdeJsonError(err) => write!(f, "Serde JSON error: {}", err),
            QueryBuilderError::SerdeYamlError(err) => write!(f, "Serde YAML error: {}", err),
            QueryBuilderError::InvalidMapping(msg) => write!(f, "Invalid index mapping: {}", msg),
        }
    }
}

impl std::error::Error for QueryBuilderError {}

/// Rejections of structural edits and condition edit sessions.
/// The tree is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    BlockNotFound(BlockId),
    NotAnOperator(BlockId),
    NotACondition(BlockId),
    OperandLimitExceeded { kind: OperatorKind, limit: usize },
    OperatorChangeNotAllowed { to: OperatorKind, operands: usize },
    FlattenNotAllowed(BlockId),
    RootNotNestable,
    EditNotStarted(BlockId),
    InvalidValue(BlockId),
    MalformedCondition(BlockId),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::BlockNotFound(id) => write!(f, "Block not found: {}", id),
            EditError::NotAnOperator(id) => write!(f, "Block {} is not an operator", id),
            EditError::NotACondition(id) => write!(f, "Block {} is not a condition", id),
            EditError::OperandLimitExceeded { kind, limit } => {
                write!(f, "{} operator accepts at most {} operand(s)", kind, limit)
            }
            EditError::OperatorChangeNotAllowed { to, operands } => {
                write!(
                    f,
                    "Cannot change a block with {} operand(s) to {}",
                    operands, to
                )
            }
            EditError::FlattenNotAllowed(id) => {
                write!(f, "Operands of block {} do not fit into its parent", id)
            }
            EditError::RootNotNestable => write!(f, "Root block cannot be nested"),
            EditError::EditNotStarted(id) => write!(f, "Condition {} is not being edited", id),
            EditError::InvalidValue(id) => write!(f, "Condition {} has an invalid value", id),
            EditError::MalformedCondition(id) => {
                write!(f, "Condition {} is incomplete or has an invalid value", id)
            }
        }
    }
}

impl std::error::Error for EditError {}
