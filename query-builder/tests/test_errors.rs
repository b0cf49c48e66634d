use query_builder::{
    BlockId, EditError, OperatorKind, QueryBuilderConfig, QueryBuilderError, QueryTree,
};
use std::io;

#[test]
fn test_query_builder_error_display() {
    let io_error = QueryBuilderError::IoError(io::Error::new(io::ErrorKind::NotFound, "gone"));
    assert_eq!(io_error.to_string(), "IO error: gone");

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error = QueryBuilderError::from(json_error);
    assert!(error.to_string().starts_with("Serde JSON error: "));

    let yaml_error = QueryBuilderConfig::from_yaml_str("page_size: [").unwrap_err();
    assert!(yaml_error.to_string().starts_with("Serde YAML error: "));

    let mapping_error = QueryBuilderError::InvalidMapping("bad".to_string());
    assert_eq!(mapping_error.to_string(), "Invalid index mapping: bad");
}

#[test]
fn test_edit_error_display() {
    let tree = QueryTree::new();
    let root: BlockId = tree.root_id();
    let shown = root.to_string();
    assert!(shown.starts_with('#'));

    assert_eq!(
        EditError::BlockNotFound(root).to_string(),
        format!("Block not found: {}", shown)
    );
    assert_eq!(
        EditError::OperandLimitExceeded {
            kind: OperatorKind::Not,
            limit: 1
        }
        .to_string(),
        "not operator accepts at most 1 operand(s)"
    );
    assert_eq!(
        EditError::OperatorChangeNotAllowed {
            to: OperatorKind::Not,
            operands: 3
        }
        .to_string(),
        "Cannot change a block with 3 operand(s) to not"
    );
    assert_eq!(
        EditError::RootNotNestable.to_string(),
        "Root block cannot be nested"
    );
    assert_eq!(
        EditError::MalformedCondition(root).to_string(),
        format!("Condition {} is incomplete or has an invalid value", shown)
    );
}

#[test]
fn test_errors_are_std_errors() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    assert_error(&EditError::RootNotNestable);
    assert_error(&QueryBuilderError::InvalidMapping(String::new()));
}
