use super::*;
use crate::errors::EditError;
use crate::registry::{Comparator, ComparatorRegistry, ComparatorValue};
use crate::schema::{IndexProperty, PropertyType};

fn condition(path: &str) -> QueryBlock {
    let property = IndexProperty::new(None, path, PropertyType::Keyword, false);
    ConditionBlock::new(
        Some(property),
        Some(Comparator::KeywordIs),
        Some(ComparatorValue::text("x")),
    )
    .into()
}

fn operator(kind: OperatorKind, operands: Vec<QueryBlock>) -> QueryBlock {
    OperatorBlock::with_operands(kind, operands).unwrap().into()
}

fn operand_ids(tree: &QueryTree, id: BlockId) -> Vec<BlockId> {
    tree.find_operator(id)
        .unwrap()
        .operands()
        .iter()
        .map(QueryBlock::id)
        .collect()
}

/// root -> and[c1, c2, c3]
fn and_tree() -> (QueryTree, BlockId, Vec<BlockId>) {
    let mut tree = QueryTree::new();
    let conditions = vec![condition("a"), condition("b"), condition("c")];
    let ids = conditions.iter().map(QueryBlock::id).collect();
    let and = operator(OperatorKind::And, conditions);
    let and_id = tree.add_operand(tree.root_id(), and).unwrap();
    (tree, and_id, ids)
}

#[test]
fn test_block_ids_are_unique() {
    let a = condition("a");
    let b = condition("a");
    assert_ne!(a.id(), b.id());
    assert!(a.same_structure(&b));
}

#[test]
fn test_operator_kind_parse() {
    assert_eq!("AND".parse::<OperatorKind>().unwrap(), OperatorKind::And);
    assert_eq!("not".parse::<OperatorKind>().unwrap(), OperatorKind::Not);
    let err = "xor".parse::<OperatorKind>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown operator: xor");
    assert_eq!(OperatorKind::Or.to_string(), "or");
}

#[test]
fn test_operand_caps() {
    let mut tree = QueryTree::new();
    let root = tree.root_id();
    let not_id = tree
        .add_operand(root, operator(OperatorKind::Not, vec![]))
        .unwrap();

    assert!(tree.can_add_operand(not_id));
    tree.add_operand(not_id, condition("a")).unwrap();
    assert!(!tree.can_add_operand(not_id));
    assert_eq!(
        tree.add_operand(not_id, condition("b")),
        Err(EditError::OperandLimitExceeded {
            kind: OperatorKind::Not,
            limit: 1
        })
    );
    assert_eq!(operand_ids(&tree, not_id).len(), 1);

    assert!(!tree.can_add_operand(root));
    assert!(tree.add_operand(root, condition("c")).is_err());
    assert_eq!(tree.root().operands().len(), 1);
}

fn assert_caps_hold(tree: &QueryTree) {
    let mut stack = vec![tree.root()];
    while let Some(operator) = stack.pop() {
        let count = operator.operands().len();
        assert!(
            operator.kind().accepts(count),
            "{} {} holds {} operands",
            operator.kind(),
            operator.id(),
            count
        );
        for operand in operator.operands() {
            if let QueryBlock::Operator(nested) = operand {
                stack.push(nested);
            }
        }
    }
}

#[test]
fn test_operand_caps_hold_across_edits() {
    let mut tree = QueryTree::new();
    let root = tree.root_id();
    let and_id = tree
        .add_operand(root, operator(OperatorKind::And, vec![]))
        .unwrap();
    let a = tree.add_operand(and_id, condition("a")).unwrap();
    let b = tree.add_operand(and_id, condition("b")).unwrap();
    assert_caps_hold(&tree);

    let not_id = tree.surround(a, and_id, OperatorKind::Not).unwrap();
    assert_caps_hold(&tree);
    assert!(tree.add_operand(not_id, condition("c")).is_err());
    assert_caps_hold(&tree);

    assert_eq!(
        tree.change_operator(and_id, root, OperatorKind::Not),
        Err(EditError::OperatorChangeNotAllowed {
            to: OperatorKind::Not,
            operands: 2
        })
    );
    assert_caps_hold(&tree);
    let or_id = tree
        .change_operator(and_id, root, OperatorKind::Or)
        .unwrap();
    assert_caps_hold(&tree);

    tree.remove_operand(or_id, b).unwrap();
    let single_id = tree
        .change_operator(or_id, root, OperatorKind::Not)
        .unwrap();
    assert_caps_hold(&tree);
    assert!(tree.add_operand(single_id, condition("d")).is_err());
    assert_caps_hold(&tree);

    let outer_id = tree.surround(single_id, root, OperatorKind::And).unwrap();
    tree.add_operand(outer_id, condition("e")).unwrap();
    assert_caps_hold(&tree);
    assert_eq!(
        tree.change_operator(outer_id, root, OperatorKind::Not),
        Err(EditError::OperatorChangeNotAllowed {
            to: OperatorKind::Not,
            operands: 2
        })
    );
    assert!(tree.surround(outer_id, root, OperatorKind::Root).is_err());
    assert!(tree.add_operand(root, condition("f")).is_err());
    assert_caps_hold(&tree);
    assert_eq!(tree.level(), 4);
}

#[test]
fn test_with_operands_respects_cap() {
    let err = OperatorBlock::with_operands(OperatorKind::Not, vec![condition("a"), condition("b")])
        .unwrap_err();
    assert!(matches!(err, EditError::OperandLimitExceeded { .. }));
}

#[test]
fn test_root_is_never_nested() {
    let (mut tree, and_id, ids) = and_tree();
    let nested_root = operator(OperatorKind::Root, vec![]);
    assert_eq!(
        tree.add_operand(and_id, nested_root),
        Err(EditError::RootNotNestable)
    );
    assert_eq!(
        tree.replace_operand(and_id, ids[0], operator(OperatorKind::Root, vec![]))
            .unwrap_err(),
        EditError::RootNotNestable
    );
    assert_eq!(
        OperatorBlock::new(OperatorKind::Or)
            .push_operand(operator(OperatorKind::Root, vec![])),
        Err(EditError::RootNotNestable)
    );
    assert_eq!(
        tree.surround(and_id, tree.root_id(), OperatorKind::Root),
        Err(EditError::RootNotNestable)
    );
}

#[test]
fn test_add_to_unknown_or_condition_parent() {
    let (mut tree, _, ids) = and_tree();
    let missing = condition("zzz").id();
    assert_eq!(
        tree.add_operand(missing, condition("x")),
        Err(EditError::BlockNotFound(missing))
    );
    assert_eq!(
        tree.add_operand(ids[0], condition("x")),
        Err(EditError::NotAnOperator(ids[0]))
    );
}

#[test]
fn test_replace_operand_keeps_position() {
    let (mut tree, and_id, ids) = and_tree();
    let replacement = condition("new");
    let replacement_id = replacement.id();
    let old = tree.replace_operand(and_id, ids[1], replacement).unwrap();
    assert_eq!(old.id(), ids[1]);
    assert_eq!(
        operand_ids(&tree, and_id),
        vec![ids[0], replacement_id, ids[2]]
    );
}

#[test]
fn test_replace_missing_leaves_tree_unchanged() {
    let (mut tree, and_id, ids) = and_tree();
    let missing = condition("zzz").id();
    assert_eq!(
        tree.replace_operand(and_id, missing, condition("new"))
            .unwrap_err(),
        EditError::BlockNotFound(missing)
    );
    assert_eq!(operand_ids(&tree, and_id), ids);
}

#[test]
fn test_remove_operand() {
    let (mut tree, and_id, ids) = and_tree();
    let removed = tree.remove_operand(and_id, ids[0]).unwrap();
    assert_eq!(removed.id(), ids[0]);
    assert_eq!(operand_ids(&tree, and_id), vec![ids[1], ids[2]]);
    assert!(tree.remove_operand(and_id, ids[0]).is_err());
}

#[test]
fn test_structurally_equal_siblings_are_distinguished() {
    let mut tree = QueryTree::new();
    let first = condition("same");
    let second = condition("same");
    let (first_id, second_id) = (first.id(), second.id());
    let root = tree.root_id();
    let or_id = tree
        .add_operand(root, operator(OperatorKind::Or, vec![first, second]))
        .unwrap();
    tree.remove_operand(or_id, second_id).unwrap();
    assert_eq!(operand_ids(&tree, or_id), vec![first_id]);
}

#[test]
fn test_surround() {
    let (mut tree, and_id, ids) = and_tree();
    let not_id = tree.surround(ids[1], and_id, OperatorKind::Not).unwrap();
    assert_eq!(operand_ids(&tree, and_id), vec![ids[0], not_id, ids[2]]);
    assert_eq!(operand_ids(&tree, not_id), vec![ids[1]]);
    assert_eq!(tree.parent_of(ids[1]), Some(not_id));
}

#[test]
fn test_surround_main_block() {
    let (mut tree, and_id, _) = and_tree();
    let root = tree.root_id();
    let or_id = tree.surround(and_id, root, OperatorKind::Or).unwrap();
    assert_eq!(tree.main_block().unwrap().id(), or_id);
    assert_eq!(tree.parent_of(and_id), Some(or_id));
}

#[test]
fn test_change_operator_moves_operands() {
    let (mut tree, and_id, ids) = and_tree();
    let root = tree.root_id();
    let or_id = tree
        .change_operator(and_id, root, OperatorKind::Or)
        .unwrap();
    assert_ne!(or_id, and_id);
    assert!(tree.find(and_id).is_none());
    assert_eq!(tree.find_operator(or_id).unwrap().kind(), OperatorKind::Or);
    assert_eq!(operand_ids(&tree, or_id), ids);
}

#[test]
fn test_change_operator_respects_cap() {
    let (mut tree, and_id, ids) = and_tree();
    let root = tree.root_id();
    assert_eq!(
        tree.change_operator(and_id, root, OperatorKind::Not),
        Err(EditError::OperatorChangeNotAllowed {
            to: OperatorKind::Not,
            operands: 3
        })
    );
    let kind = tree.find_operator(and_id).unwrap().kind();
    assert_eq!(kind, OperatorKind::And);
    assert_eq!(operand_ids(&tree, and_id), ids);
    assert_eq!(
        tree.change_operator(ids[0], and_id, OperatorKind::Or),
        Err(EditError::NotAnOperator(ids[0]))
    );
}

#[test]
fn test_allowed_operator_changes() {
    let (mut tree, and_id, ids) = and_tree();
    assert_eq!(
        tree.allowed_operator_changes(and_id),
        vec![OperatorKind::Or]
    );

    let not_id = tree.surround(ids[0], and_id, OperatorKind::Not).unwrap();
    assert_eq!(
        tree.allowed_operator_changes(not_id),
        vec![OperatorKind::And, OperatorKind::Or]
    );
    assert!(tree.allowed_operator_changes(ids[1]).is_empty());
}

#[test]
fn test_flatten_into_unbounded_parent() {
    let (mut tree, and_id, ids) = and_tree();
    let inner = operator(OperatorKind::Or, vec![condition("x"), condition("y")]);
    let inner_ids = operand_ids_of(&inner);
    let or_id = inner.id();
    tree.replace_operand(and_id, ids[1], inner).unwrap();

    assert!(tree.can_flatten(or_id));
    tree.flatten(or_id, and_id).unwrap();
    assert_eq!(
        operand_ids(&tree, and_id),
        vec![ids[0], inner_ids[0], inner_ids[1], ids[2]]
    );
}

fn operand_ids_of(block: &QueryBlock) -> Vec<BlockId> {
    block
        .as_operator()
        .unwrap()
        .operands()
        .iter()
        .map(QueryBlock::id)
        .collect()
}

#[test]
fn test_flatten_into_capped_parent() {
    // root -> not -> and[x, y]
    let mut tree = QueryTree::new();
    let and = operator(OperatorKind::And, vec![condition("x"), condition("y")]);
    let and_id = and.id();
    let not_id = tree
        .add_operand(tree.root_id(), operator(OperatorKind::Not, vec![and]))
        .unwrap();

    assert!(!tree.can_flatten(and_id));
    assert_eq!(
        tree.flatten(and_id, not_id),
        Err(EditError::FlattenNotAllowed(and_id))
    );
    assert_eq!(operand_ids(&tree, not_id), vec![and_id]);

    let y = operand_ids(&tree, and_id)[1];
    let removed = tree.remove_operand(and_id, y).unwrap();
    assert_eq!(removed.level(), 1);
    assert!(tree.can_flatten(and_id));
    tree.flatten(and_id, not_id).unwrap();
    assert_eq!(tree.find_operator(not_id).unwrap().operands().len(), 1);
}

#[test]
fn test_flatten_into_root() {
    // root -> and[x, y]
    let mut tree = QueryTree::new();
    let root = tree.root_id();
    let and = operator(OperatorKind::And, vec![condition("x"), condition("y")]);
    let and_id = tree.add_operand(root, and).unwrap();

    assert!(!tree.can_flatten(and_id));
    assert_eq!(
        tree.flatten(and_id, root),
        Err(EditError::FlattenNotAllowed(and_id))
    );
    assert_eq!(tree.main_block().unwrap().id(), and_id);

    let y = operand_ids(&tree, and_id)[1];
    tree.remove_operand(and_id, y).unwrap();
    let x = operand_ids(&tree, and_id)[0];
    assert!(tree.can_flatten(and_id));
    tree.flatten(and_id, root).unwrap();
    assert_eq!(operand_ids(&tree, root), vec![x]);
}

#[test]
fn test_flatten_empty_operator_into_root() {
    let mut tree = QueryTree::new();
    let root = tree.root_id();
    let empty_id = tree
        .add_operand(root, operator(OperatorKind::Or, vec![]))
        .unwrap();

    assert!(tree.can_flatten(empty_id));
    tree.flatten(empty_id, root).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_flatten_empty_operator_is_removal() {
    let (mut tree, and_id, ids) = and_tree();
    let empty = operator(OperatorKind::Or, vec![]);
    let empty_id = tree.add_operand(and_id, empty).unwrap();
    assert!(tree.can_flatten(empty_id));
    tree.flatten(empty_id, and_id).unwrap();
    assert_eq!(operand_ids(&tree, and_id), ids);
}

#[test]
fn test_flatten_condition_is_rejected() {
    let (mut tree, and_id, ids) = and_tree();
    assert!(!tree.can_flatten(ids[0]));
    assert_eq!(
        tree.flatten(ids[0], and_id),
        Err(EditError::NotAnOperator(ids[0]))
    );
}

#[test]
fn test_deep_clone() {
    let original = operator(
        OperatorKind::And,
        vec![
            condition("a"),
            operator(OperatorKind::Not, vec![condition("b")]),
        ],
    );
    let copy = original.deep_clone();
    assert!(copy.same_structure(&original));

    let mut original_ids = original.condition_ids();
    original_ids.push(original.id());
    let mut copy_ids = copy.condition_ids();
    copy_ids.push(copy.id());
    assert!(copy_ids.iter().all(|id| !original_ids.contains(id)));
}

#[test]
fn test_same_structure_detects_differences() {
    let a = operator(OperatorKind::And, vec![condition("a")]);
    let b = operator(OperatorKind::Or, vec![condition("a")]);
    let c = operator(OperatorKind::And, vec![condition("b")]);
    assert!(!a.same_structure(&b));
    assert!(!a.same_structure(&c));
    assert!(!a.same_structure(&condition("a")));
}

#[test]
fn test_level() {
    let (mut tree, and_id, ids) = and_tree();
    assert_eq!(condition("a").level(), 1);
    assert_eq!(operator(OperatorKind::Or, vec![]).level(), 1);
    assert_eq!(tree.level(), 2);
    tree.surround(ids[0], and_id, OperatorKind::Not).unwrap();
    assert_eq!(tree.level(), 3);
    assert_eq!(QueryTree::new().level(), 0);
}

#[test]
fn test_condition_ids_and_parent() {
    let (mut tree, and_id, ids) = and_tree();
    let not_id = tree.surround(ids[2], and_id, OperatorKind::Not).unwrap();
    let mut found = tree.main_block().unwrap().condition_ids();
    found.sort();
    assert_eq!(found, ids);
    assert_eq!(tree.parent_of(and_id), Some(tree.root_id()));
    assert_eq!(tree.parent_of(ids[2]), Some(not_id));
    assert_eq!(tree.parent_of(tree.root_id()), None);
}

#[test]
fn test_condition_well_formed() {
    let registry = ComparatorRegistry::default();
    let property = IndexProperty::new(None, "n", PropertyType::Number, false);
    let mut block = ConditionBlock::new(
        Some(property),
        Some(Comparator::NumberEq),
        Some(ComparatorValue::text("2")),
    );
    assert!(block.is_well_formed(&registry));
    block.value = Some(ComparatorValue::text("two"));
    assert!(!block.is_well_formed(&registry));
    block.value = None;
    assert!(!block.is_well_formed(&registry));
    let empty = ConditionBlock::new(None, None, None);
    assert!(!empty.is_well_formed(&registry));
}

#[test]
fn test_find_condition_mut() {
    let (mut tree, _, ids) = and_tree();
    let changed = Some(ComparatorValue::text("changed"));
    tree.find_condition_mut(ids[1]).unwrap().value = changed;
    assert_eq!(
        tree.find_condition(ids[1]).unwrap().value,
        Some(ComparatorValue::text("changed"))
    );
    assert!(tree.find_condition_mut(tree.root_id()).is_none());
}
