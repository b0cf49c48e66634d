use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nested `name -> subtree` map describing the shape of indexed documents.
/// `{a: {b: {}}, c: {}}` describes the leaf paths `a.b` and `c`.
///
/// Serializes as the bare nested object, so it can be read straight from the
/// JSON the UI keeps for "visible properties".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertiesTree(BTreeMap<String, PropertiesTree>);

impl PropertiesTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&PropertiesTree> {
        self.0.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&String, &PropertiesTree)> {
        self.0.iter()
    }

    /// Returns the subtree under `name`, creating an empty one if needed.
    pub fn entry(&mut self, name: &str) -> &mut PropertiesTree {
        self.0.entry(name.to_string()).or_default()
    }

    pub fn with_child(mut self, name: &str, subtree: PropertiesTree) -> Self {
        self.0.insert(name.to_string(), subtree);
        self
    }

    /// Unions `other` into `self`.
    pub fn merge(&mut self, other: &PropertiesTree) {
        for (name, subtree) in &other.0 {
            self.entry(name).merge(subtree);
        }
    }

    /// Dotted paths of all leaves, in name order.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        let mut stack: Vec<(String, &PropertiesTree)> = self
            .0
            .iter()
            .rev()
            .map(|(name, subtree)| (name.clone(), subtree))
            .collect();

        while let Some((path, node)) = stack.pop() {
            if node.is_empty() {
                paths.push(path);
                continue;
            }
            for (name, child) in node.0.iter().rev() {
                stack.push((format!("{}.{}", path, name), child));
            }
        }
        paths
    }
}
