//! Parsed search responses.

use crate::config::RESERVED_PREFIX;
use crate::errors::QueryBuilderError;
use crate::properties_tree::PropertiesTree;
use log::debug;
use serde_json::Value;

/// One hit of a search response
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub id: Option<String>,
    pub source: Option<Value>,
    pub file_name: Option<String>,
}

impl QueryResult {
    pub fn from_hit(hit: &Value) -> Self {
        let source = hit
            .get("_source")
            .filter(|source| !source.is_null())
            .cloned();
        let file_name = source
            .as_ref()
            .and_then(|source| source.get(RESERVED_PREFIX))
            .and_then(|reserved| reserved.get("fileName"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            id: hit.get("_id").and_then(Value::as_str).map(str::to_string),
            source,
            file_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    pub results: Vec<QueryResult>,
    pub total_results_count: u64,
}

impl QueryResults {
    /// Reads `hits.hits` and `hits.total.value`. Missing parts give an empty
    /// result set; a missing total falls back to the number of hits.
    pub fn from_response(response: &Value) -> Self {
        let results: Vec<QueryResult> = response
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| hits.iter().map(QueryResult::from_hit).collect())
            .unwrap_or_default();
        let total_results_count = response
            .pointer("/hits/total/value")
            .and_then(Value::as_u64)
            .unwrap_or(results.len() as u64);
        debug!(
            "Parsed {} result(s) out of {}",
            results.len(),
            total_results_count
        );
        Self {
            results,
            total_results_count,
        }
    }

    pub fn from_json_str(json_str: &str) -> Result<Self, QueryBuilderError> {
        let response: Value = serde_json::from_str(json_str)?;
        Ok(Self::from_response(&response))
    }

    /// Union of the shapes of all result sources. Array elements are merged
    /// into the key holding the array.
    pub fn properties_tree(&self) -> PropertiesTree {
        let mut tree = PropertiesTree::new();
        for source in self.results.iter().filter_map(|r| r.source.as_ref()) {
            let mut stack: Vec<(&Value, Vec<&str>)> = vec![(source, Vec::new())];
            while let Some((value, prefix)) = stack.pop() {
                match value {
                    Value::Array(items) => {
                        stack.extend(items.iter().map(|item| (item, prefix.clone())));
                    }
                    Value::Object(map) => {
                        for (key, nested) in map {
                            let mut target = &mut tree;
                            for segment in &prefix {
                                target = target.entry(segment);
                            }
                            target.entry(key);

                            let mut nested_prefix = prefix.clone();
                            nested_prefix.push(key.as_str());
                            stack.push((nested, nested_prefix));
                        }
                    }
                    _ => {}
                }
            }
        }
        tree
    }
}
