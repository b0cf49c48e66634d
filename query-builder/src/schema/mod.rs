//! Typed view of an index mapping.
//!
//! The mapping is read once into a tree of [`PropertyNode`]s. Multi-fields
//! (`fields`) become children of the property they belong to, next to its
//! nested `properties`. The reserved space id entry is replaced by the
//! synthetic [`IndexProperty::space`].

mod types;

pub use types::{IndexProperty, PropertyKind, PropertyType};

use crate::config::RESERVED_PREFIX;
use crate::errors::QueryBuilderError;
use crate::properties_tree::PropertiesTree;
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub property: IndexProperty,
    pub children: BTreeMap<String, PropertyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    properties: BTreeMap<String, PropertyNode>,
    properties_tree: PropertiesTree,
    any_property: IndexProperty,
    space: IndexProperty,
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::empty()
    }
}

impl IndexSchema {
    /// Schema with the synthetic properties only.
    pub fn empty() -> Self {
        Self {
            properties: BTreeMap::new(),
            properties_tree: PropertiesTree::new(),
            any_property: IndexProperty::any_property(),
            space: IndexProperty::space(),
        }
    }

    pub fn from_json_str(json_str: &str) -> Result<Self, QueryBuilderError> {
        let raw: Value = serde_json::from_str(json_str)?;
        Self::from_mapping(&raw)
    }

    /// Builds the schema from a raw mapping document (`{"mappings": {"properties": ...}}`).
    pub fn from_mapping(raw: &Value) -> Result<Self, QueryBuilderError> {
        let raw_properties = match raw.get("mappings").and_then(|m| m.get("properties")) {
            None | Some(Value::Null) => {
                debug!("Mapping has no properties");
                return Ok(Self::empty());
            }
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(QueryBuilderError::InvalidMapping(
                    "mappings.properties is not an object".to_string(),
                ))
            }
        };

        let properties_tree = tree_from_raw(raw_properties);

        let mut raw_properties = raw_properties.clone();
        remove_space_id(&mut raw_properties);
        let properties = parse_properties(None, Some(&raw_properties), None)?;
        debug!(
            "Parsed index mapping with {} top-level properties",
            properties.len()
        );

        Ok(Self {
            properties,
            properties_tree,
            ..Self::empty()
        })
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyNode> {
        &self.properties
    }

    pub fn any_property(&self) -> &IndexProperty {
        &self.any_property
    }

    pub fn space(&self) -> &IndexProperty {
        &self.space
    }

    /// Looks a property up by its path, synthetic ones included.
    pub fn property(&self, path: &str) -> Option<&IndexProperty> {
        self.flattened_properties()
            .into_iter()
            .find(|property| property.path == path)
    }

    /// Real properties depth-first in name order, then the synthetic ones.
    pub fn flattened_properties(&self) -> Vec<&IndexProperty> {
        self.walk()
            .into_iter()
            .map(|(property, _)| property)
            .chain([&self.any_property, &self.space])
            .collect()
    }

    /// Properties that can be used in conditions: synthetic ones first, then
    /// ordinary real properties, then real properties starting with `_`.
    /// Each group is sorted by path.
    pub fn queryable_properties(&self) -> Vec<&IndexProperty> {
        let mut supported: Vec<&IndexProperty> = self
            .walk()
            .into_iter()
            .filter(|(property, chain_supported)| {
                *chain_supported && property.property_type != PropertyType::Object
            })
            .map(|(property, _)| property)
            .chain([&self.any_property, &self.space])
            .collect();
        supported.sort_by(|a, b| a.path.cmp(&b.path));

        let (mut ordered, real): (Vec<_>, Vec<_>) =
            supported.into_iter().partition(|p| !p.is_real());
        let (internal, ordinary): (Vec<_>, Vec<_>) =
            real.into_iter().partition(|p| p.path.starts_with('_'));

        ordered.extend(ordinary);
        ordered.extend(internal);
        ordered
    }

    /// Real properties the results can be sorted by, in path order.
    pub fn sortable_properties(&self) -> Vec<&IndexProperty> {
        let mut sortable: Vec<&IndexProperty> = self
            .walk()
            .into_iter()
            .map(|(property, _)| property)
            .filter(|property| property.property_type.is_sortable())
            .collect();
        sortable.sort_by(|a, b| a.path.cmp(&b.path));
        sortable
    }

    /// Shape of the mapped documents. Multi-fields are not part of it.
    pub fn properties_tree(&self) -> &PropertiesTree {
        &self.properties_tree
    }

    /// Pre-order walk over real properties. The flag tells whether the
    /// property and all of its ancestors have a supported type.
    fn walk(&self) -> Vec<(&IndexProperty, bool)> {
        let mut visited = Vec::new();
        let mut stack: Vec<(&PropertyNode, bool)> = Vec::new();
        stack.extend(self.properties.values().rev().map(|node| (node, true)));

        while let Some((node, parent_supported)) = stack.pop() {
            let supported = parent_supported && node.property.property_type.is_query_supported();
            visited.push((&node.property, supported));
            for child in node.children.values().rev() {
                stack.push((child, supported));
            }
        }
        visited
    }
}

fn remove_space_id(raw_properties: &mut Map<String, Value>) {
    let Some(Value::Object(reserved)) = raw_properties.get_mut(RESERVED_PREFIX) else {
        return;
    };
    let Some(Value::Object(nested)) = reserved.get_mut("properties") else {
        return;
    };
    if nested.remove("spaceId").is_some() && nested.is_empty() {
        raw_properties.remove(RESERVED_PREFIX);
    }
}

fn parse_properties(
    parent: Option<&IndexProperty>,
    raw_properties: Option<&Map<String, Value>>,
    raw_fields: Option<&Map<String, Value>>,
) -> Result<BTreeMap<String, PropertyNode>, QueryBuilderError> {
    let mut nodes = BTreeMap::new();
    let entries = raw_properties
        .into_iter()
        .flatten()
        .map(|entry| (entry, false))
        .chain(raw_fields.into_iter().flatten().map(|entry| (entry, true)));

    // Fields come last so they win over a property of the same name.
    for ((name, definition), is_field) in entries {
        let node = parse_property(parent, name, definition, is_field)?;
        nodes.insert(name.clone(), node);
    }
    Ok(nodes)
}

fn parse_property(
    parent: Option<&IndexProperty>,
    name: &str,
    definition: &Value,
    is_field: bool,
) -> Result<PropertyNode, QueryBuilderError> {
    let path = match parent {
        Some(parent) => format!("{}.{}", parent.path, name),
        None => name.to_string(),
    };
    let definition = definition.as_object().ok_or_else(|| {
        QueryBuilderError::InvalidMapping(format!("definition of {} is not an object", path))
    })?;

    let raw_type = match definition.get("type") {
        None => None,
        Some(Value::String(raw_type)) => Some(raw_type.as_str()),
        Some(_) => {
            return Err(QueryBuilderError::InvalidMapping(format!(
                "type of {} is not a string",
                path
            )))
        }
    };

    let property = IndexProperty::new(
        parent,
        name,
        PropertyType::from_mapping_type(raw_type),
        is_field,
    );
    let children = parse_properties(
        Some(&property),
        nested_object(definition, "properties", &path)?,
        nested_object(definition, "fields", &path)?,
    )?;

    Ok(PropertyNode { property, children })
}

fn nested_object<'a>(
    definition: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a Map<String, Value>>, QueryBuilderError> {
    match definition.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(QueryBuilderError::InvalidMapping(format!(
            "{} of {} is not an object",
            key, path
        ))),
    }
}

fn tree_from_raw(raw_properties: &Map<String, Value>) -> PropertiesTree {
    let mut tree = PropertiesTree::new();
    let mut stack: Vec<(&Map<String, Value>, Vec<&str>)> = vec![(raw_properties, Vec::new())];

    while let Some((properties, prefix)) = stack.pop() {
        for (name, definition) in properties {
            let mut target = &mut tree;
            for segment in &prefix {
                target = target.entry(segment);
            }
            target.entry(name);

            if let Some(Value::Object(nested)) = definition.get("properties") {
                let mut nested_prefix = prefix.clone();
                nested_prefix.push(name.as_str());
                stack.push((nested, nested_prefix));
            }
        }
    }
    tree
}
