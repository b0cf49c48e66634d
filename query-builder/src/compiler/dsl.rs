//! Typed subset of the Elasticsearch query DSL produced by the compiler.

use crate::compiler::params::SortDirection;
use crate::errors::QueryBuilderError;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EsQuery {
    Bool(BoolQuery),
    Term(BTreeMap<String, TermQuery>),
    Range(BTreeMap<String, RangeQuery>),
    SimpleQueryString(SimpleQueryString),
    MultiMatch(MultiMatch),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolQuery {
    Must(Vec<EsQuery>),
    Should(Vec<EsQuery>),
    MustNot(Vec<EsQuery>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermQuery {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RangeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleQueryString {
    pub query: String,
    pub fields: Vec<String>,
    pub default_operator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiMatch {
    pub query: String,
    #[serde(rename = "type")]
    pub match_type: String,
    pub fields: Vec<String>,
}

impl EsQuery {
    pub fn term(field: &str, value: &str) -> Self {
        EsQuery::Term(BTreeMap::from([(
            field.to_string(),
            TermQuery {
                value: value.to_string(),
            },
        )]))
    }

    pub fn range(field: &str, range: RangeQuery) -> Self {
        EsQuery::Range(BTreeMap::from([(field.to_string(), range)]))
    }
}

/// Complete search request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<EsQuery>,
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,
    pub sort: Vec<BTreeMap<String, SortDirection>>,
    pub from: u64,
    pub size: u64,
}

impl QueryDocument {
    pub fn to_json(&self) -> Result<serde_json::Value, QueryBuilderError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, QueryBuilderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
