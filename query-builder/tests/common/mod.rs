//! Shared fixtures for the query-builder integration tests

#![allow(dead_code)]

use query_builder::{IndexSchema, QueryBuilder, QueryBuilderConfig, Space};
use serde_json::{json, Value};

/// Mapping of a small index of annotated files
pub fn sample_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "title": {
                    "type": "text",
                    "fields": {"raw": {"type": "keyword"}}
                },
                "published": {"type": "boolean"},
                "pages": {"type": "integer"},
                "created": {"type": "date"},
                "author": {
                    "properties": {
                        "name": {"type": "keyword"}
                    }
                },
                "__onedata": {
                    "properties": {
                        "spaceId": {"type": "keyword"},
                        "fileName": {"type": "text"}
                    }
                }
            }
        }
    })
}

pub fn sample_schema() -> IndexSchema {
    IndexSchema::from_mapping(&sample_mapping()).unwrap()
}

pub fn sample_spaces() -> Vec<Space> {
    vec![
        Space::new("space1", "Projects"),
        Space::new("space2", "Archive"),
    ]
}

/// Session on a UTC+1 wall clock, so date results do not depend on the host
pub fn test_builder() -> QueryBuilder {
    init_logger();
    let config = QueryBuilderConfig {
        utc_offset_minutes: Some(60),
        ..QueryBuilderConfig::default()
    };
    QueryBuilder::new(config, sample_spaces())
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
