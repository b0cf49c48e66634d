//! Translation of a block tree into an Elasticsearch search request.
//!
//! Compilation never fails. Conditions that are incomplete, or whose value
//! does not fit their comparator, produce no clause and are left out of the
//! enclosing operator.

mod dates;
mod dsl;
mod params;

pub use dates::{date_bounds, DateBounds};
pub use dsl::{
    BoolQuery, EsQuery, MultiMatch, QueryDocument, RangeQuery, SimpleQueryString, TermQuery,
};
pub use params::{Pagination, SortDirection, SortSpec};

use crate::block::{ConditionBlock, OperatorBlock, OperatorKind, QueryBlock};
use crate::config::{QueryBuilderConfig, ViewerTimezone};
use crate::properties_tree::PropertiesTree;
use crate::registry::{Comparator, ComparatorValue, RangeOperator};
use log::{debug, warn};
use std::collections::BTreeMap;

const EPOCH_MILLIS_FORMAT: &str = "epoch_millis";

pub struct QueryCompiler<'a> {
    config: &'a QueryBuilderConfig,
    timezone: ViewerTimezone,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(config: &'a QueryBuilderConfig) -> Self {
        Self {
            config,
            timezone: config.timezone(),
        }
    }

    /// Builds the request for `root`. `visible` restricts the returned
    /// `_source` to its leaf paths.
    pub fn compile(
        &self,
        root: &OperatorBlock,
        visible: Option<&PropertiesTree>,
        sort: &SortSpec,
        pagination: &Pagination,
    ) -> QueryDocument {
        let query = self.convert_operator(root);
        if query.is_none() {
            debug!("Query has no conditions, matching all documents");
        }

        let source = visible
            .map(PropertiesTree::leaf_paths)
            .filter(|paths| !paths.is_empty());
        if let Some(property) = sort.property.as_ref().filter(|p| !p.is_real()) {
            warn!("Cannot sort by {}, sorting by score", property.path);
        }

        QueryDocument {
            query,
            source,
            sort: vec![BTreeMap::from([(sort.field().to_string(), sort.direction)])],
            from: pagination.offset(),
            size: pagination.size(),
        }
    }

    pub fn convert_block(&self, block: &QueryBlock) -> Option<EsQuery> {
        match block {
            QueryBlock::Condition(condition) => self.convert_condition(condition),
            QueryBlock::Operator(operator) => self.convert_operator(operator),
        }
    }

    fn convert_operator(&self, operator: &OperatorBlock) -> Option<EsQuery> {
        let clauses = || -> Vec<EsQuery> {
            operator
                .operands()
                .iter()
                .filter_map(|operand| self.convert_block(operand))
                .collect()
        };
        match operator.kind() {
            OperatorKind::Root => operator
                .operands()
                .first()
                .and_then(|operand| self.convert_block(operand)),
            OperatorKind::And => Some(EsQuery::Bool(BoolQuery::Must(clauses()))),
            OperatorKind::Or => Some(EsQuery::Bool(BoolQuery::Should(clauses()))),
            OperatorKind::Not => Some(EsQuery::Bool(BoolQuery::MustNot(clauses()))),
        }
    }

    fn convert_condition(&self, condition: &ConditionBlock) -> Option<EsQuery> {
        let (Some(property), Some(comparator), Some(value)) =
            (&condition.property, condition.comparator, &condition.value)
        else {
            debug!("Skipping incomplete condition {}", condition.id());
            return None;
        };
        let path = property.path.as_str();

        let query = match (comparator, value) {
            (Comparator::BooleanIs | Comparator::KeywordIs, ComparatorValue::Text(text)) => {
                Some(EsQuery::term(path, text))
            }
            (Comparator::TextContains, ComparatorValue::Text(text)) => {
                Some(EsQuery::SimpleQueryString(SimpleQueryString {
                    query: text.clone(),
                    fields: vec![path.to_string()],
                    default_operator: "and".to_string(),
                }))
            }
            (Comparator::AnyPropertyHasPhrase, ComparatorValue::Text(text)) => {
                Some(EsQuery::MultiMatch(MultiMatch {
                    query: text.clone(),
                    match_type: "phrase".to_string(),
                    fields: self.config.any_property_fields.clone(),
                }))
            }
            (Comparator::SpaceIs, ComparatorValue::Space(space)) => {
                Some(EsQuery::term(&self.config.space_field, &space.id))
            }
            (
                Comparator::NumberEq
                | Comparator::NumberLt
                | Comparator::NumberLte
                | Comparator::NumberGt
                | Comparator::NumberGte,
                ComparatorValue::Text(text),
            ) => comparator
                .range_operator()
                .zip(parse_number(text))
                .map(|(operator, number)| {
                    EsQuery::range(path, number_range(operator, number))
                }),
            (
                Comparator::DateEq
                | Comparator::DateLt
                | Comparator::DateLte
                | Comparator::DateGt
                | Comparator::DateGte,
                ComparatorValue::Date(date),
            ) => comparator.range_operator().map(|operator| {
                let bounds = date_bounds(date, &self.timezone);
                EsQuery::range(path, date_range(operator, bounds))
            }),
            _ => None,
        };

        if query.is_none() {
            warn!(
                "Value of condition {} does not fit comparator {}, skipping",
                condition.id(),
                comparator
            );
        }
        query
    }
}

/// Whole numbers become JSON integers, `2` rather than `2.0`.
fn parse_number(text: &str) -> Option<serde_json::Number> {
    let number: f64 = text.trim().parse().ok()?;
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(serde_json::Number::from(number as i64))
    } else {
        serde_json::Number::from_f64(number)
    }
}

fn number_range(operator: RangeOperator, number: serde_json::Number) -> RangeQuery {
    let mut range = RangeQuery::default();
    match operator {
        RangeOperator::Eq => {
            range.lte = Some(number.clone());
            range.gte = Some(number);
        }
        RangeOperator::Lt => range.lt = Some(number),
        RangeOperator::Lte => range.lte = Some(number),
        RangeOperator::Gt => range.gt = Some(number),
        RangeOperator::Gte => range.gte = Some(number),
    }
    range
}

/// Strict bounds exclude the whole day (or second) the value points at,
/// inclusive ones include it.
fn date_range(operator: RangeOperator, bounds: DateBounds) -> RangeQuery {
    let start = serde_json::Number::from(bounds.start_ms);
    let end = serde_json::Number::from(bounds.end_ms);
    let mut range = RangeQuery {
        format: Some(EPOCH_MILLIS_FORMAT.to_string()),
        ..RangeQuery::default()
    };
    match operator {
        RangeOperator::Eq => {
            range.lte = Some(end);
            range.gte = Some(start);
        }
        RangeOperator::Lt => range.lt = Some(start),
        RangeOperator::Lte => range.lte = Some(end),
        RangeOperator::Gt => range.gt = Some(end),
        RangeOperator::Gte => range.gte = Some(start),
    }
    range
}
