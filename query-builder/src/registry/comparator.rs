use crate::schema::PropertyType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A `"type.verb"` comparator usable in a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Comparator {
    BooleanIs,
    TextContains,
    NumberEq,
    NumberLt,
    NumberLte,
    NumberGt,
    NumberGte,
    KeywordIs,
    DateEq,
    DateLt,
    DateLte,
    DateGt,
    DateGte,
    SpaceIs,
    AnyPropertyHasPhrase,
}

/// Bound kind shared by the number and date comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparator {
    pub const ALL: [Comparator; 15] = [
        Comparator::BooleanIs,
        Comparator::TextContains,
        Comparator::NumberEq,
        Comparator::NumberLt,
        Comparator::NumberLte,
        Comparator::NumberGt,
        Comparator::NumberGte,
        Comparator::KeywordIs,
        Comparator::DateEq,
        Comparator::DateLt,
        Comparator::DateLte,
        Comparator::DateGt,
        Comparator::DateGte,
        Comparator::SpaceIs,
        Comparator::AnyPropertyHasPhrase,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Comparator::BooleanIs => "boolean.is",
            Comparator::TextContains => "text.contains",
            Comparator::NumberEq => "number.eq",
            Comparator::NumberLt => "number.lt",
            Comparator::NumberLte => "number.lte",
            Comparator::NumberGt => "number.gt",
            Comparator::NumberGte => "number.gte",
            Comparator::KeywordIs => "keyword.is",
            Comparator::DateEq => "date.eq",
            Comparator::DateLt => "date.lt",
            Comparator::DateLte => "date.lte",
            Comparator::DateGt => "date.gt",
            Comparator::DateGte => "date.gte",
            Comparator::SpaceIs => "space.is",
            Comparator::AnyPropertyHasPhrase => "anyProperty.hasPhrase",
        }
    }

    /// Part of the id after the type, e.g. `lte` for `number.lte`.
    pub fn verb(&self) -> &'static str {
        let id = self.id();
        id.split_once('.').map_or(id, |(_, verb)| verb)
    }

    pub fn property_type(&self) -> PropertyType {
        match self {
            Comparator::BooleanIs => PropertyType::Boolean,
            Comparator::TextContains => PropertyType::Text,
            Comparator::NumberEq
            | Comparator::NumberLt
            | Comparator::NumberLte
            | Comparator::NumberGt
            | Comparator::NumberGte => PropertyType::Number,
            Comparator::KeywordIs => PropertyType::Keyword,
            Comparator::DateEq
            | Comparator::DateLt
            | Comparator::DateLte
            | Comparator::DateGt
            | Comparator::DateGte => PropertyType::Date,
            Comparator::SpaceIs => PropertyType::Space,
            Comparator::AnyPropertyHasPhrase => PropertyType::AnyProperty,
        }
    }

    pub fn range_operator(&self) -> Option<RangeOperator> {
        match self {
            Comparator::NumberEq | Comparator::DateEq => Some(RangeOperator::Eq),
            Comparator::NumberLt | Comparator::DateLt => Some(RangeOperator::Lt),
            Comparator::NumberLte | Comparator::DateLte => Some(RangeOperator::Lte),
            Comparator::NumberGt | Comparator::DateGt => Some(RangeOperator::Gt),
            Comparator::NumberGte | Comparator::DateGte => Some(RangeOperator::Gte),
            _ => None,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Comparator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Comparator::ALL.iter().find(|c| c.id() == s) {
            Some(comparator) => Ok(*comparator),
            None => anyhow::bail!("Unknown comparator: {}", s),
        }
    }
}

impl TryFrom<String> for Comparator {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Comparator> for String {
    fn from(comparator: Comparator) -> Self {
        comparator.id().to_string()
    }
}
