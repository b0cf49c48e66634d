//! Comparators available per property type, together with their default
//! values, validators, editors and presenters.

mod comparator;
mod value;

pub use comparator::{Comparator, RangeOperator};
pub use value::{normalize_input, ComparatorValue, DateValue, EditorInput, Space};

use crate::config::ViewerTimezone;
use crate::schema::PropertyType;
use log::debug;

/// Tells whether a condition value is acceptable for a comparator
pub type Validator = fn(Option<&ComparatorValue>) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Dropdown,
    Text,
    Datetime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOption {
    Text(String),
    Space(Space),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSpec {
    pub kind: EditorKind,
    pub options: Vec<EditorOption>,
    pub initially_focused: bool,
}

/// How a committed value is rendered outside of edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterKind {
    Raw,
    String,
    Datetime,
    Space,
}

const BOOLEAN_COMPARATORS: &[Comparator] = &[Comparator::BooleanIs];
const TEXT_COMPARATORS: &[Comparator] = &[Comparator::TextContains];
const NUMBER_COMPARATORS: &[Comparator] = &[
    Comparator::NumberEq,
    Comparator::NumberLt,
    Comparator::NumberLte,
    Comparator::NumberGt,
    Comparator::NumberGte,
];
const KEYWORD_COMPARATORS: &[Comparator] = &[Comparator::KeywordIs];
const DATE_COMPARATORS: &[Comparator] = &[
    Comparator::DateEq,
    Comparator::DateLt,
    Comparator::DateLte,
    Comparator::DateGt,
    Comparator::DateGte,
];
const SPACE_COMPARATORS: &[Comparator] = &[Comparator::SpaceIs];
const ANY_PROPERTY_COMPARATORS: &[Comparator] = &[Comparator::AnyPropertyHasPhrase];

const BOOLEAN_OPTIONS: [&str; 2] = ["true", "false"];

/// Lookup tables of one editing session. The space list is kept here and
/// shared by every space editor and default value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparatorRegistry {
    spaces: Vec<Space>,
    timezone: ViewerTimezone,
}

impl ComparatorRegistry {
    pub fn new(spaces: Vec<Space>, timezone: ViewerTimezone) -> Self {
        Self { spaces, timezone }
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn set_spaces(&mut self, spaces: Vec<Space>) {
        debug!("Space list updated, {} space(s)", spaces.len());
        self.spaces = spaces;
    }

    pub fn timezone(&self) -> ViewerTimezone {
        self.timezone
    }

    pub fn comparators_for(&self, property_type: &PropertyType) -> &'static [Comparator] {
        match property_type {
            PropertyType::Boolean => BOOLEAN_COMPARATORS,
            PropertyType::Text => TEXT_COMPARATORS,
            PropertyType::Number => NUMBER_COMPARATORS,
            PropertyType::Keyword => KEYWORD_COMPARATORS,
            PropertyType::Date => DATE_COMPARATORS,
            PropertyType::Space => SPACE_COMPARATORS,
            PropertyType::AnyProperty => ANY_PROPERTY_COMPARATORS,
            PropertyType::Object | PropertyType::Other(_) => &[],
        }
    }

    /// Comparator ids for a raw type name, e.g. `"number"`.
    pub fn comparator_ids_for(&self, type_name: &str) -> Vec<&'static str> {
        self.comparators_for(&PropertyType::from(type_name))
            .iter()
            .map(Comparator::id)
            .collect()
    }

    /// Value a condition starts with after choosing `comparator`. `None` only
    /// for `space.is` when no space is known.
    pub fn default_value_for(&self, comparator: Comparator) -> Option<ComparatorValue> {
        match comparator {
            Comparator::BooleanIs => Some(ComparatorValue::text("true")),
            Comparator::DateEq
            | Comparator::DateLt
            | Comparator::DateLte
            | Comparator::DateGt
            | Comparator::DateGte => Some(ComparatorValue::Date(DateValue {
                datetime: self.timezone.start_of_today(),
                time_enabled: false,
            })),
            Comparator::SpaceIs => self.spaces.first().cloned().map(ComparatorValue::Space),
            Comparator::TextContains
            | Comparator::NumberEq
            | Comparator::NumberLt
            | Comparator::NumberLte
            | Comparator::NumberGt
            | Comparator::NumberGte
            | Comparator::KeywordIs
            | Comparator::AnyPropertyHasPhrase => Some(ComparatorValue::text("")),
        }
    }

    pub fn default_value_for_id(&self, comparator_id: &str) -> Option<ComparatorValue> {
        match comparator_id.parse::<Comparator>() {
            Ok(comparator) => self.default_value_for(comparator),
            Err(_) => Some(ComparatorValue::text("")),
        }
    }

    pub fn validator_for(&self, comparator: Comparator) -> Validator {
        match comparator {
            Comparator::BooleanIs => is_valid_boolean,
            Comparator::TextContains | Comparator::KeywordIs | Comparator::AnyPropertyHasPhrase => {
                is_valid_text
            }
            Comparator::NumberEq
            | Comparator::NumberLt
            | Comparator::NumberLte
            | Comparator::NumberGt
            | Comparator::NumberGte => is_valid_number,
            Comparator::DateEq
            | Comparator::DateLt
            | Comparator::DateLte
            | Comparator::DateGt
            | Comparator::DateGte => is_valid_date,
            Comparator::SpaceIs => is_valid_space,
        }
    }

    /// Unknown ids accept every value.
    pub fn validator_for_id(&self, comparator_id: &str) -> Validator {
        match comparator_id.parse::<Comparator>() {
            Ok(comparator) => self.validator_for(comparator),
            Err(_) => accept_any,
        }
    }

    pub fn is_valid(&self, comparator: Comparator, value: Option<&ComparatorValue>) -> bool {
        (self.validator_for(comparator))(value)
    }

    pub fn editor_for(
        &self,
        comparator: Option<Comparator>,
        initially_focused: bool,
    ) -> EditorSpec {
        let (kind, options) = match comparator {
            Some(Comparator::BooleanIs) => (
                EditorKind::Dropdown,
                BOOLEAN_OPTIONS
                    .iter()
                    .map(|option| EditorOption::Text(option.to_string()))
                    .collect(),
            ),
            Some(Comparator::SpaceIs) => (
                EditorKind::Dropdown,
                self.spaces
                    .iter()
                    .cloned()
                    .map(EditorOption::Space)
                    .collect(),
            ),
            Some(comparator) if comparator.property_type() == PropertyType::Date => {
                (EditorKind::Datetime, Vec::new())
            }
            _ => (EditorKind::Text, Vec::new()),
        };
        EditorSpec {
            kind,
            options,
            initially_focused,
        }
    }

    pub fn presenter_for(&self, comparator: Option<Comparator>) -> PresenterKind {
        let Some(comparator) = comparator else {
            return PresenterKind::Raw;
        };
        match comparator.property_type() {
            PropertyType::Text | PropertyType::Keyword | PropertyType::AnyProperty => {
                PresenterKind::String
            }
            PropertyType::Date => PresenterKind::Datetime,
            PropertyType::Space => PresenterKind::Space,
            _ => PresenterKind::Raw,
        }
    }

    /// Text shown for a committed value in view mode.
    pub fn present_value(&self, comparator: Option<Comparator>, value: &ComparatorValue) -> String {
        match (self.presenter_for(comparator), value) {
            (PresenterKind::String, ComparatorValue::Text(text)) => format!("\"{}\"", text),
            (_, ComparatorValue::Date(date)) => {
                let local = self.timezone.to_local_naive(&date.datetime);
                if date.time_enabled {
                    local.format("%Y-%m-%d %H:%M:%S").to_string()
                } else {
                    local.format("%Y-%m-%d").to_string()
                }
            }
            (_, ComparatorValue::Space(space)) => space.name.clone(),
            (_, ComparatorValue::Text(text)) => text.clone(),
        }
    }
}

fn is_valid_boolean(value: Option<&ComparatorValue>) -> bool {
    matches!(value, Some(ComparatorValue::Text(text)) if BOOLEAN_OPTIONS.contains(&text.as_str()))
}

fn is_valid_text(value: Option<&ComparatorValue>) -> bool {
    matches!(value, Some(ComparatorValue::Text(text)) if !text.is_empty())
}

fn is_valid_number(value: Option<&ComparatorValue>) -> bool {
    match value {
        Some(ComparatorValue::Text(text)) => {
            let trimmed = text.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => false,
    }
}

fn is_valid_date(value: Option<&ComparatorValue>) -> bool {
    matches!(value, Some(ComparatorValue::Date(_)))
}

fn is_valid_space(value: Option<&ComparatorValue>) -> bool {
    matches!(
        value,
        Some(ComparatorValue::Space(space)) if !space.id.is_empty() && !space.name.is_empty()
    )
}

fn accept_any(_: Option<&ComparatorValue>) -> bool {
    true
}
