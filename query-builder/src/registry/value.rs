use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub name: String,
}

impl Space {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Value of a date condition. With `time_enabled` unset only the day part of
/// `datetime` (on the viewer's wall clock) is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateValue {
    pub datetime: DateTime<Utc>,
    pub time_enabled: bool,
}

/// Value held by a condition: plain string for boolean, text, number, keyword
/// and phrase comparators; structured for dates and spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComparatorValue {
    Text(String),
    Date(DateValue),
    Space(Space),
}

impl ComparatorValue {
    pub fn text(value: &str) -> Self {
        ComparatorValue::Text(value.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ComparatorValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            ComparatorValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_space(&self) -> Option<&Space> {
        match self {
            ComparatorValue::Space(space) => Some(space),
            _ => None,
        }
    }
}

/// Raw event coming from a value editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    /// Text typed or a plain dropdown option chosen
    Text(String),
    Datetime(DateTime<Utc>),
    TimeEnabled(bool),
    Space(Space),
}

/// Applies an editor event to the value currently being edited.
///
/// A picked datetime keeps the current `time_enabled` flag and a toggled flag
/// keeps the current datetime. Toggling time with no date value yields `None`.
pub fn normalize_input(
    current: Option<&ComparatorValue>,
    input: EditorInput,
) -> Option<ComparatorValue> {
    let current_date = current.and_then(ComparatorValue::as_date);
    match input {
        EditorInput::Text(text) => Some(ComparatorValue::Text(text)),
        EditorInput::Space(space) => Some(ComparatorValue::Space(space)),
        EditorInput::Datetime(datetime) => Some(ComparatorValue::Date(DateValue {
            datetime,
            time_enabled: current_date.is_some_and(|date| date.time_enabled),
        })),
        EditorInput::TimeEnabled(time_enabled) => current_date.map(|date| {
            ComparatorValue::Date(DateValue {
                datetime: date.datetime,
                time_enabled,
            })
        }),
    }
}
