use serde::{Deserialize, Serialize};

const NUMBER_TYPES: [&str; 8] = [
    "long",
    "integer",
    "short",
    "byte",
    "double",
    "float",
    "half_float",
    "scaled_float",
];

/// Normalized type of an index property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Text,
    Number,
    Keyword,
    Date,
    Boolean,
    Object,
    Space,
    AnyProperty,
    Other(String),
}

impl PropertyType {
    /// Type of a mapping entry. Entries without a `type` describe objects.
    pub fn from_mapping_type(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => PropertyType::from(raw),
            None => PropertyType::Object,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Number => "number",
            PropertyType::Keyword => "keyword",
            PropertyType::Date => "date",
            PropertyType::Boolean => "boolean",
            PropertyType::Object => "object",
            PropertyType::Space => "space",
            PropertyType::AnyProperty => "anyProperty",
            PropertyType::Other(raw) => raw,
        }
    }

    /// Whether properties of this type (or nested in a property of this type)
    /// can be used in conditions.
    pub fn is_query_supported(&self) -> bool {
        !matches!(self, PropertyType::Other(_))
    }

    pub fn is_sortable(&self) -> bool {
        matches!(
            self,
            PropertyType::Keyword
                | PropertyType::Boolean
                | PropertyType::Date
                | PropertyType::Number
        )
    }
}

impl From<&str> for PropertyType {
    fn from(raw: &str) -> Self {
        match raw {
            "text" => PropertyType::Text,
            "number" => PropertyType::Number,
            "keyword" => PropertyType::Keyword,
            "date" => PropertyType::Date,
            "boolean" => PropertyType::Boolean,
            "object" => PropertyType::Object,
            "space" => PropertyType::Space,
            "anyProperty" => PropertyType::AnyProperty,
            raw if NUMBER_TYPES.contains(&raw) => PropertyType::Number,
            raw => PropertyType::Other(raw.to_string()),
        }
    }
}

impl From<String> for PropertyType {
    fn from(raw: String) -> Self {
        PropertyType::from(raw.as_str())
    }
}

impl From<PropertyType> for String {
    fn from(property_type: PropertyType) -> Self {
        property_type.as_str().to_string()
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a property comes from. Only `Real` properties exist in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Real,
    Space,
    AnyProperty,
}

/// A property (or multi-field) of the index, or one of the synthetic
/// pseudo-properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProperty {
    pub name: String,
    pub path: String,
    pub property_type: PropertyType,
    pub kind: PropertyKind,
    pub is_field: bool,
    pub parent_path: Option<String>,
}

impl IndexProperty {
    pub fn new(
        parent: Option<&IndexProperty>,
        name: &str,
        property_type: PropertyType,
        is_field: bool,
    ) -> Self {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent.path, name),
            None => name.to_string(),
        };
        Self {
            name: name.to_string(),
            path,
            property_type,
            kind: PropertyKind::Real,
            is_field,
            parent_path: parent.map(|parent| parent.path.clone()),
        }
    }

    /// Matches a phrase in any field of the document.
    pub fn any_property() -> Self {
        Self {
            name: "__anyProperty".to_string(),
            // not a real path, only a label
            path: "any property".to_string(),
            property_type: PropertyType::AnyProperty,
            kind: PropertyKind::AnyProperty,
            is_field: false,
            parent_path: None,
        }
    }

    /// Space the document belongs to.
    pub fn space() -> Self {
        Self {
            name: "__onedata.space".to_string(),
            path: "space".to_string(),
            property_type: PropertyType::Space,
            kind: PropertyKind::Space,
            is_field: false,
            parent_path: None,
        }
    }

    pub fn is_real(&self) -> bool {
        self.kind == PropertyKind::Real
    }
}
