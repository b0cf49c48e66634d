use crate::config::QueryBuilderConfig;
use crate::schema::IndexProperty;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Unknown directions fall back to descending.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => anyhow::bail!("Unknown sort direction: {}", s),
        }
    }
}

/// What the results are ordered by. Without a property they are ordered by
/// relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub property: Option<IndexProperty>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by_score(direction: SortDirection) -> Self {
        Self {
            property: None,
            direction,
        }
    }

    pub fn by_property(property: IndexProperty, direction: SortDirection) -> Self {
        Self {
            property: Some(property),
            direction,
        }
    }

    /// Field name used in the `sort` clause. Synthetic properties sort by
    /// score.
    pub fn field(&self) -> &str {
        match &self.property {
            Some(property) if property.is_real() => &property.path,
            _ => "_score",
        }
    }
}

/// Window of results to fetch. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_number: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    pub fn first_page(config: &QueryBuilderConfig) -> Self {
        Self::new(1, config.page_size)
    }

    /// Offset of the first result of the page.
    pub fn offset(&self) -> u64 {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }

    pub fn size(&self) -> u64 {
        self.page_size
    }

    pub fn pages_count(&self, total_results: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        total_results.div_ceil(self.page_size)
    }

    /// Clamps `page_number` to the pages available for `total_results`.
    /// With no results the only page is the first one.
    pub fn normalize_page(&self, page_number: u64, total_results: u64) -> u64 {
        page_number.clamp(1, self.pages_count(total_results).max(1))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first_page(&QueryBuilderConfig::default())
    }
}
