//! Session configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields a working configuration:
//!
//! ```yaml
//! page_size: 25
//! sort_direction: asc
//! space_field: __onedata.spaceId
//! any_property_fields: ["*", "__onedata.*"]
//! utc_offset_minutes: 120   # omit to use the local timezone
//! ```

use crate::compiler::SortDirection;
use crate::errors::QueryBuilderError;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Prefix of the metadata fields the indexing side adds to every document.
pub const RESERVED_PREFIX: &str = "__onedata";

/// Field holding the id of the space a document belongs to.
pub const SPACE_ID_FIELD: &str = "__onedata.spaceId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryBuilderConfig {
    pub page_size: u64,
    pub sort_direction: SortDirection,
    pub space_field: String,
    pub any_property_fields: Vec<String>,
    pub utc_offset_minutes: Option<i32>,
}

impl Default for QueryBuilderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_direction: SortDirection::Desc,
            space_field: SPACE_ID_FIELD.to_string(),
            // Reserved fields start with an underscore and are skipped by
            // the `*` wildcard, so they have to be listed separately.
            any_property_fields: vec!["*".to_string(), format!("{}.*", RESERVED_PREFIX)],
            utc_offset_minutes: None,
        }
    }
}

impl QueryBuilderConfig {
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self, QueryBuilderError> {
        if yaml_str.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml_ng::from_str(yaml_str)?;
        Ok(config.sanitized())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QueryBuilderError> {
        let yaml_str = fs_err::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&yaml_str)?;
        debug!(
            "Loaded query builder config from {}",
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn timezone(&self) -> ViewerTimezone {
        match self.utc_offset_minutes {
            Some(minutes) => ViewerTimezone::from_offset_minutes(minutes),
            None => ViewerTimezone::Local,
        }
    }

    fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            warn!(
                "page_size must be positive, falling back to {}",
                DEFAULT_PAGE_SIZE
            );
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }
}

/// Timezone of the person building the query. Date conditions are expressed
/// on this wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerTimezone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl ViewerTimezone {
    pub fn from_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes.saturating_mul(60)) {
            Some(offset) => ViewerTimezone::Fixed(offset),
            None => {
                warn!(
                    "UTC offset of {} minutes is out of range, using UTC",
                    minutes
                );
                ViewerTimezone::Fixed(Utc.fix())
            }
        }
    }

    /// Wall-clock reading of `instant` in this timezone.
    pub fn to_local_naive(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            ViewerTimezone::Local => instant.with_timezone(&Local).naive_local(),
            ViewerTimezone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// Instant shown as `naive` on this wall clock. For wall-clock times that
    /// occur twice (DST fall-back) the earlier instant wins; times skipped by a
    /// DST jump yield `None`.
    pub fn from_local_naive(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ViewerTimezone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            ViewerTimezone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn start_of_today(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.to_local_naive(&now)
            .date()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| self.from_local_naive(&midnight))
            .unwrap_or(now)
    }
}
