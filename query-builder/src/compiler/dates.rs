use crate::config::ViewerTimezone;
use crate::registry::DateValue;
use chrono::{NaiveTime, SubsecRound};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const SECOND_MS: i64 = 1000;

/// First and last millisecond of the day (or second, with time enabled) a
/// date value points at.
///
/// Both are readings of the viewer's wall clock encoded as if that wall clock
/// were UTC, which is what the indexed dates look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub start_ms: i64,
    pub end_ms: i64,
}

pub fn date_bounds(value: &DateValue, timezone: &ViewerTimezone) -> DateBounds {
    let local = timezone.to_local_naive(&value.datetime);
    let (start, length_ms) = if value.time_enabled {
        (local.trunc_subsecs(0), SECOND_MS)
    } else {
        (local.date().and_time(NaiveTime::MIN), DAY_MS)
    };
    let start_ms = start.and_utc().timestamp_millis();
    DateBounds {
        start_ms,
        end_ms: start_ms + length_ms - 1,
    }
}
