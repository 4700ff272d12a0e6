//! Free-text teacher unavailability parsing.
//!
//! Roster entries look like `"Mon 09:00-12:00"`, sometimes wrapped in
//! list-like punctuation by upstream exports. Each entry either parses to a
//! (day, blocked slot range) pair or fails with a specific reason; failures
//! are logged and skipped so one bad entry never hides the rest of a
//! teacher's constraints.

use crate::data::TeacherRow;
use crate::grid::{Day, TimeGrid};
use log::warn;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;

/// Day -> blocked slot indices, for one teacher.
pub type BlockedSlots = HashMap<Day, HashSet<usize>>;

/// Why one unavailability entry was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("no '<Day> <HH:MM>-<HH:MM>' interval found in {entry:?}")]
    NoIntervalFound { entry: String },
    #[error("unknown day {token:?}")]
    UnknownDay { token: String },
    #[error("time {token:?} does not start a grid slot")]
    UnknownTime { token: String },
    #[error("interval end {end:?} does not lie after start {start:?}")]
    EmptyInterval { start: String, end: String },
}

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]{3})\s+(\d{1,2}[:.]\d{2})\s*-\s*(\d{1,2}[:.]\d{2})").unwrap()
});

/// Parses a single entry into the day and the half-open slot range it blocks.
pub fn parse_entry(entry: &str, grid: &TimeGrid) -> Result<(Day, Range<usize>), AvailabilityError> {
    let cleaned: String = entry
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect();

    let caps = INTERVAL_RE
        .captures(&cleaned)
        .ok_or_else(|| AvailabilityError::NoIntervalFound {
            entry: entry.to_string(),
        })?;

    let day = Day::from_abbrev(&caps[1]).ok_or_else(|| AvailabilityError::UnknownDay {
        token: caps[1].to_string(),
    })?;
    let start = grid
        .index_for_time(&caps[2])
        .ok_or_else(|| AvailabilityError::UnknownTime {
            token: caps[2].to_string(),
        })?;
    let end = grid
        .index_for_time(&caps[3])
        .ok_or_else(|| AvailabilityError::UnknownTime {
            token: caps[3].to_string(),
        })?;

    if start >= end {
        return Err(AvailabilityError::EmptyInterval {
            start: caps[2].to_string(),
            end: caps[3].to_string(),
        });
    }
    Ok((day, start..end))
}

/// Best-effort accumulation of one teacher's entries. An empty entry list
/// yields an empty map, i.e. a fully available teacher.
pub fn blocked_slots(teacher_id: &str, entries: &[String], grid: &TimeGrid) -> BlockedSlots {
    let mut blocked: BlockedSlots = HashMap::new();
    for entry in entries {
        match parse_entry(entry, grid) {
            Ok((day, range)) => {
                blocked.entry(day).or_default().extend(range);
            }
            Err(e) => warn!("skipping unavailability entry for teacher {teacher_id}: {e}"),
        }
    }
    blocked
}

/// Blocked-slot maps for the whole roster, keyed by teacher id.
pub fn availability_map(teachers: &[TeacherRow], grid: &TimeGrid) -> HashMap<String, BlockedSlots> {
    teachers
        .iter()
        .map(|t| {
            (
                t.teacher_id.trim().to_string(),
                blocked_slots(&t.teacher_id, &t.unavailable_times, grid),
            )
        })
        .collect()
}
