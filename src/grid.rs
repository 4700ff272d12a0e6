use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Weekdays of the scheduling grid, in timetable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }

    /// Matches the first three letters of `text`, case-insensitively, so both
    /// "Mon" and "monday" resolve to [`Day::Mon`].
    pub fn from_abbrev(text: &str) -> Option<Day> {
        let abbrev: String = text.trim().chars().take(3).collect();
        Day::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(&abbrev))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters of the weekly slot grid. All fields are minutes since midnight
/// except `slot_minutes`, the slot width.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub open_minutes: u32,
    pub close_minutes: u32,
    pub slot_minutes: u32,
    pub lunch_start_minutes: u32,
    pub lunch_end_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        // 08:30 - 19:00 in half-hour slots, lunch 12:00 - 13:00
        GridConfig {
            open_minutes: 8 * 60 + 30,
            close_minutes: 19 * 60,
            slot_minutes: 30,
            lunch_start_minutes: 12 * 60,
            lunch_end_minutes: 13 * 60,
        }
    }
}

/// One discrete slot of the working day.
#[derive(Debug, Clone)]
pub struct TimeSlot {
    /// Minutes since midnight at which the slot starts.
    pub minutes: u32,
    /// Wall-clock label, e.g. "08:30".
    pub label: String,
    pub is_lunch: bool,
}

/// The ordered slot sequence for one working day, generated once per solve.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    slots: Vec<TimeSlot>,
    slot_minutes: u32,
    close_label: String,
}

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[:.](\d{2})").unwrap());

impl TimeGrid {
    pub fn build(config: &GridConfig) -> TimeGrid {
        let mut slots = Vec::new();
        let mut minutes = config.open_minutes;
        while minutes < config.close_minutes {
            slots.push(TimeSlot {
                minutes,
                label: format_minutes(minutes),
                is_lunch: minutes >= config.lunch_start_minutes
                    && minutes < config.lunch_end_minutes,
            });
            minutes += config.slot_minutes;
        }
        TimeGrid {
            slots,
            slot_minutes: config.slot_minutes,
            close_label: format_minutes(config.close_minutes),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> &TimeSlot {
        &self.slots[index]
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Reverse lookup from free text to a slot index. Tolerates both `:` and
    /// `.` as the hour/minute separator ("09:00", "9.00"). Returns `None` when
    /// no slot starts at that time.
    pub fn index_for_time(&self, text: &str) -> Option<usize> {
        let caps = TIME_RE.captures(text.trim())?;
        let hours: u32 = caps[1].parse().ok()?;
        let mins: u32 = caps[2].parse().ok()?;
        let value = hours * 60 + mins;
        self.slots.iter().position(|s| s.minutes == value)
    }

    /// Slots per hour at this grid's granularity, e.g. 2.0 for half-hour
    /// slots. Session planning converts hour totals through this.
    pub fn slots_per_hour(&self) -> f64 {
        60.0 / self.slot_minutes as f64
    }

    /// Whether a session starting at `start` and lasting `duration` slots
    /// stays inside the grid.
    pub fn fits(&self, start: usize, duration: usize) -> bool {
        start + duration <= self.slots.len()
    }

    pub fn overlaps_lunch(&self, start: usize, duration: usize) -> bool {
        (start..start + duration)
            .any(|i| self.slots.get(i).is_some_and(|s| s.is_lunch))
    }

    /// Minutes since midnight at which a session occupying
    /// `start .. start + duration` ends.
    pub fn end_minutes(&self, start: usize, duration: usize) -> u32 {
        self.slots[start].minutes + duration as u32 * self.slot_minutes
    }

    /// Wall-clock label for a session end. A session running up to the last
    /// slot ends at closing time, which has no slot of its own.
    pub fn end_label(&self, start: usize, duration: usize) -> String {
        match self.slots.get(start + duration) {
            Some(slot) => slot.label.clone(),
            None => self.close_label.clone(),
        }
    }
}

fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
