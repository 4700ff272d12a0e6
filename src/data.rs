use crate::grid::{Day, GridConfig};
use serde::{Deserialize, Serialize};

/// One room of the building feed. `type` is a free-form tag such as
/// "lecture", "lab", "lab_ai" or "lab_network".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoomRow {
    pub room: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One teacher of the roster, with free-text unavailability entries such as
/// "Mon 09:00-12:00".
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRow {
    pub teacher_id: String,
    #[serde(default)]
    pub unavailable_times: Vec<String>,
}

/// One (teacher, course) pairing of the assignment feed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCourseRow {
    pub teacher_id: String,
    pub course_code: String,
}

/// One course section of the catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub course_code: String,
    pub section: u32,
    pub enrollment_count: u32,
    #[serde(default)]
    pub lecture_hour: f64,
    #[serde(default)]
    pub lab_hour: f64,
    #[serde(default)]
    pub lec_online: bool,
    #[serde(default)]
    pub lab_online: bool,
    /// Elective when true, required when false.
    #[serde(default = "default_true")]
    pub optional: bool,
    #[serde(default)]
    pub require_lab_ai: bool,
    #[serde(default)]
    pub require_lab_network: bool,
}

fn default_true() -> bool {
    true
}

/// One administratively fixed placement. `section`, `day` and `start` are
/// free text straight from the feed; rows that fail to parse are skipped.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedScheduleRow {
    pub course_code: String,
    pub section: String,
    pub day: String,
    pub start: String,
    pub room: String,
    #[serde(default)]
    pub lecture_hour: f64,
    #[serde(default)]
    pub lab_hour: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleMode {
    /// Everything must fit inside the compact daily window.
    Compact,
    /// The whole grid is admissible; placements outside the compact window
    /// pay a small objective penalty.
    Flexible,
}

impl Default for ScheduleMode {
    fn default() -> Self {
        ScheduleMode::Compact
    }
}

/// Objective weight per priority tier. Magnitudes are separated so that one
/// higher-tier session always outweighs any number of lower-tier sessions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityWeights {
    pub locked: f64,
    pub required: f64,
    pub elective: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        PriorityWeights {
            locked: 1_000_000.0,
            required: 1_000.0,
            elective: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolveOptions {
    pub mode: ScheduleMode,
    /// Wall-clock budget handed to the solver.
    pub time_limit_secs: f64,
    /// Worker-count hint for the solver, a performance tunable only.
    pub workers: u32,
    pub weights: PriorityWeights,
    /// Compact daily window, minutes since midnight.
    pub window_start_minutes: u32,
    pub window_end_minutes: u32,
    /// Objective cost per flexible-mode candidate outside the window.
    pub window_penalty: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            mode: ScheduleMode::default(),
            time_limit_secs: 120.0,
            workers: 4,
            weights: PriorityWeights::default(),
            window_start_minutes: 9 * 60,
            window_end_minutes: 16 * 60,
            window_penalty: 1.0,
        }
    }
}

/// The complete input for one solve invocation. All tables are read once and
/// never mutated during model construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub rooms: Vec<RoomRow>,
    #[serde(default)]
    pub teachers: Vec<TeacherRow>,
    pub teacher_courses: Vec<TeacherCourseRow>,
    pub courses: Vec<CourseRow>,
    #[serde(default)]
    pub fixed_schedule: Vec<FixedScheduleRow>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub options: SolveOptions,
}

/// One successfully placed session of the decoded timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSession {
    pub day: Day,
    pub start: String,
    pub end: String,
    pub room: String,
    pub course: String,
    pub section: u32,
    pub kind: String,
    pub teachers: Vec<String>,
}

/// A session the solver chose not to (or could not) place. Never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedSession {
    pub course: String,
    pub section: u32,
    pub kind: String,
    pub reason: String,
}

/// Decoded solver output: the placed table ordered by (day, start) and the
/// unplaced table in session order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub placed: Vec<PlacedSession>,
    pub unplaced: Vec<UnplacedSession>,
    pub placed_count: usize,
    pub unplaced_count: usize,
}

impl TimetableOutput {
    /// Flat comma-delimited rendering of both tables, one header per table.
    /// Teacher lists are joined with `;` so they stay inside one field.
    pub fn to_delimited(&self) -> String {
        let mut out = String::from("day,start,end,room,course,section,kind,teachers\n");
        for p in &self.placed {
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                p.day,
                p.start,
                p.end,
                p.room,
                p.course,
                p.section,
                p.kind,
                p.teachers.join(";"),
            ));
        }
        if !self.unplaced.is_empty() {
            out.push_str("UNPLACED\ncourse,section,kind,reason\n");
            for u in &self.unplaced {
                out.push_str(&format!(
                    "{},{},{},{}\n",
                    u.course, u.section, u.kind, u.reason
                ));
            }
        }
        out
    }
}
