//! Expansion of course rows into atomic teaching sessions.
//!
//! A course section yields one lecture stream (split into contiguous parts of
//! at most [`MAX_LECTURE_SLOTS`]) and at most one lab session; each session is
//! the unit the solver places.

use crate::data::{CourseRow, TeacherCourseRow};
use crate::grid::Day;
use itertools::Itertools;
use std::collections::HashMap;

/// Longest contiguous lecture block, in slots.
pub const MAX_LECTURE_SLOTS: usize = 6;

/// Placeholder teacher for courses missing from the teacher-course feed.
pub const UNKNOWN_TEACHER: &str = "Unknown";
/// Placeholder for fixed-schedule courses taught outside the faculty.
pub const EXTERNAL_FACULTY: &str = "External_Faculty";

/// Sentinel teachers are exempt from conflict and availability constraints.
pub fn is_sentinel_teacher(id: &str) -> bool {
    id == UNKNOWN_TEACHER || id == EXTERNAL_FACULTY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Part `part` of `parts` of a split lecture stream.
    Lecture { part: u32, parts: u32 },
    Lab,
}

impl SessionKind {
    pub fn tag(self) -> &'static str {
        match self {
            SessionKind::Lecture { .. } => "Lec",
            SessionKind::Lab => "Lab",
        }
    }

    pub fn is_lab(self) -> bool {
        matches!(self, SessionKind::Lab)
    }

    /// Whether a fixed-schedule lock of `tag` kind applies to this session.
    /// Only the first lecture part is lockable; the feed carries one entry
    /// per (course, section, kind).
    pub fn lockable_as(self, tag: &str) -> bool {
        match self {
            SessionKind::Lecture { part, .. } => tag == "Lec" && part == 1,
            SessionKind::Lab => tag == "Lab",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Required,
    Elective,
}

/// An externally mandated placement resolved from the fixed-schedule feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    pub day: Day,
    pub room: String,
    pub start: usize,
}

/// One atomic teaching block requiring a single contiguous placement.
#[derive(Debug, Clone)]
pub struct Session {
    pub uid: String,
    pub course: String,
    pub section: u32,
    pub kind: SessionKind,
    /// Contiguous length in slots, always >= 1.
    pub duration: usize,
    pub capacity: u32,
    pub teachers: Vec<String>,
    pub online: bool,
    pub requires_lab_ai: bool,
    pub requires_lab_network: bool,
    pub priority: Priority,
    pub lock: Option<Lock>,
}

impl Session {
    /// Eligible teachers excluding sentinels.
    pub fn real_teachers(&self) -> impl Iterator<Item = &str> {
        self.teachers
            .iter()
            .map(String::as_str)
            .filter(|t| !is_sentinel_teacher(t))
    }
}

/// Converts an hour total into a slot count at the grid's granularity,
/// rounding partial slots up.
pub fn slots_for_hours(hours: f64, slots_per_hour: f64) -> usize {
    (hours * slots_per_hour).ceil() as usize
}

/// Course code -> eligible teacher ids, from the teacher-course feed.
pub fn teacher_map(teacher_courses: &[TeacherCourseRow]) -> HashMap<String, Vec<String>> {
    teacher_courses
        .iter()
        .map(|row| {
            (
                row.course_code.trim().to_string(),
                row.teacher_id.trim().to_string(),
            )
        })
        .into_group_map()
}

/// Splits a lecture slot total into consecutive part durations, each at most
/// [`MAX_LECTURE_SLOTS`], preserving the total.
fn lecture_parts(total: usize) -> Vec<usize> {
    let mut parts = Vec::new();
    let mut remaining = total;
    while remaining > 0 {
        let dur = remaining.min(MAX_LECTURE_SLOTS);
        parts.push(dur);
        remaining -= dur;
    }
    parts
}

/// Expands the course catalog into sessions. Courses absent from the
/// teacher-course feed get the [`UNKNOWN_TEACHER`] sentinel.
pub fn plan_sessions(
    courses: &[CourseRow],
    teacher_courses: &[TeacherCourseRow],
    slots_per_hour: f64,
) -> Vec<Session> {
    let teacher_map = teacher_map(teacher_courses);

    let mut sessions = Vec::new();
    for row in courses {
        let course = row.course_code.trim().to_string();
        let teachers = teacher_map
            .get(&course)
            .cloned()
            .unwrap_or_else(|| vec![UNKNOWN_TEACHER.to_string()]);
        let priority = if row.optional {
            Priority::Elective
        } else {
            Priority::Required
        };

        let parts = lecture_parts(slots_for_hours(row.lecture_hour, slots_per_hour));
        let part_count = parts.len() as u32;
        for (i, duration) in parts.into_iter().enumerate() {
            let part = i as u32 + 1;
            sessions.push(Session {
                uid: format!("{course}_S{}_Lec_P{part}", row.section),
                course: course.clone(),
                section: row.section,
                kind: SessionKind::Lecture {
                    part,
                    parts: part_count,
                },
                duration,
                capacity: row.enrollment_count,
                teachers: teachers.clone(),
                online: row.lec_online,
                requires_lab_ai: false,
                requires_lab_network: false,
                priority,
                lock: None,
            });
        }

        let lab_duration = slots_for_hours(row.lab_hour, slots_per_hour);
        if lab_duration > 0 {
            sessions.push(Session {
                uid: format!("{course}_S{}_Lab", row.section),
                course: course.clone(),
                section: row.section,
                kind: SessionKind::Lab,
                duration: lab_duration,
                capacity: row.enrollment_count,
                teachers: teachers.clone(),
                online: row.lab_online,
                requires_lab_ai: row.require_lab_ai,
                requires_lab_network: row.require_lab_network,
                priority,
                lock: None,
            });
        }
    }
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, lecture_hour: f64, lab_hour: f64) -> CourseRow {
        CourseRow {
            course_code: code.to_string(),
            section: 1,
            enrollment_count: 30,
            lecture_hour,
            lab_hour,
            lec_online: false,
            lab_online: false,
            optional: true,
            require_lab_ai: false,
            require_lab_network: false,
        }
    }

    fn mapping(teacher: &str, course: &str) -> TeacherCourseRow {
        TeacherCourseRow {
            teacher_id: teacher.to_string(),
            course_code: course.to_string(),
        }
    }

    fn plan_sessions_half_hour(
        courses: &[CourseRow],
        teacher_courses: &[TeacherCourseRow],
    ) -> Vec<Session> {
        plan_sessions(courses, teacher_courses, 2.0)
    }

    #[test]
    fn long_lecture_splits_into_bounded_parts() {
        // 4.5 hours -> 9 slots -> parts of 6 and 3
        let sessions = plan_sessions_half_hour(&[course("CS101", 4.5, 0.0)], &[]);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration, 6);
        assert_eq!(sessions[1].duration, 3);
        assert_eq!(sessions[0].uid, "CS101_S1_Lec_P1");
        assert_eq!(sessions[1].uid, "CS101_S1_Lec_P2");
        let total: usize = sessions.iter().map(|s| s.duration).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn lab_is_a_single_unsplit_session() {
        let sessions = plan_sessions_half_hour(&[course("CS102", 0.0, 4.0)], &[]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].kind, SessionKind::Lab);
        assert_eq!(sessions[0].duration, 8);
        assert_eq!(sessions[0].uid, "CS102_S1_Lab");
    }

    #[test]
    fn zero_hour_components_emit_nothing() {
        let sessions = plan_sessions_half_hour(&[course("CS103", 0.0, 0.0)], &[]);
        assert!(sessions.is_empty());
    }

    #[test]
    fn unmapped_course_gets_unknown_sentinel() {
        let sessions = plan_sessions_half_hour(&[course("CS104", 1.0, 0.0)], &[]);
        assert_eq!(sessions[0].teachers, vec![UNKNOWN_TEACHER.to_string()]);
        assert_eq!(sessions[0].real_teachers().count(), 0);
    }

    #[test]
    fn mapped_course_collects_all_teachers() {
        let maps = vec![mapping("T1", "CS105"), mapping("T2", "CS105")];
        let sessions = plan_sessions_half_hour(&[course("CS105", 1.0, 0.0)], &maps);
        assert_eq!(sessions[0].teachers, vec!["T1".to_string(), "T2".to_string()]);
    }

    #[test]
    fn only_first_lecture_part_is_lockable() {
        let first = SessionKind::Lecture { part: 1, parts: 2 };
        let second = SessionKind::Lecture { part: 2, parts: 2 };
        assert!(first.lockable_as("Lec"));
        assert!(!second.lockable_as("Lec"));
        assert!(!first.lockable_as("Lab"));
        assert!(SessionKind::Lab.lockable_as("Lab"));
    }

    #[test]
    fn non_optional_course_is_required_priority() {
        let mut row = course("CS106", 1.0, 0.0);
        row.optional = false;
        let sessions = plan_sessions_half_hour(&[row], &[]);
        assert_eq!(sessions[0].priority, Priority::Required);
    }

    #[test]
    fn durations_follow_the_grid_granularity() {
        // Hour-wide slots: a one-hour lecture is one slot, not two.
        let sessions = plan_sessions(&[course("CS107", 1.0, 0.0)], &[], 1.0);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration, 1);

        // Quarter-hour slots: 1.5 hours round up to 6 slots.
        assert_eq!(slots_for_hours(1.5, 4.0), 6);
        assert_eq!(slots_for_hours(1.1, 4.0), 5);
    }
}
