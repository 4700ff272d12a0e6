//! Resolution of the fixed-schedule feed into per-session locks.
//!
//! A feed row pins the lecture and/or lab of one (course, section) to a
//! (day, room, start) triple. Rows whose (course, section) exists in the
//! catalog lock the matching planned session; rows without a catalog match
//! describe externally taught classes and get a locked session of their own,
//! so they still occupy their room and teachers in the conflict constraints.
//! Rows that fail to parse are logged and skipped; the affected session
//! simply falls back to free-domain search.

use crate::data::{FixedScheduleRow, TeacherCourseRow};
use crate::grid::{Day, TimeGrid};
use crate::session::{
    EXTERNAL_FACULTY, Lock, Priority, Session, SessionKind, slots_for_hours, teacher_map,
};
use log::{info, warn};
use thiserror::Error;

/// Why one fixed-schedule row was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("section {token:?} is not a number")]
    BadSection { token: String },
    #[error("unknown day {token:?}")]
    UnknownDay { token: String },
    #[error("start {token:?} does not name a grid slot")]
    UnknownStart { token: String },
}

/// Parses the triple of one row; the row's hour columns decide which session
/// kinds it locks.
pub fn parse_row(row: &FixedScheduleRow, grid: &TimeGrid) -> Result<(u32, Day, usize), LockError> {
    let section: u32 = row
        .section
        .trim()
        .parse()
        .map_err(|_| LockError::BadSection {
            token: row.section.clone(),
        })?;
    let day = Day::from_abbrev(&row.day).ok_or_else(|| LockError::UnknownDay {
        token: row.day.clone(),
    })?;
    let start = grid
        .index_for_time(&row.start)
        .ok_or_else(|| LockError::UnknownStart {
            token: row.start.clone(),
        })?;
    Ok((section, day, start))
}

/// Attaches locks to the matching sessions. A row with `lecture_hour > 0`
/// locks the first lecture part of its section, `lab_hour > 0` the lab; both
/// may apply to the same row. Rows matching no planned session append a
/// locked session taught by the mapped teachers, or the
/// [`EXTERNAL_FACULTY`] sentinel when the course has no mapping.
pub fn resolve_locks(
    rows: &[FixedScheduleRow],
    sessions: &mut Vec<Session>,
    teacher_courses: &[TeacherCourseRow],
    grid: &TimeGrid,
) {
    let teachers_by_course = teacher_map(teacher_courses);

    for row in rows {
        let (section, day, start) = match parse_row(row, grid) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    "skipping fixed-schedule row for {} sec {}: {e}",
                    row.course_code, row.section
                );
                continue;
            }
        };

        let course = row.course_code.trim();
        let room = row.room.trim().to_string();
        let mut kinds: Vec<(&str, f64)> = Vec::new();
        if row.lecture_hour > 0.0 {
            kinds.push(("Lec", row.lecture_hour));
        }
        if row.lab_hour > 0.0 {
            kinds.push(("Lab", row.lab_hour));
        }

        for (tag, hours) in kinds {
            let lock = Lock {
                day,
                room: room.clone(),
                start,
            };
            let target = sessions.iter_mut().find(|s| {
                s.course == course && s.section == section && s.kind.lockable_as(tag)
            });
            match target {
                Some(session) => session.lock = Some(lock),
                None => {
                    info!("fixed-schedule row for {course} sec {section} ({tag}) has no catalog session, adding a locked one");
                    let teachers = teachers_by_course
                        .get(course)
                        .cloned()
                        .unwrap_or_else(|| vec![EXTERNAL_FACULTY.to_string()]);
                    let (kind, uid) = match tag {
                        "Lec" => (
                            SessionKind::Lecture { part: 1, parts: 1 },
                            format!("{course}_S{section}_Lec_P1"),
                        ),
                        _ => (SessionKind::Lab, format!("{course}_S{section}_Lab")),
                    };
                    sessions.push(Session {
                        uid,
                        course: course.to_string(),
                        section,
                        kind,
                        duration: slots_for_hours(hours, grid.slots_per_hour()),
                        capacity: 0,
                        teachers,
                        online: false,
                        requires_lab_ai: false,
                        requires_lab_network: false,
                        priority: Priority::Elective,
                        lock: Some(lock),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CourseRow;
    use crate::grid::GridConfig;
    use crate::session::plan_sessions;

    fn grid() -> TimeGrid {
        TimeGrid::build(&GridConfig::default())
    }

    fn fixed(course: &str, section: &str, day: &str, start: &str, lec: f64, lab: f64) -> FixedScheduleRow {
        FixedScheduleRow {
            course_code: course.to_string(),
            section: section.to_string(),
            day: day.to_string(),
            start: start.to_string(),
            room: "Lab1".to_string(),
            lecture_hour: lec,
            lab_hour: lab,
        }
    }

    fn catalog() -> Vec<CourseRow> {
        vec![CourseRow {
            course_code: "CS201".to_string(),
            section: 2,
            enrollment_count: 25,
            lecture_hour: 4.5,
            lab_hour: 2.0,
            lec_online: false,
            lab_online: false,
            optional: true,
            require_lab_ai: false,
            require_lab_network: false,
        }]
    }

    #[test]
    fn lock_lands_on_first_lecture_part_and_lab() {
        let grid = grid();
        let mut sessions = plan_sessions(&catalog(), &[], grid.slots_per_hour());
        resolve_locks(
            &[fixed("CS201", "2", "Tue", "10:00", 4.5, 2.0)],
            &mut sessions,
            &[],
            &grid,
        );

        let p1 = sessions.iter().find(|s| s.uid == "CS201_S2_Lec_P1").unwrap();
        let p2 = sessions.iter().find(|s| s.uid == "CS201_S2_Lec_P2").unwrap();
        let lab = sessions.iter().find(|s| s.uid == "CS201_S2_Lab").unwrap();

        let expected = Lock {
            day: Day::Tue,
            room: "Lab1".to_string(),
            start: grid.index_for_time("10:00").unwrap(),
        };
        assert_eq!(p1.lock.as_ref(), Some(&expected));
        assert!(p2.lock.is_none());
        assert_eq!(lab.lock.as_ref(), Some(&expected));
    }

    #[test]
    fn non_numeric_section_is_skipped() {
        let grid = grid();
        let mut sessions = plan_sessions(&catalog(), &[], grid.slots_per_hour());
        let before = sessions.len();
        resolve_locks(
            &[fixed("CS201", "II", "Tue", "10:00", 4.5, 0.0)],
            &mut sessions,
            &[],
            &grid,
        );
        assert_eq!(sessions.len(), before);
        assert!(sessions.iter().all(|s| s.lock.is_none()));
    }

    #[test]
    fn row_without_catalog_match_becomes_a_locked_external_session() {
        let grid = grid();
        let mut sessions = plan_sessions(&catalog(), &[], grid.slots_per_hour());
        let before = sessions.len();
        resolve_locks(
            &[fixed("EXT999", "1", "Wed", "13:00", 0.0, 2.0)],
            &mut sessions,
            &[],
            &grid,
        );

        assert_eq!(sessions.len(), before + 1);
        let external = sessions.iter().find(|s| s.course == "EXT999").unwrap();
        assert_eq!(external.uid, "EXT999_S1_Lab");
        assert_eq!(external.kind, SessionKind::Lab);
        assert_eq!(external.duration, 4);
        assert_eq!(external.teachers, vec![EXTERNAL_FACULTY.to_string()]);
        assert_eq!(
            external.lock.as_ref(),
            Some(&Lock {
                day: Day::Wed,
                room: "Lab1".to_string(),
                start: grid.index_for_time("13:00").unwrap(),
            })
        );
    }

    #[test]
    fn synthesized_session_uses_mapped_teachers_when_available() {
        let grid = grid();
        let mut sessions = Vec::new();
        let maps = vec![TeacherCourseRow {
            teacher_id: "T9".to_string(),
            course_code: "EXT998".to_string(),
        }];
        resolve_locks(
            &[fixed("EXT998", "1", "Mon", "09:00", 1.0, 0.0)],
            &mut sessions,
            &maps,
            &grid,
        );
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].teachers, vec!["T9".to_string()]);
        assert_eq!(sessions[0].kind, SessionKind::Lecture { part: 1, parts: 1 });
        assert_eq!(sessions[0].duration, 2);
    }

    #[test]
    fn bad_day_and_bad_start_are_typed_errors() {
        let grid = grid();
        assert!(matches!(
            parse_row(&fixed("CS201", "2", "Xyz", "10:00", 1.0, 0.0), &grid),
            Err(LockError::UnknownDay { .. })
        ));
        assert!(matches!(
            parse_row(&fixed("CS201", "2", "Tue", "10:05", 1.0, 0.0), &grid),
            Err(LockError::UnknownStart { .. })
        ));
    }

    #[test]
    fn day_name_longer_than_abbreviation_parses() {
        let grid = grid();
        let (section, day, start) =
            parse_row(&fixed("CS201", "2", "Tuesday", "9.00", 1.0, 0.0), &grid).unwrap();
        assert_eq!((section, day, start), (2, Day::Tue, 1));
    }
}
