//! Model compilation and solution decoding.
//!
//! Compiles the planned sessions and their candidate domains into a 0/1
//! integer program (one variable per candidate, one placed-indicator per
//! session), hands it to the HiGHS solver through good_lp, and decodes the
//! verdict back into placed/unplaced timetable rows.

use crate::availability::availability_map;
use crate::data::{
    PlacedSession, PriorityWeights, ScheduleMode, SchedulingInput, TimetableOutput,
    UnplacedSession,
};
use crate::domain::{Candidate, Room, build_domains, room_table, within_window};
use crate::error::ScheduleError;
use crate::grid::{Day, TimeGrid};
use crate::lock::resolve_locks;
use crate::session::{Priority, Session, plan_sessions};
use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver,
};
use itertools::Itertools;
use log::{info, warn};
use std::collections::HashMap;
use std::time::Instant;

const UNPLACED_REASON: &str = "no feasible assignment";

fn session_weight(session: &Session, weights: &PriorityWeights) -> f64 {
    if session.lock.is_some() {
        weights.locked
    } else {
        match session.priority {
            Priority::Required => weights.required,
            Priority::Elective => weights.elective,
        }
    }
}

/// Runs the whole pipeline on one immutable input snapshot.
pub fn solve(input: &SchedulingInput) -> Result<TimetableOutput, ScheduleError> {
    let start_time = Instant::now();

    if input.rooms.is_empty() {
        return Err(ScheduleError::MissingCriticalData("rooms"));
    }
    if input.teacher_courses.is_empty() {
        return Err(ScheduleError::MissingCriticalData("teacherCourses"));
    }

    let grid = TimeGrid::build(&input.grid);
    let availability = availability_map(&input.teachers, &grid);
    let mut sessions = plan_sessions(&input.courses, &input.teacher_courses, grid.slots_per_hour());
    resolve_locks(&input.fixed_schedule, &mut sessions, &input.teacher_courses, &grid);
    let rooms = room_table(&input.rooms, &sessions);
    let candidates = build_domains(&sessions, &rooms, &grid, &availability, &input.options);

    info!(
        "Setting up ILP model with {} sessions, {} rooms, {} slots and {} candidates...",
        sessions.len(),
        rooms.len(),
        grid.len(),
        candidates.len()
    );

    let mut problem = ProblemVariables::new();
    let placed_vars = problem.add_vector(variable().binary(), sessions.len());
    let candidate_vars = problem.add_vector(variable().binary(), candidates.len());

    // Objective: priority-weighted placement count, minus the soft window
    // penalty in flexible mode. Compact mode excludes those candidates
    // outright, so the penalty list is empty there.
    let weights = &input.options.weights;
    let placed_score: Expression = sessions
        .iter()
        .zip(&placed_vars)
        .map(|(session, var)| session_weight(session, weights) * *var)
        .sum();
    let penalty_score: Expression = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            input.options.mode == ScheduleMode::Flexible
                && sessions[c.session].lock.is_none()
                && !within_window(&grid, c.start, sessions[c.session].duration, &input.options)
        })
        .map(|(i, _)| candidate_vars[i])
        .sum();
    let objective = placed_score - input.options.window_penalty * penalty_score;

    let mut model = problem
        .maximise(objective)
        .using(default_solver)
        .set_option("time_limit", input.options.time_limit_secs)
        .set_option("threads", input.options.workers as i32);

    // A session is placed iff exactly one of its candidates is active; with
    // an empty domain this degenerates to "never placed".
    info!("Adding per-session placement constraints...");
    let by_session: HashMap<usize, Vec<Variable>> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (c.session, candidate_vars[i]))
        .into_group_map();
    for (i, placed) in placed_vars.iter().enumerate() {
        let active: Expression = by_session.get(&i).into_iter().flatten().copied().sum();
        model.add_constraint(constraint!(active == *placed));
    }

    // At most one active candidate may cover any (room, day, slot); the
    // virtual online room is exempt.
    info!("Adding 'no room overlap' constraints...");
    let room_usage: HashMap<(usize, Day, usize), Vec<Variable>> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !rooms[c.room].is_virtual)
        .flat_map(|(i, c)| {
            let var = candidate_vars[i];
            let duration = sessions[c.session].duration;
            (c.start..c.start + duration).map(move |slot| ((c.room, c.day, slot), var))
        })
        .into_group_map();
    for vars in room_usage.values() {
        if vars.len() > 1 {
            let occupied: Expression = vars.iter().copied().sum();
            model.add_constraint(constraint!(occupied <= 1));
        }
    }

    // At most one active candidate per (teacher, day, slot), across all
    // rooms including the online one. Sentinel teachers are exempt.
    info!("Adding 'no teacher overlap' constraints...");
    let teacher_usage: HashMap<(String, Day, usize), Vec<Variable>> = candidates
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let var = candidate_vars[i];
            let session = &sessions[c.session];
            session.real_teachers().flat_map(move |teacher| {
                (c.start..c.start + session.duration)
                    .map(move |slot| ((teacher.to_string(), c.day, slot), var))
            })
        })
        .into_group_map();
    for vars in teacher_usage.values() {
        if vars.len() > 1 {
            let busy: Expression = vars.iter().copied().sum();
            model.add_constraint(constraint!(busy <= 1));
        }
    }

    info!("Starting ILP solver...");
    let solution = match model.solve() {
        Ok(s) => s,
        Err(ResolutionError::Infeasible) => return Err(ScheduleError::Infeasible),
        Err(ResolutionError::Unbounded) => {
            return Err(ScheduleError::Solver("model unbounded".to_string()));
        }
        Err(e) => {
            warn!("solver returned no solution: {e}");
            return Err(ScheduleError::Timeout);
        }
    };
    info!("Solution found in {:.2?}", start_time.elapsed());

    Ok(decode(
        &solution,
        &sessions,
        &rooms,
        &grid,
        &candidates,
        &placed_vars,
        &candidate_vars,
    ))
}

/// Maps chosen variables back to human-readable timetable rows.
fn decode(
    solution: &impl Solution,
    sessions: &[Session],
    rooms: &[Room],
    grid: &TimeGrid,
    candidates: &[Candidate],
    placed_vars: &[Variable],
    candidate_vars: &[Variable],
) -> TimetableOutput {
    let active: HashMap<usize, &Candidate> = candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| solution.value(candidate_vars[*i]) > 0.9)
        .map(|(_, c)| (c.session, c))
        .collect();

    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    for (i, session) in sessions.iter().enumerate() {
        let chosen = active
            .get(&i)
            .filter(|_| solution.value(placed_vars[i]) > 0.9);
        match chosen {
            Some(c) => placed.push(PlacedSession {
                day: c.day,
                start: grid.slot(c.start).label.clone(),
                end: grid.end_label(c.start, session.duration),
                room: rooms[c.room].name.clone(),
                course: session.course.clone(),
                section: session.section,
                kind: session.kind.tag().to_string(),
                teachers: session.teachers.clone(),
            }),
            None => unplaced.push(UnplacedSession {
                course: session.course.clone(),
                section: session.section,
                kind: session.kind.tag().to_string(),
                reason: UNPLACED_REASON.to_string(),
            }),
        }
    }
    placed.sort_by_key(|p| (p.day, p.start.clone()));

    let (placed_count, unplaced_count) = (placed.len(), unplaced.len());
    TimetableOutput {
        placed,
        unplaced,
        placed_count,
        unplaced_count,
    }
}
