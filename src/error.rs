use thiserror::Error;

/// User-visible failures of a solve invocation. Everything else (unparsable
/// availability entries, malformed fixed-schedule rows, sessions with empty
/// domains) degrades best-effort and never aborts the run.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("missing critical input table: {0}")]
    MissingCriticalData(&'static str),
    #[error("no feasible timetable exists for the given constraints")]
    Infeasible,
    #[error("solver hit the time limit without finding any timetable")]
    Timeout,
    #[error("solver failure: {0}")]
    Solver(String),
}
