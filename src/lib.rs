//! Academic timetable compiler and solver: turns tabular course, room and
//! teacher feeds into a 0/1 integer program over (session, room, day, start)
//! candidates, solves it with HiGHS, and decodes the result back into
//! placed/unplaced timetable rows.

pub mod availability;
pub mod data;
pub mod domain;
pub mod error;
pub mod grid;
pub mod lock;
pub mod server;
pub mod session;
pub mod solver;
