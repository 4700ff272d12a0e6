//! Candidate (room, day, start) enumeration per session.
//!
//! Each admissibility rule is its own predicate so it can be tested in
//! isolation; `free_candidates` chains them into a lazy sequence over the
//! full room x day x slot product. A locked session bypasses every filter
//! and collapses to its single lock triple.

use crate::availability::BlockedSlots;
use crate::data::{RoomRow, ScheduleMode, SolveOptions};
use crate::grid::{Day, TimeGrid};
use crate::session::Session;
use itertools::iproduct;
use log::trace;
use std::collections::HashMap;

/// Name of the one synthetic virtual room.
pub const ONLINE_ROOM: &str = "Online";

/// A room of the compiled room table.
#[derive(Debug, Clone)]
pub struct Room {
    pub name: String,
    pub capacity: u32,
    pub kind: String,
    pub is_virtual: bool,
}

/// The decision unit: session `session` occupying room `room` on `day`
/// starting at slot `start`. Indices refer to the session and room tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub session: usize,
    pub room: usize,
    pub day: Day,
    pub start: usize,
}

/// Compiles the room feed into the table used for candidate generation: the
/// physical rooms, the synthetic online room, and a stub for any locked room
/// missing from the feed (so locked placements still take part in room
/// exclusivity).
pub fn room_table(rows: &[RoomRow], sessions: &[Session]) -> Vec<Room> {
    let mut rooms: Vec<Room> = rows
        .iter()
        .map(|r| Room {
            name: r.room.trim().to_string(),
            capacity: r.capacity,
            kind: r.kind.trim().to_string(),
            is_virtual: r.kind.trim().eq_ignore_ascii_case("virtual"),
        })
        .collect();
    rooms.push(Room {
        name: ONLINE_ROOM.to_string(),
        capacity: u32::MAX,
        kind: "virtual".to_string(),
        is_virtual: true,
    });

    for session in sessions {
        if let Some(lock) = &session.lock {
            if !rooms.iter().any(|r| r.name == lock.room) {
                rooms.push(Room {
                    name: lock.room.clone(),
                    capacity: 0,
                    kind: "external".to_string(),
                    is_virtual: false,
                });
            }
        }
    }
    rooms
}

/// Delivery mode, capacity and lab-requirement admissibility of one room.
pub fn room_admits(session: &Session, room: &Room) -> bool {
    if session.online {
        return room.is_virtual;
    }
    if room.is_virtual || room.capacity < session.capacity {
        return false;
    }
    if session.kind.is_lab() {
        if !room.kind.to_lowercase().contains("lab") {
            return false;
        }
        // AI / network labs are identified by exact room name.
        if session.requires_lab_ai && room.name != "lab_ai" {
            return false;
        }
        if session.requires_lab_network && room.name != "lab_network" {
            return false;
        }
    }
    true
}

/// Whether the occupied range lies inside the compact daily window.
pub fn within_window(grid: &TimeGrid, start: usize, duration: usize, options: &SolveOptions) -> bool {
    grid.slot(start).minutes >= options.window_start_minutes
        && grid.end_minutes(start, duration) <= options.window_end_minutes
}

/// Whether every non-sentinel eligible teacher is free over the occupied
/// range on `day`.
pub fn teachers_free(
    session: &Session,
    day: Day,
    start: usize,
    availability: &HashMap<String, BlockedSlots>,
) -> bool {
    session.real_teachers().all(|teacher| {
        let Some(blocked) = availability.get(teacher).and_then(|b| b.get(&day)) else {
            return true;
        };
        !(start..start + session.duration).any(|slot| blocked.contains(&slot))
    })
}

/// Lazily enumerates every admissible triple for an unlocked session.
pub fn free_candidates<'a>(
    session_index: usize,
    session: &'a Session,
    rooms: &'a [Room],
    grid: &'a TimeGrid,
    availability: &'a HashMap<String, BlockedSlots>,
    options: &'a SolveOptions,
) -> impl Iterator<Item = Candidate> + 'a {
    rooms
        .iter()
        .enumerate()
        .filter(move |(_, room)| room_admits(session, room))
        .flat_map(move |(room_index, _)| {
            iproduct!(Day::ALL, 0..grid.len()).filter_map(move |(day, start)| {
                if !grid.fits(start, session.duration) {
                    return None;
                }
                if options.mode == ScheduleMode::Compact
                    && !within_window(grid, start, session.duration, options)
                {
                    return None;
                }
                if grid.overlaps_lunch(start, session.duration) {
                    return None;
                }
                if !teachers_free(session, day, start, availability) {
                    return None;
                }
                Some(Candidate {
                    session: session_index,
                    room: room_index,
                    day,
                    start,
                })
            })
        })
}

/// Builds the full candidate table. Locked sessions contribute exactly their
/// lock triple; a session whose filters reject everything contributes nothing
/// and will simply end up unplaced.
pub fn build_domains(
    sessions: &[Session],
    rooms: &[Room],
    grid: &TimeGrid,
    availability: &HashMap<String, BlockedSlots>,
    options: &SolveOptions,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (session_index, session) in sessions.iter().enumerate() {
        let before = candidates.len();
        match &session.lock {
            Some(lock) => {
                // room_table guarantees the lock room exists.
                let room = rooms
                    .iter()
                    .position(|r| r.name == lock.room)
                    .expect("room_table inserts a stub for every lock room");
                candidates.push(Candidate {
                    session: session_index,
                    room,
                    day: lock.day,
                    start: lock.start,
                });
            }
            None => candidates.extend(free_candidates(
                session_index,
                session,
                rooms,
                grid,
                availability,
                options,
            )),
        }
        trace!(
            "session {}: {} candidate(s)",
            session.uid,
            candidates.len() - before
        );
    }
    candidates
}
