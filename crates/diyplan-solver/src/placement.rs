//! Resource-constrained placement
//!
//! Assigns each schedulable unit, in dependency order, to one worker and a
//! sequence of concrete work blocks. Placement is greedy and single pass: a
//! unit's booking is never revisited once made.
//!
//! Booking state (remaining budget, remaining free intervals) is owned by
//! the solver instance and lives only for one `compute` call.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use diyplan_core::{ConflictReason, Duration, Interval, Role, SkillLevel, TaskId, Worker, WorkerId};
use tracing::debug;

use crate::calendar::{longest_window, open_time_after, subtract};
use crate::estimate::AdjustedTask;

/// Outcome for one unit
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub task_id: TaskId,
    pub worker_id: Option<WorkerId>,
    /// Booked blocks in time order; empty when unplaced
    pub blocks: Vec<Interval>,
    pub conflict: Option<ConflictReason>,
}

impl Placement {
    fn unplaced(task_id: &str, reason: ConflictReason) -> Self {
        Self {
            task_id: task_id.to_string(),
            worker_id: None,
            blocks: Vec::new(),
            conflict: Some(reason),
        }
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.blocks.last().map(|b| b.end)
    }
}

/// Mutable booking state of one worker
#[derive(Debug, Clone)]
struct Booking<'a> {
    worker: &'a Worker,
    budget: Duration,
    free: Vec<Interval>,
}

/// Greedy placement over a fixed worker pool
#[derive(Debug)]
pub struct PlacementSolver<'a> {
    bookings: Vec<Booking<'a>>,
    prefer_helpers: bool,
    horizon_start: NaiveDateTime,
    /// Longest window in anyone's original availability
    longest_anywhere: Duration,
}

impl<'a> PlacementSolver<'a> {
    /// `availability` is aligned with `workers`
    pub fn new(
        workers: &'a [Worker],
        availability: Vec<Vec<Interval>>,
        prefer_helpers: bool,
        horizon_start: NaiveDateTime,
    ) -> Self {
        let longest_anywhere = availability
            .iter()
            .map(|free| longest_window(free))
            .max()
            .unwrap_or_default();

        let bookings = workers
            .iter()
            .zip(availability)
            .map(|(worker, free)| Booking {
                worker,
                budget: budget(worker.max_total_hours),
                free,
            })
            .collect();

        Self {
            bookings,
            prefer_helpers,
            horizon_start,
            longest_anywhere,
        }
    }

    /// Place every unit; `units` must be in dependency order
    pub fn place_all(mut self, units: &[AdjustedTask]) -> Vec<Placement> {
        let mut finished: HashMap<TaskId, Option<NaiveDateTime>> = HashMap::with_capacity(units.len());
        let mut placements = Vec::with_capacity(units.len());

        for unit in units {
            let placement = self.place(unit, &finished);
            finished.insert(unit.id.clone(), placement.end());
            placements.push(placement);
        }

        placements
    }

    fn place(&mut self, unit: &AdjustedTask, finished: &HashMap<TaskId, Option<NaiveDateTime>>) -> Placement {
        let mut earliest = self.horizon_start;
        for dep in &unit.dependencies {
            match finished.get(dep) {
                Some(Some(end)) => earliest = earliest.max(*end),
                _ => {
                    debug!(task = %unit.id, predecessor = %dep, "predecessor unplaced");
                    return Placement::unplaced(&unit.id, ConflictReason::BlockedByPredecessor);
                }
            }
        }

        if unit.min_block > self.longest_anywhere {
            debug!(task = %unit.id, min_block = %unit.min_block, "no window long enough anywhere");
            return Placement::unplaced(&unit.id, ConflictReason::NoContiguousWindow);
        }

        let candidates = self.candidates(unit, earliest);
        if candidates.is_empty() {
            debug!(task = %unit.id, duration = %unit.duration, "no qualified worker with budget");
            return Placement::unplaced(&unit.id, ConflictReason::NoCapacity);
        }

        for idx in candidates {
            let booking = &mut self.bookings[idx];
            let Some(blocks) = fit(&booking.free, earliest, unit.duration, unit.min_block) else {
                continue;
            };

            booking.budget -= unit.duration;
            for block in &blocks {
                subtract(&mut booking.free, *block);
            }
            debug!(
                task = %unit.id,
                worker = %booking.worker.id,
                blocks = blocks.len(),
                "placed"
            );
            return Placement {
                task_id: unit.id.clone(),
                worker_id: Some(booking.worker.id.clone()),
                blocks,
                conflict: None,
            };
        }

        debug!(task = %unit.id, "no candidate has room");
        Placement::unplaced(&unit.id, ConflictReason::NoContiguousWindow)
    }

    /// Qualified workers in preference order
    fn candidates(&self, unit: &AdjustedTask, earliest: NaiveDateTime) -> Vec<usize> {
        let required = unit.required_skill.unwrap_or(SkillLevel::Novice);
        let mut ranked: Vec<(u8, Reverse<Duration>, usize)> = self
            .bookings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.budget >= unit.duration && b.worker.skill_level >= required)
            .map(|(idx, b)| {
                (
                    self.role_rank(b.worker.role),
                    Reverse(open_time_after(&b.free, earliest)),
                    idx,
                )
            })
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, _, idx)| idx).collect()
    }

    fn role_rank(&self, role: Role) -> u8 {
        match (role, self.prefer_helpers) {
            (Role::Helper, true) | (Role::Owner, false) => 0,
            _ => 1,
        }
    }
}

/// Place units against per-worker availability
pub fn place(
    units: &[AdjustedTask],
    workers: &[Worker],
    availability: Vec<Vec<Interval>>,
    prefer_helpers: bool,
    horizon_start: NaiveDateTime,
) -> Vec<Placement> {
    PlacementSolver::new(workers, availability, prefer_helpers, horizon_start).place_all(units)
}

/// Budget in whole minutes, rounded down
fn budget(max_total_hours: f64) -> Duration {
    if !max_total_hours.is_finite() || max_total_hours <= 0.0 {
        return Duration::zero();
    }
    let minutes = (max_total_hours * 60.0 * 1e6).round() / 1e6;
    Duration::minutes(minutes.floor() as i64)
}

/// Split `need` into blocks of at least `min_block` inside `free`, starting
/// no earlier than `earliest`. `None` when the horizon runs out first.
///
/// A block is shortened when taking the whole window would leave a
/// remainder smaller than `min_block`.
fn fit(free: &[Interval], earliest: NaiveDateTime, need: Duration, min_block: Duration) -> Option<Vec<Interval>> {
    let mut blocks = Vec::new();
    let mut remaining = need;

    for iv in free {
        if remaining.is_zero() {
            break;
        }
        if iv.end <= earliest {
            continue;
        }
        let start = iv.start.max(earliest);
        let window = Interval::new(start, iv.end).duration();
        if window < min_block {
            continue;
        }

        let mut take = window.min(remaining);
        let rest = remaining - take;
        if !rest.is_zero() && rest < min_block {
            take = remaining - min_block;
            if take < min_block {
                continue;
            }
        }

        blocks.push(Interval::new(start, start + take.to_chrono()));
        remaining -= take;
    }

    remaining.is_zero().then_some(blocks)
}
