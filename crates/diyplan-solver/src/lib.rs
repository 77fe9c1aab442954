//! # diyplan-solver
//!
//! Scheduling engine for diyplan: turns a `SchedulingInputs` request into a
//! conflict-aware, resource-feasible `SchedulingResult`.
//!
//! Pipeline:
//! - Validation and dependency ordering (`dag`)
//! - Risk-adjusted durations, quick-mode phase merging (`estimate`)
//! - Worker availability under site rules (`calendar`)
//! - Greedy resource-constrained placement (`placement`)
//! - Backward pass against the drop-dead date (`cpm`)
//!
//! `remediation` re-runs the pipeline on relaxed inputs, and `lifecycle`
//! guards the draft/commit boundary.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use diyplan_core::{RiskTolerance, SchedulingInputs, Task, Worker};
//!
//! let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
//! let mut inputs = SchedulingInputs::new(monday.and_hms_opt(17, 30, 0).unwrap(), tuesday, tuesday);
//! inputs.risk_tolerance = RiskTolerance::Aggressive;
//! inputs.tasks.push(Task::new("demo").hours(4.0).min_block(2.0));
//! inputs.workers.push(Worker::new("sam"));
//!
//! let result = diyplan_solver::compute(&inputs).unwrap();
//! let demo = result.get("demo").unwrap();
//! assert_eq!(demo.start_time, Some(tuesday.and_hms_opt(9, 0, 0).unwrap()));
//! assert!(!result.has_conflicts());
//! ```

pub mod calendar;
pub mod config;
pub mod cpm;
pub mod dag;
pub mod estimate;
pub mod lifecycle;
pub mod placement;
pub mod remediation;

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use diyplan_core::{
    ConflictReason, Duration, Interval, PlanningMode, ScheduleError, ScheduleStatus,
    ScheduledTask, SchedulingInputs, SchedulingResult, Task, Worker,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

pub use calendar::CalendarResolver;
pub use config::EngineConfig;
pub use dag::{DependencyGraph, GraphError};
pub use estimate::{AdjustedTask, Estimator};
pub use lifecycle::ScheduleManager;
pub use placement::{Placement, PlacementSolver};
pub use remediation::{suggest_remediations, suggest_with};

/// Largest estimate accepted for a single task
pub const MAX_TASK_HOURS: f64 = 10_000.0;

/// Compute a draft schedule with the default engine settings
pub fn compute(inputs: &SchedulingInputs) -> Result<SchedulingResult, ScheduleError> {
    compute_with(inputs, &EngineConfig::default())
}

/// Compute a draft schedule.
///
/// Pure: the same inputs and config always produce the same result.
/// Fatal input errors abort; per-task problems are reported as conflicts.
pub fn compute_with(
    inputs: &SchedulingInputs,
    config: &EngineConfig,
) -> Result<SchedulingResult, ScheduleError> {
    let graph = validate(inputs)?;

    // Estimate in dependency order
    let estimator = Estimator::from_config(config);
    let adjusted: Vec<AdjustedTask> = graph
        .topo_order
        .iter()
        .map(|&i| estimator.adjust(&inputs.tasks[i], inputs.risk_tolerance, inputs.mode))
        .collect();

    let units = if inputs.mode == PlanningMode::Quick {
        estimate::merge_phases(&adjusted)
    } else {
        adjusted
    };

    let (horizon_start, horizon_end) = horizon(inputs, config);
    let resolver = CalendarResolver::new(&inputs.site_constraints, config);
    let availability: Vec<Vec<Interval>> = inputs
        .workers
        .iter()
        .map(|w| resolver.availability(w, horizon_start, horizon_end))
        .collect();

    debug!(
        tasks = inputs.tasks.len(),
        units = units.len(),
        workers = inputs.workers.len(),
        %horizon_start,
        %horizon_end,
        "placing"
    );

    let placements = placement::place(
        &units,
        &inputs.workers,
        availability,
        inputs.prefer_helpers,
        horizon_start,
    );

    let mut by_id = expand(&units, placements, &inputs.workers);
    let mut rows: Vec<ScheduledTask> = Vec::with_capacity(inputs.tasks.len());
    for task in &inputs.tasks {
        rows.push(by_id.remove(&task.id).unwrap_or_else(|| {
            ScheduledTask::unplaced(&task.id, Duration::zero(), ConflictReason::NoCapacity)
        }));
    }

    cpm::annotate(&mut rows, &graph, end_of_day(inputs.drop_dead_date));

    let result = summarize(inputs, rows);
    info!(
        tasks = result.scheduled_tasks.len(),
        conflicts = result.conflict_count(),
        target_met = result.target_met,
        "schedule computed"
    );
    Ok(result)
}

/// Check a request for fatal errors and build its dependency graph
pub fn validate(inputs: &SchedulingInputs) -> Result<DependencyGraph, ScheduleError> {
    if inputs.drop_dead_date < inputs.target_completion_date {
        return Err(ScheduleError::DeadlineBeforeTarget {
            target: inputs.target_completion_date,
            drop_dead: inputs.drop_dead_date,
        });
    }
    if inputs.workers.is_empty() {
        return Err(ScheduleError::NoWorkers);
    }
    inputs.tz()?;
    for task in &inputs.tasks {
        validate_task(task)?;
    }
    Ok(DependencyGraph::from_tasks(&inputs.tasks)?)
}

fn validate_task(task: &Task) -> Result<(), ScheduleError> {
    let invalid = |reason: &str| ScheduleError::InvalidTask {
        task: task.id.clone(),
        reason: reason.to_string(),
    };

    if !task.estimated_hours.is_finite() || task.estimated_hours <= 0.0 {
        return Err(invalid("estimated hours must be positive"));
    }
    if task.estimated_hours > MAX_TASK_HOURS {
        return Err(invalid("estimated hours exceed the per-task limit"));
    }
    if !task.min_contiguous_hours.is_finite() || task.min_contiguous_hours <= 0.0 {
        return Err(invalid("minimum contiguous hours must be positive"));
    }
    if task.min_contiguous_hours > task.estimated_hours {
        return Err(invalid("minimum contiguous hours exceed the estimate"));
    }
    if !(0.0..=1.0).contains(&task.confidence) {
        return Err(invalid("confidence must be between 0 and 1"));
    }
    Ok(())
}

/// Exclusive end of a calendar day (midnight of the next)
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt()
        .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN))
}

/// Planning horizon: from the planning start to `overrun_days` past the
/// end of the drop-dead day
pub fn horizon(inputs: &SchedulingInputs, config: &EngineConfig) -> (NaiveDateTime, NaiveDateTime) {
    let overrun = Days::new(u64::try_from(config.overrun_days).unwrap_or(0));
    let last_day = inputs
        .drop_dead_date
        .checked_add_days(overrun)
        .unwrap_or(inputs.drop_dead_date);
    (inputs.planning_start, end_of_day(last_day))
}

/// Turn unit placements into per-task rows, splitting phase units
fn expand(
    units: &[AdjustedTask],
    placements: Vec<Placement>,
    workers: &[Worker],
) -> HashMap<String, ScheduledTask> {
    let mut rows = HashMap::new();

    for (unit, placement) in units.iter().zip(placements) {
        let worker = placement
            .worker_id
            .as_deref()
            .and_then(|id| workers.iter().find(|w| w.id == id));

        let members: Vec<(&AdjustedTask, Vec<Interval>)> = if unit.is_phase_unit() {
            let sliced = estimate::reconstruct(&placement.blocks, &unit.members);
            unit.members.iter().zip(sliced).collect()
        } else {
            vec![(unit, placement.blocks)]
        };

        for (task, blocks) in members {
            let row = match (worker, placement.conflict) {
                (Some(worker), None) => placed_row(task, worker, blocks),
                (_, reason) => ScheduledTask::unplaced(
                    &task.id,
                    task.duration,
                    reason.unwrap_or(ConflictReason::NoContiguousWindow),
                ),
            };
            rows.insert(task.id.clone(), row);
        }
    }

    rows
}

fn placed_row(task: &AdjustedTask, worker: &Worker, blocks: Vec<Interval>) -> ScheduledTask {
    let booked: Duration = blocks.iter().map(Interval::duration).sum();
    let cost = (worker.cost_per_hour * Decimal::from(booked.minutes) / Decimal::from(60)).round_dp(2);

    ScheduledTask {
        task_id: task.id.clone(),
        worker_id: Some(worker.id.clone()),
        start_time: blocks.first().map(|b| b.start),
        end_time: blocks.last().map(|b| b.end),
        target_completion_date: None,
        latest_completion_date: NaiveDateTime::MAX,
        status: ScheduleStatus::Confirmed,
        conflict_reason: None,
        blocks,
        duration: task.duration,
        cost,
    }
}

fn summarize(inputs: &SchedulingInputs, rows: Vec<ScheduledTask>) -> SchedulingResult {
    let project_finish = rows.iter().filter_map(|r| r.end_time).max();
    let target_end = end_of_day(inputs.target_completion_date);
    let target_met = rows
        .iter()
        .all(|r| !r.is_conflict() && r.end_time.is_some_and(|end| end <= target_end));
    let total_cost = rows.iter().map(|r| r.cost).sum();

    SchedulingResult {
        scheduled_tasks: rows,
        inputs_fingerprint: inputs.fingerprint(),
        timezone: inputs.timezone.clone(),
        project_finish,
        target_met,
        total_cost,
    }
}
