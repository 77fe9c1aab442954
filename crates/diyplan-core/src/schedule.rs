//! Schedule results
//!
//! Everything the engine hands back to its collaborators: per-task rows,
//! the result envelope, remediation suggestions, and the persistence seam.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    Duration, Interval, RiskTolerance, SchedulingInputs, SinkError, TaskId, WorkerId,
};

// ============================================================================
// Per-task rows
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Confirmed,
    Conflict,
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStatus::Confirmed => write!(f, "confirmed"),
            ScheduleStatus::Conflict => write!(f, "conflict"),
        }
    }
}

/// Why a task ended up in `ScheduleStatus::Conflict`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictReason {
    /// No qualified worker had enough remaining budget
    NoCapacity,
    /// No candidate had room for the task's contiguous blocks in the horizon
    NoContiguousWindow,
    /// A predecessor could not be placed
    BlockedByPredecessor,
    /// Placed, but finishes after its latest acceptable completion
    MissesDeadline,
}

impl ConflictReason {
    /// Whether the task was left without a worker
    pub fn is_unplaced(self) -> bool {
        !matches!(self, ConflictReason::MissesDeadline)
    }
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictReason::NoCapacity => write!(f, "no worker has enough remaining hours"),
            ConflictReason::NoContiguousWindow => {
                write!(f, "no contiguous window large enough before the horizon ends")
            }
            ConflictReason::BlockedByPredecessor => write!(f, "a predecessor could not be placed"),
            ConflictReason::MissesDeadline => write!(f, "finishes after its latest completion"),
        }
    }
}

/// One output row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub task_id: TaskId,
    /// `None` when no worker could take the task
    pub worker_id: Option<WorkerId>,
    /// Start of the first booked block
    pub start_time: Option<NaiveDateTime>,
    /// End of the last booked block
    pub end_time: Option<NaiveDateTime>,
    /// Earliest feasible completion (the placed end)
    pub target_completion_date: Option<NaiveDateTime>,
    /// Latest completion that still lets the project meet its drop-dead date
    pub latest_completion_date: NaiveDateTime,
    pub status: ScheduleStatus,
    pub conflict_reason: Option<ConflictReason>,
    /// Contiguous work blocks actually booked, in time order
    pub blocks: Vec<Interval>,
    /// Risk-adjusted working time
    pub duration: Duration,
    pub cost: Decimal,
}

impl ScheduledTask {
    /// A row for a task that could not be placed
    pub fn unplaced(task_id: impl Into<String>, duration: Duration, reason: ConflictReason) -> Self {
        Self {
            task_id: task_id.into(),
            worker_id: None,
            start_time: None,
            end_time: None,
            target_completion_date: None,
            latest_completion_date: NaiveDateTime::MAX,
            status: ScheduleStatus::Conflict,
            conflict_reason: Some(reason),
            blocks: Vec::new(),
            duration,
            cost: Decimal::ZERO,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status == ScheduleStatus::Conflict
    }

    pub fn is_placed(&self) -> bool {
        self.worker_id.is_some()
    }

    /// Hours actually booked across all blocks
    pub fn scheduled_hours(&self) -> f64 {
        self.blocks.iter().map(Interval::duration).sum::<Duration>().as_hours()
    }

    /// Wall-clock slack between target and latest completion
    pub fn slack(&self) -> Option<chrono::Duration> {
        self.target_completion_date
            .map(|target| self.latest_completion_date - target)
    }

    /// Mark as conflicting, keeping the first recorded reason
    pub fn flag_conflict(&mut self, reason: ConflictReason) {
        self.status = ScheduleStatus::Conflict;
        self.conflict_reason.get_or_insert(reason);
    }
}

// ============================================================================
// Result envelope
// ============================================================================

/// The outcome of one `compute` call. Immutable once returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingResult {
    /// One row per input task, in input order
    pub scheduled_tasks: Vec<ScheduledTask>,
    /// Digest of the inputs that produced this result
    pub inputs_fingerprint: u64,
    /// IANA timezone of every wall-clock time in the result
    pub timezone: String,
    /// Latest placed end across all tasks
    pub project_finish: Option<NaiveDateTime>,
    /// Every task placed and finished by the end of the target date
    pub target_met: bool,
    pub total_cost: Decimal,
}

impl SchedulingResult {
    pub fn get(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.scheduled_tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.scheduled_tasks.iter().filter(|t| t.is_conflict())
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicts().next().is_some()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts().count()
    }

    /// Placed rows grouped by worker, for the notification consumer
    pub fn assignments_by_worker(&self) -> BTreeMap<WorkerId, Vec<&ScheduledTask>> {
        let mut by_worker: BTreeMap<WorkerId, Vec<&ScheduledTask>> = BTreeMap::new();
        for task in &self.scheduled_tasks {
            if let Some(worker) = &task.worker_id {
                by_worker.entry(worker.clone()).or_default().push(task);
            }
        }
        for tasks in by_worker.values_mut() {
            tasks.sort_by_key(|t| t.start_time);
        }
        by_worker
    }

    /// Booked hours per worker
    pub fn worker_hours(&self) -> BTreeMap<WorkerId, f64> {
        let mut hours = BTreeMap::new();
        for task in &self.scheduled_tasks {
            if let Some(worker) = &task.worker_id {
                *hours.entry(worker.clone()).or_insert(0.0) += task.scheduled_hours();
            }
        }
        hours
    }

    /// Attach the result's timezone to a wall-clock time.
    /// `None` for an unknown zone or a local time skipped by a DST change.
    pub fn zoned(&self, local: NaiveDateTime) -> Option<DateTime<chrono_tz::Tz>> {
        let tz: chrono_tz::Tz = self.timezone.parse().ok()?;
        tz.from_local_datetime(&local).earliest()
    }
}

// ============================================================================
// Remediation
// ============================================================================

/// Which input was relaxed to produce a suggestion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RemediationKind {
    ExtendDeadline { days: i64 },
    AddHelper { hours: f64 },
    RelaxRisk { to: RiskTolerance },
}

/// A previewed alternative. Never applied automatically.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemediationSuggestion {
    pub kind: RemediationKind,
    pub description: String,
    /// The modified inputs the preview was computed from
    pub inputs: SchedulingInputs,
    pub preview: SchedulingResult,
}

// ============================================================================
// Persistence seam
// ============================================================================

/// Destination for committed schedules
pub trait ScheduleSink {
    fn save(&mut self, schedule: &SchedulingResult) -> Result<(), SinkError>;
}

/// Sink that keeps committed schedules in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub saved: Vec<SchedulingResult>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SchedulingResult> {
        self.saved.last()
    }
}

impl ScheduleSink for MemorySink {
    fn save(&mut self, schedule: &SchedulingResult) -> Result<(), SinkError> {
        self.saved.push(schedule.clone());
        Ok(())
    }
}
