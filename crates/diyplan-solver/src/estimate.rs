//! Duration estimation
//!
//! Turns a task's nominal hours into the working time the solver actually
//! books: a risk buffer is applied, the result is rounded to the planning
//! mode's slot size, and the minimum contiguous block is scaled alongside.
//!
//! In quick mode the tasks of one phase are merged into a single unit that
//! is placed as a whole; `reconstruct` slices the booked blocks back into
//! per-task rows afterwards.

use std::collections::{HashMap, HashSet};

use diyplan_core::{
    Duration, Interval, PhaseId, PlanningMode, RiskTolerance, SkillLevel, Task, TaskId,
};

use tracing::debug;

use crate::config::EngineConfig;
use crate::dag::{DependencyGraph, GraphError};

/// Prefix of synthetic unit ids created for quick-mode phases
pub const PHASE_UNIT_PREFIX: &str = "phase:";

/// A task (or merged phase) ready for placement
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedTask {
    pub id: TaskId,
    /// Risk-adjusted working time
    pub duration: Duration,
    /// Shortest block the work may be split into
    pub min_block: Duration,
    pub required_skill: Option<SkillLevel>,
    pub dependencies: Vec<TaskId>,
    pub phase_id: Option<PhaseId>,
    /// Member tasks of a merged phase, in dependency order; empty otherwise
    pub members: Vec<AdjustedTask>,
}

impl AdjustedTask {
    pub fn is_phase_unit(&self) -> bool {
        !self.members.is_empty()
    }
}

/// Applies risk buffers to nominal task estimates
#[derive(Debug, Clone, Copy)]
pub struct Estimator {
    high_confidence: f64,
    confident_buffer_factor: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Estimator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            high_confidence: config.high_confidence,
            confident_buffer_factor: config.confident_buffer_factor,
        }
    }

    /// Effective multiplier for one task
    pub fn multiplier(&self, task: &Task, risk: RiskTolerance) -> f64 {
        let base = risk.buffer_multiplier();
        if task.confidence > self.high_confidence {
            (base - 1.0) * self.confident_buffer_factor + 1.0
        } else {
            base
        }
    }

    pub fn adjust(&self, task: &Task, risk: RiskTolerance, mode: PlanningMode) -> AdjustedTask {
        let step = mode.granularity();
        let ratio = self.multiplier(task, risk);

        let duration = Duration::from_hours_f64(task.estimated_hours * ratio).round_up_to(step);

        // Contiguity never shrinks below what the task author asked for
        let floor = Duration::from_hours_f64(task.min_contiguous_hours);
        let min_block = Duration::from_hours_f64(task.min_contiguous_hours * ratio)
            .max(floor)
            .round_up_to(step)
            .min(duration);

        AdjustedTask {
            id: task.id.clone(),
            duration,
            min_block,
            required_skill: task.required_skill(),
            dependencies: task.dependencies.clone(),
            phase_id: task.phase_id.clone(),
            members: Vec::new(),
        }
    }
}

/// Adjust a task with the default confidence policy
pub fn adjust(task: &Task, risk: RiskTolerance, mode: PlanningMode) -> AdjustedTask {
    Estimator::default().adjust(task, risk, mode)
}

/// Merge the tasks of each phase into one schedulable unit.
///
/// `adjusted` must be in dependency order. Tasks without a phase pass
/// through unchanged. Units appear where their first member did, and the
/// returned list is re-sorted into dependency order over units.
///
/// Phases can interleave (`a` in p1, `b` in p2 after `a`, `c` in p1 after
/// `b`), which makes the merged units cyclic even though the tasks are
/// not. Phases caught in such a cycle are dissolved and their tasks are
/// scheduled individually.
pub fn merge_phases(adjusted: &[AdjustedTask]) -> Vec<AdjustedTask> {
    let mut dissolved: HashSet<PhaseId> = HashSet::new();

    loop {
        let units = merge_units(adjusted, &dissolved);
        let graph = DependencyGraph::build(
            units
                .iter()
                .map(|u| (u.id.as_str(), u.dependencies.as_slice())),
        );

        match graph {
            Ok(graph) => {
                let mut ordered: Vec<Option<AdjustedTask>> = units.into_iter().map(Some).collect();
                return graph
                    .topo_order
                    .iter()
                    .filter_map(|&i| ordered[i].take())
                    .collect();
            }
            Err(GraphError::CycleDetected { tasks }) => {
                let caught: Vec<PhaseId> = tasks
                    .iter()
                    .filter_map(|id| id.strip_prefix(PHASE_UNIT_PREFIX))
                    .map(str::to_string)
                    .filter(|phase| !dissolved.contains(phase))
                    .collect();
                if caught.is_empty() {
                    return adjusted.to_vec();
                }
                debug!(phases = ?caught, "phases interleave, scheduling their tasks individually");
                dissolved.extend(caught);
            }
            // A phase unit id colliding with a task id
            Err(err) => {
                debug!(%err, "phase merge skipped");
                return adjusted.to_vec();
            }
        }
    }
}

/// One merge pass; tasks of `dissolved` phases stay individual
fn merge_units(adjusted: &[AdjustedTask], dissolved: &HashSet<PhaseId>) -> Vec<AdjustedTask> {
    let unit_id = |task: &AdjustedTask| match &task.phase_id {
        Some(phase) if !dissolved.contains(phase) => format!("{PHASE_UNIT_PREFIX}{phase}"),
        _ => task.id.clone(),
    };

    let unit_of: HashMap<&str, String> = adjusted
        .iter()
        .map(|t| (t.id.as_str(), unit_id(t)))
        .collect();

    let mut units: Vec<AdjustedTask> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for task in adjusted {
        let id = unit_id(task);
        if id == task.id {
            position.insert(id.clone(), units.len());
            let mut plain = task.clone();
            plain.dependencies = task
                .dependencies
                .iter()
                .map(|d| unit_of.get(d.as_str()).cloned().unwrap_or_else(|| d.clone()))
                .collect();
            dedup_in_place(&mut plain.dependencies);
            units.push(plain);
            continue;
        }

        let slot = *position.entry(id.clone()).or_insert_with(|| {
            units.push(AdjustedTask {
                id: id.clone(),
                duration: Duration::zero(),
                min_block: Duration::zero(),
                required_skill: None,
                dependencies: Vec::new(),
                phase_id: task.phase_id.clone(),
                members: Vec::new(),
            });
            units.len() - 1
        });

        let unit = &mut units[slot];
        unit.duration += task.duration;
        unit.min_block = unit.min_block.max(task.min_block);
        unit.required_skill = unit.required_skill.max(task.required_skill);
        for dep in &task.dependencies {
            let dep_unit = unit_of.get(dep.as_str()).cloned().unwrap_or_else(|| dep.clone());
            if dep_unit != id && !unit.dependencies.contains(&dep_unit) {
                unit.dependencies.push(dep_unit);
            }
        }
        unit.members.push(task.clone());
    }

    units
}

fn dedup_in_place(ids: &mut Vec<TaskId>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(id.clone());
            true
        }
    });
}

/// Slice a phase unit's booked blocks into consecutive per-member blocks.
///
/// Each member receives exactly its own share of working time, walking the
/// blocks in time order; the output is aligned with `members`.
pub fn reconstruct(blocks: &[Interval], members: &[AdjustedTask]) -> Vec<Vec<Interval>> {
    let mut sliced = Vec::with_capacity(members.len());
    let mut cursor = blocks.iter().copied();
    let mut current: Option<Interval> = cursor.next();

    for member in members {
        let mut need = member.duration;
        let mut pieces = Vec::new();

        while need > Duration::zero() {
            let Some(block) = current else { break };
            let available = block.duration();
            let take = available.min(need);
            let end = block.start + take.to_chrono();
            pieces.push(Interval::new(block.start, end));
            need -= take;

            current = if take == available {
                cursor.next()
            } else {
                Some(Interval::new(end, block.end))
            };
        }

        sliced.push(pieces);
    }

    sliced
}
