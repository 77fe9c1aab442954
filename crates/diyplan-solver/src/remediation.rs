//! Remediation advisor
//!
//! When a draft has conflicts, each strategy relaxes one input on a clone
//! of the request and re-runs the full pipeline. Only alternatives whose
//! preview is conflict-free are returned; nothing is applied.
//!
//! Strategies are independent and run in parallel. The output order is
//! fixed: extend deadline, add helper, relax risk.

use chrono::Days;
use diyplan_core::{
    ConflictReason, Duration, RemediationKind, RemediationSuggestion, Role, SchedulingInputs,
    SchedulingResult, SkillLevel, Worker,
};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::compute_with;

/// One way of relaxing the inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ExtendDeadline,
    AddHelper,
    RelaxRisk,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::ExtendDeadline, Strategy::AddHelper, Strategy::RelaxRisk];

    /// Build and preview this strategy's alternative, if it clears every conflict
    pub fn evaluate(
        self,
        inputs: &SchedulingInputs,
        result: &SchedulingResult,
        config: &EngineConfig,
    ) -> Option<RemediationSuggestion> {
        let suggestion = match self {
            Strategy::ExtendDeadline => extend_deadline(inputs, config),
            Strategy::AddHelper => add_helper(inputs, result, config),
            Strategy::RelaxRisk => relax_risk(inputs, config),
        };
        match &suggestion {
            Some(s) => info!(strategy = ?self, description = %s.description, "remediation found"),
            None => debug!(strategy = ?self, "strategy does not clear all conflicts"),
        }
        suggestion
    }
}

/// Suggest remediations with the default engine settings
pub fn suggest_remediations(
    inputs: &SchedulingInputs,
    result: &SchedulingResult,
) -> Vec<RemediationSuggestion> {
    suggest_with(inputs, result, &EngineConfig::default())
}

/// Suggest remediations for a draft. Empty when the draft has no conflicts.
pub fn suggest_with(
    inputs: &SchedulingInputs,
    result: &SchedulingResult,
    config: &EngineConfig,
) -> Vec<RemediationSuggestion> {
    if !result.has_conflicts() {
        return Vec::new();
    }

    Strategy::ALL
        .par_iter()
        .filter_map(|strategy| strategy.evaluate(inputs, result, config))
        .collect()
}

/// Preview `candidate`; `Some` only when the result is conflict-free
fn preview(candidate: &SchedulingInputs, config: &EngineConfig) -> Option<SchedulingResult> {
    compute_with(candidate, config)
        .ok()
        .filter(|r| !r.has_conflicts())
}

fn suggestion(
    kind: RemediationKind,
    description: String,
    inputs: SchedulingInputs,
    preview: SchedulingResult,
) -> RemediationSuggestion {
    RemediationSuggestion {
        kind,
        description,
        inputs,
        preview,
    }
}

// ============================================================================
// (a) Extend the drop-dead date
// ============================================================================

fn extend_deadline(inputs: &SchedulingInputs, config: &EngineConfig) -> Option<RemediationSuggestion> {
    let max = u64::try_from(config.max_extension_days).ok().filter(|&m| m > 0)?;

    let attempt = |days: u64| -> Option<(SchedulingInputs, SchedulingResult)> {
        let mut candidate = inputs.clone();
        candidate.drop_dead_date = inputs.drop_dead_date.checked_add_days(Days::new(days))?;
        let result = preview(&candidate, config)?;
        Some((candidate, result))
    };

    // Double until something works, then bisect down to the smallest extension
    let mut failing = 0;
    let mut passing = 1;
    let mut best = loop {
        if let Some(found) = attempt(passing) {
            break found;
        }
        if passing >= max {
            return None;
        }
        failing = passing;
        passing = (passing * 2).min(max);
    };

    while passing - failing > 1 {
        let mid = failing + (passing - failing) / 2;
        match attempt(mid) {
            Some(found) => {
                passing = mid;
                best = found;
            }
            None => failing = mid,
        }
    }

    let (candidate, result) = best;
    let days = i64::try_from(passing).unwrap_or(i64::MAX);
    Some(suggestion(
        RemediationKind::ExtendDeadline { days },
        format!(
            "Extend the drop-dead date by {days} day{} to {}",
            if days == 1 { "" } else { "s" },
            candidate.drop_dead_date
        ),
        candidate,
        result,
    ))
}

// ============================================================================
// (b) Add a helper
// ============================================================================

/// Working time the draft failed to place, or failed to finish in time
fn deficit(result: &SchedulingResult) -> Duration {
    let unplaced: Duration = result
        .conflicts()
        .filter(|t| !t.is_placed())
        .map(|t| t.duration)
        .sum();
    if !unplaced.is_zero() {
        return unplaced;
    }
    result
        .conflicts()
        .filter(|t| t.conflict_reason == Some(ConflictReason::MissesDeadline))
        .map(|t| t.duration)
        .sum()
}

fn helper_id(inputs: &SchedulingInputs) -> String {
    (1..)
        .map(|n| format!("helper-{n}"))
        .find(|id| inputs.get_worker(id).is_none())
        .unwrap_or_else(|| "helper".to_string())
}

fn add_helper(
    inputs: &SchedulingInputs,
    result: &SchedulingResult,
    config: &EngineConfig,
) -> Option<RemediationSuggestion> {
    let hours = deficit(result);
    if hours.is_zero() {
        return None;
    }

    let skill = result
        .conflicts()
        .filter_map(|t| inputs.get_task(&t.task_id))
        .filter_map(|t| t.required_skill())
        .max()
        .unwrap_or(SkillLevel::Intermediate);

    let id = helper_id(inputs);
    let hours_available = inputs.site_constraints.weekday_hours;
    let helper = Worker::new(id.clone())
        .name("Additional helper")
        .role(Role::Helper)
        .skill(skill)
        .max_hours(hours.as_hours())
        .working_hours(hours_available);

    let mut candidate = inputs.clone();
    candidate.workers.push(helper);
    let result = preview(&candidate, config)?;

    Some(suggestion(
        RemediationKind::AddHelper {
            hours: hours.as_hours(),
        },
        format!("Add helper {id} ({skill}) for {hours} on weekdays {hours_available}"),
        candidate,
        result,
    ))
}

// ============================================================================
// (c) Relax risk tolerance
// ============================================================================

fn relax_risk(inputs: &SchedulingInputs, config: &EngineConfig) -> Option<RemediationSuggestion> {
    let from = inputs.risk_tolerance;
    let to = from.relaxed()?;

    let mut candidate = inputs.clone();
    candidate.risk_tolerance = to;
    let result = preview(&candidate, config)?;

    Some(suggestion(
        RemediationKind::RelaxRisk { to },
        format!("Relax risk tolerance from {from} to {to}"),
        candidate,
        result,
    ))
}
