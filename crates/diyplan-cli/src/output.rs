//! Text rendering for CLI output
//!
//! JSON output is the serde encoding of the result types; this module only
//! covers the human-readable table.

use std::fmt::{self, Write};

use chrono::NaiveDateTime;
use diyplan_core::{RemediationSuggestion, SchedulingResult};
use diyplan_solver::{cpm, DependencyGraph};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn time(t: Option<NaiveDateTime>) -> String {
    t.map_or_else(|| "-".to_string(), |t| t.format(TIME_FORMAT).to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Schedule table plus summary lines
pub fn render_schedule(
    result: &SchedulingResult,
    graph: &DependencyGraph,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let id_width = result
        .scheduled_tasks
        .iter()
        .map(|t| t.task_id.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let worker_width = result
        .scheduled_tasks
        .iter()
        .filter_map(|t| t.worker_id.as_ref().map(String::len))
        .max()
        .unwrap_or(6)
        .max(6);

    writeln!(out, "Schedule ({})", result.timezone)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<id_width$}  {:<worker_width$}  {:<16}  {:<16}  {:<16}  STATUS",
        "TASK", "WORKER", "START", "END", "LATEST"
    )?;

    for row in &result.scheduled_tasks {
        let status = match row.conflict_reason {
            Some(reason) => format!("{} ({})", row.status, reason),
            None => row.status.to_string(),
        };
        writeln!(
            out,
            "{:<id_width$}  {:<worker_width$}  {:<16}  {:<16}  {:<16}  {}",
            row.task_id,
            row.worker_id.as_deref().unwrap_or("-"),
            time(row.start_time),
            time(row.end_time),
            time(Some(row.latest_completion_date)),
            status
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Project finish: {}", time(result.project_finish))?;
    writeln!(out, "Target met: {}", yes_no(result.target_met))?;
    writeln!(out, "Total cost: {:.2}", result.total_cost)?;
    writeln!(out, "Conflicts: {}", result.conflict_count())?;

    let chain = cpm::critical_chain(&result.scheduled_tasks, graph);
    if !chain.is_empty() {
        writeln!(out, "Critical chain: {}", chain.join(" -> "))?;
    }

    let by_worker = result.assignments_by_worker();
    if !by_worker.is_empty() {
        writeln!(out)?;
        writeln!(out, "Hours by worker:")?;
        for (worker, hours) in result.worker_hours() {
            let count = by_worker.get(&worker).map_or(0, Vec::len);
            writeln!(out, "  {worker}: {hours:.1}h across {count} task(s)")?;
        }
    }

    Ok(out)
}

/// Numbered list of remediation previews
pub fn render_remediations(
    draft: &SchedulingResult,
    suggestions: &[RemediationSuggestion],
) -> Result<String, fmt::Error> {
    let mut out = String::new();

    if !draft.has_conflicts() {
        writeln!(out, "No conflicts: nothing to remediate")?;
        return Ok(out);
    }
    if suggestions.is_empty() {
        writeln!(
            out,
            "No single adjustment clears all {} conflict(s)",
            draft.conflict_count()
        )?;
        return Ok(out);
    }

    writeln!(
        out,
        "{} suggestion(s) for {} conflict(s):",
        suggestions.len(),
        draft.conflict_count()
    )?;
    for (i, suggestion) in suggestions.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, suggestion.description)?;
        writeln!(
            out,
            "   preview: finish {}, target met: {}",
            time(suggestion.preview.project_finish),
            yes_no(suggestion.preview.target_met)
        )?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diyplan_core::{RiskTolerance, SchedulingInputs, Task, Worker};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn request(worker_hours: f64) -> SchedulingInputs {
        let mut inputs = SchedulingInputs::new(day(6).and_hms_opt(8, 0, 0).unwrap(), day(10), day(13));
        inputs.risk_tolerance = RiskTolerance::Aggressive;
        inputs.tasks = vec![
            Task::new("demo").hours(8.0).min_block(2.0),
            Task::new("frame").hours(8.0).min_block(2.0).depends_on("demo"),
        ];
        inputs.workers.push(Worker::new("sam").max_hours(worker_hours));
        inputs
    }

    #[test]
    fn schedule_table_lists_rows_and_summary() {
        let inputs = request(40.0);
        let graph = diyplan_solver::validate(&inputs).unwrap();
        let result = diyplan_solver::compute(&inputs).unwrap();

        let text = render_schedule(&result, &graph).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Schedule (UTC)");
        assert!(lines[2].starts_with("TASK"));
        assert!(lines[3].starts_with("demo "));
        assert!(lines[4].starts_with("frame"));
        assert!(text.contains("Critical chain: demo -> frame"));
        assert!(text.contains("  sam: 16.0h across 2 task(s)"));
    }

    #[test]
    fn remediation_list_is_numbered() {
        let inputs = request(8.0);
        let draft = diyplan_solver::compute(&inputs).unwrap();
        let suggestions = diyplan_solver::suggest_remediations(&inputs, &draft);

        let text = render_remediations(&draft, &suggestions).unwrap();
        assert!(text.starts_with("1 suggestion(s) for 1 conflict(s):"));
        assert!(text.contains("1. Add helper helper-1"));
        assert!(text.contains("   preview: finish "));
    }
}
