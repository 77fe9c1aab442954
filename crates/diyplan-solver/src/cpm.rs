//! Critical-path analysis over a placed schedule
//!
//! The forward pass is the placement itself: a task's target completion is
//! simply where it was booked to end. This module runs the backward pass
//! from the drop-dead date and flags placed tasks that overrun it.
//!
//! # Algorithm
//!
//! 1. Topological order (done in dag.rs)
//! 2. Backward pass: latest completion per task, in reverse order
//! 3. Deadline check: placed end > latest completion => conflict
//! 4. Critical chain: walk back from the last finisher through the
//!    predecessor that finished last

use std::cmp::Reverse;

use chrono::NaiveDateTime;
use diyplan_core::{ConflictReason, ScheduledTask, TaskId};

use crate::dag::DependencyGraph;

/// Fill in target/latest completion and flag deadline misses.
///
/// `rows` must be aligned with the graph's node indices (input order).
/// `deadline` is the exclusive end of the drop-dead day.
pub fn annotate(rows: &mut [ScheduledTask], graph: &DependencyGraph, deadline: NaiveDateTime) {
    let latest = backward_pass(rows, graph, deadline);

    for (row, latest) in rows.iter_mut().zip(latest) {
        row.latest_completion_date = latest;
        row.target_completion_date = row.end_time;
        if let Some(end) = row.end_time {
            if end > latest {
                row.flag_conflict(ConflictReason::MissesDeadline);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════
// BACKWARD PASS
// ════════════════════════════════════════════════════════════════════════
//
// For each task in reverse topological order:
//   no dependents => latest = deadline
//   otherwise     => latest = min(deadline, min(dependent.latest - dependent.duration))
//
// Durations are working time; subtracting them from wall-clock instants
// gives the tightest bound that ignores calendar gaps.

fn backward_pass(
    rows: &[ScheduledTask],
    graph: &DependencyGraph,
    deadline: NaiveDateTime,
) -> Vec<NaiveDateTime> {
    let mut latest = vec![deadline; graph.len()];

    for &node in graph.topo_order.iter().rev() {
        let bound = graph.successors[node]
            .iter()
            .filter_map(|&succ| latest[succ].checked_sub_signed(rows[succ].duration.to_chrono()))
            .min();
        if let Some(bound) = bound {
            latest[node] = latest[node].min(bound);
        }
    }

    latest
}

/// Chain of tasks that determines the project finish, first to last.
///
/// Starts at the placed task that ends last and repeatedly steps to the
/// predecessor that ended last. Empty when nothing was placed.
pub fn critical_chain(rows: &[ScheduledTask], graph: &DependencyGraph) -> Vec<TaskId> {
    let last = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| row.end_time.map(|end| (end, Reverse(i))))
        .max()
        .map(|(_, Reverse(i))| i);

    let mut chain = Vec::new();
    let mut cursor = last;
    while let Some(node) = cursor {
        chain.push(rows[node].task_id.clone());
        cursor = graph.predecessors[node]
            .iter()
            .filter_map(|&p| rows[p].end_time.map(|end| (end, Reverse(p))))
            .max()
            .map(|(_, Reverse(p))| p);
    }

    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diyplan_core::{Duration, Interval, ScheduleStatus, Task};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn row(id: &str, hours: i64, span: Option<(NaiveDateTime, NaiveDateTime)>) -> ScheduledTask {
        let duration = Duration::hours(hours);
        match span {
            Some((start, end)) => ScheduledTask {
                task_id: id.into(),
                worker_id: Some("sam".into()),
                start_time: Some(start),
                end_time: Some(end),
                target_completion_date: None,
                latest_completion_date: NaiveDateTime::MAX,
                status: ScheduleStatus::Confirmed,
                conflict_reason: None,
                blocks: vec![Interval::new(start, end)],
                duration,
                cost: Decimal::ZERO,
            },
            None => ScheduledTask::unplaced(id, duration, ConflictReason::NoCapacity),
        }
    }

    fn chain_graph() -> DependencyGraph {
        DependencyGraph::from_tasks(&[
            Task::new("a"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("b"),
        ])
        .unwrap()
    }

    #[test]
    fn latest_completion_walks_back_from_deadline() {
        let graph = chain_graph();
        let mut rows = vec![
            row("a", 4, Some((at(6, 9), at(6, 13)))),
            row("b", 6, Some((at(7, 9), at(7, 15)))),
            row("c", 2, Some((at(8, 9), at(8, 11)))),
        ];
        annotate(&mut rows, &graph, at(10, 0));

        assert_eq!(rows[2].latest_completion_date, at(10, 0));
        assert_eq!(rows[1].latest_completion_date, at(9, 22));
        assert_eq!(rows[0].latest_completion_date, at(9, 16));
        assert!(rows.iter().all(|r| r.status == ScheduleStatus::Confirmed));
        assert!(rows
            .iter()
            .all(|r| r.latest_completion_date >= r.target_completion_date.unwrap()));
    }

    #[test]
    fn overrun_is_flagged_as_missed_deadline() {
        let graph = chain_graph();
        let mut rows = vec![
            row("a", 4, Some((at(6, 9), at(6, 13)))),
            row("b", 6, Some((at(9, 9), at(9, 15)))),
            row("c", 8, Some((at(10, 9), at(10, 17)))),
        ];
        annotate(&mut rows, &graph, at(10, 0));

        // c must finish by the deadline, b 8h before it
        assert_eq!(rows[2].conflict_reason, Some(ConflictReason::MissesDeadline));
        assert_eq!(rows[1].latest_completion_date, at(9, 16));
        assert_eq!(rows[1].status, ScheduleStatus::Confirmed);
        assert_eq!(rows[0].status, ScheduleStatus::Confirmed);
    }

    #[test]
    fn unplaced_rows_get_latest_but_no_target() {
        let graph = chain_graph();
        let mut rows = vec![
            row("a", 4, Some((at(6, 9), at(6, 13)))),
            row("b", 6, None),
            row("c", 2, None),
        ];
        annotate(&mut rows, &graph, at(10, 0));
        assert_eq!(rows[1].target_completion_date, None);
        assert_eq!(rows[1].latest_completion_date, at(9, 22));
        assert_eq!(rows[1].conflict_reason, Some(ConflictReason::NoCapacity));
    }

    #[test]
    fn tightest_dependent_wins() {
        let graph = DependencyGraph::from_tasks(&[
            Task::new("base"),
            Task::new("short").depends_on("base"),
            Task::new("long").depends_on("base"),
        ])
        .unwrap();
        let mut rows = vec![
            row("base", 1, Some((at(6, 9), at(6, 10)))),
            row("short", 1, Some((at(6, 10), at(6, 11)))),
            row("long", 10, Some((at(6, 11), at(7, 13)))),
        ];
        annotate(&mut rows, &graph, at(10, 0));
        assert_eq!(rows[0].latest_completion_date, at(9, 14));
    }

    #[test]
    fn critical_chain_follows_last_finishers() {
        let graph = DependencyGraph::from_tasks(&[
            Task::new("demo"),
            Task::new("permit"),
            Task::new("frame").depends_on("demo").depends_on("permit"),
            Task::new("paint"),
        ])
        .unwrap();
        let rows = vec![
            row("demo", 4, Some((at(6, 9), at(6, 13)))),
            row("permit", 1, Some((at(7, 9), at(7, 10)))),
            row("frame", 6, Some((at(7, 10), at(7, 16)))),
            row("paint", 2, Some((at(6, 13), at(6, 15)))),
        ];
        assert_eq!(critical_chain(&rows, &graph), vec!["permit", "frame"]);
    }
}
