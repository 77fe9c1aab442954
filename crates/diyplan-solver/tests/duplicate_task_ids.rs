use chrono::NaiveDate;
use diyplan_core::{ScheduleError, SchedulingInputs, Task, Worker};
use diyplan_solver::compute;

fn request(tasks: Vec<Task>) -> SchedulingInputs {
    let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
    let mut inputs = SchedulingInputs::new(day(6).and_hms_opt(8, 0, 0).unwrap(), day(10), day(17));
    inputs.tasks = tasks;
    inputs.workers.push(Worker::new("sam"));
    inputs
}

#[test]
fn duplicate_ids_are_fatal() {
    let inputs = request(vec![Task::new("alpha").hours(3.0), Task::new("alpha").hours(5.0)]);
    let err = compute(&inputs).unwrap_err();
    assert_eq!(err, ScheduleError::DuplicateTaskId("alpha".into()));
    assert!(err.to_string().contains("alpha"));
}

#[test]
fn duplicate_ids_in_same_phase_are_fatal() {
    let inputs = request(vec![
        Task::new("child").hours(2.0).phase("phase1"),
        Task::new("child").hours(4.0).phase("phase1"),
    ]);
    assert!(matches!(compute(&inputs), Err(ScheduleError::DuplicateTaskId(_))));
}

#[test]
fn same_title_different_ids_is_fine() {
    let inputs = request(vec![
        Task::new("paint-1").title("Paint"),
        Task::new("paint-2").title("Paint"),
    ]);
    assert_eq!(compute(&inputs).unwrap().scheduled_tasks.len(), 2);
}
