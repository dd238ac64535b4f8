//! Task and project status transitions, and time tracking roll-up.
//!
//! These mutate caller-owned records; persisting them and re-running the
//! consumption monitor afterwards is the caller's job (see
//! [`crate::coordinator::ProjectCoordinator::on_progress_changed`]).

use chrono::NaiveDateTime;

use crate::models::{Project, ProjectStatus, Task, TaskId, TaskStatus, TimeEntry};

/// Mark a not-started task as started. Returns whether anything changed.
///
/// Tasks that are already running, completed, on hold or cancelled are left
/// alone.
pub fn start_task(task: &mut Task, now: NaiveDateTime) -> bool {
    if task.status != TaskStatus::NotStarted {
        return false;
    }
    task.status = TaskStatus::InProgress;
    task.start_date = Some(now);
    true
}

/// Mark a task as completed, forcing completion to 100%.
///
/// On-hold and cancelled tasks are terminal and cannot be completed.
pub fn complete_task(task: &mut Task, now: NaiveDateTime) -> bool {
    if matches!(
        task.status,
        TaskStatus::Completed | TaskStatus::OnHold | TaskStatus::Cancelled
    ) {
        return false;
    }
    task.status = TaskStatus::Completed;
    task.end_date = Some(now);
    task.completion_percentage = 100.0;
    true
}

/// Put a task on hold. Completed and cancelled tasks are left alone.
pub fn hold_task(task: &mut Task) -> bool {
    park(task, TaskStatus::OnHold)
}

/// Cancel a task. Completed tasks are left alone.
pub fn cancel_task(task: &mut Task) -> bool {
    park(task, TaskStatus::Cancelled)
}

fn park(task: &mut Task, status: TaskStatus) -> bool {
    match task.status {
        TaskStatus::Completed | TaskStatus::Cancelled => false,
        current if current == status => false,
        _ => {
            task.status = status;
            true
        }
    }
}

/// Record a new completion percentage, clamped to [0, 100].
///
/// Completion is treated as monotonic. A lower value is still stored, since
/// it is usually a correction, but it is logged because the in-progress
/// projection will jump.
pub fn update_progress(task: &mut Task, completion_percentage: f64) {
    let pct = if completion_percentage.is_nan() {
        0.0
    } else {
        completion_percentage.clamp(0.0, 100.0)
    };
    if pct < task.completion_percentage {
        tracing::warn!(
            task_id = task.id,
            previous = task.completion_percentage,
            current = pct,
            "completion percentage moved backwards"
        );
    }
    task.completion_percentage = pct;
}

/// Change a project's status; `actual_end_date` is set only on entering `Completed`.
pub fn update_project_status(project: &mut Project, status: ProjectStatus, now: NaiveDateTime) {
    if status == ProjectStatus::Completed && project.status != ProjectStatus::Completed {
        project.actual_end_date = Some(now);
    }
    project.status = status;
}

/// Open a time entry, optionally against a task.
pub fn open_entry(task_id: Option<TaskId>, now: NaiveDateTime) -> TimeEntry {
    TimeEntry {
        task_id,
        start_time: now,
        end_time: None,
        duration: None,
    }
}

/// Close an open entry and compute its duration in hours. Returns whether
/// the entry was open.
pub fn close_entry(entry: &mut TimeEntry, now: NaiveDateTime) -> bool {
    if entry.end_time.is_some() {
        return false;
    }
    entry.end_time = Some(now);
    let seconds = (now - entry.start_time).num_seconds().max(0) as f64;
    entry.duration = Some(seconds / 3600.0);
    true
}

/// Sum of closed entry durations for one task, in hours.
pub fn actual_time_from_entries(entries: &[TimeEntry], task_id: TaskId) -> f64 {
    entries
        .iter()
        .filter(|e| e.task_id == Some(task_id))
        .filter_map(|e| e.duration)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_start_then_complete() {
        let mut task = Task::new(1, "build", 4.0);
        task.completion_percentage = 40.0;

        assert!(start_task(&mut task, at(9, 0)));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.start_date, Some(at(9, 0)));
        assert!(!start_task(&mut task, at(10, 0)));
        assert_eq!(task.start_date, Some(at(9, 0)));

        assert!(complete_task(&mut task, at(17, 0)));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.end_date, Some(at(17, 0)));
        assert_eq!(task.completion_percentage, 100.0);
        assert!(!complete_task(&mut task, at(18, 0)));
    }

    #[test]
    fn test_off_ramps() {
        let mut task = Task::new(1, "build", 4.0);
        assert!(hold_task(&mut task));
        assert!(!hold_task(&mut task));
        assert!(cancel_task(&mut task));
        assert!(!hold_task(&mut task));

        let mut done = Task::new(2, "ship", 1.0);
        complete_task(&mut done, at(9, 0));
        assert!(!cancel_task(&mut done));
        assert_eq!(done.status, TaskStatus::Completed);
    }

    #[test]
    fn test_off_ramps_are_terminal() {
        let mut cancelled = Task::new(1, "build", 4.0);
        cancel_task(&mut cancelled);
        assert!(!start_task(&mut cancelled, at(9, 0)));
        assert!(!complete_task(&mut cancelled, at(9, 0)));
        assert_eq!(cancelled.status, TaskStatus::Cancelled);
        assert!(cancelled.start_date.is_none());

        let mut held = Task::new(2, "test", 2.0);
        start_task(&mut held, at(9, 0));
        hold_task(&mut held);
        assert!(!start_task(&mut held, at(10, 0)));
        assert!(!complete_task(&mut held, at(11, 0)));
        assert_eq!(held.status, TaskStatus::OnHold);
        assert!(held.end_date.is_none());
    }

    #[test]
    fn test_completed_task_cannot_restart() {
        let mut task = Task::new(1, "ship", 5.0);
        task.actual_time = Some(3.0);
        complete_task(&mut task, at(9, 0));

        assert!(!start_task(&mut task, at(10, 0)));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.start_date, None);
        assert_eq!(task.completion_percentage, 100.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut task = Task::new(1, "build", 4.0);
        update_progress(&mut task, 140.0);
        assert_eq!(task.completion_percentage, 100.0);
        update_progress(&mut task, -3.0);
        assert_eq!(task.completion_percentage, 0.0);
        update_progress(&mut task, f64::NAN);
        assert_eq!(task.completion_percentage, 0.0);
    }

    #[test]
    fn test_project_completion_sets_end_once() {
        let mut project = Project::new(1, "launch");
        update_project_status(&mut project, ProjectStatus::Active, at(8, 0));
        assert!(project.actual_end_date.is_none());

        update_project_status(&mut project, ProjectStatus::Completed, at(12, 0));
        assert_eq!(project.actual_end_date, Some(at(12, 0)));

        update_project_status(&mut project, ProjectStatus::Completed, at(13, 0));
        assert_eq!(project.actual_end_date, Some(at(12, 0)));
    }

    #[test]
    fn test_time_entries_roll_up() {
        let mut first = open_entry(Some(7), at(9, 0));
        assert!(close_entry(&mut first, at(10, 30)));
        assert!(!close_entry(&mut first, at(11, 0)));
        assert_eq!(first.duration, Some(1.5));

        let mut second = open_entry(Some(7), at(13, 0));
        close_entry(&mut second, at(13, 0) + Duration::minutes(45));
        let other = TimeEntry {
            task_id: Some(8),
            start_time: at(9, 0),
            end_time: Some(at(10, 0)),
            duration: Some(1.0),
        };
        let running = open_entry(Some(7), at(15, 0));

        let entries = vec![first, second, other, running];
        assert!((actual_time_from_entries(&entries, 7) - 2.25).abs() < 1e-9);
        assert!((actual_time_from_entries(&entries, 8) - 1.0).abs() < 1e-9);
    }
}
