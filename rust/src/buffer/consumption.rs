//! Buffer consumption from task overruns.
//!
//! Only overruns consume buffer; finishing early never refunds it. Completed
//! tasks contribute `actual - estimated`, in-progress tasks contribute the
//! overrun projected from their completion percentage, and every other state
//! contributes nothing.

use crate::models::{hours, BufferReading, Task, TaskStatus};

/// Hours by which a task has overrun (or is projected to overrun) its estimate.
pub fn task_overrun(task: &Task) -> f64 {
    let estimated = hours(task.estimated_time);
    let actual = hours(task.actual_time.unwrap_or(0.0));

    match task.status {
        TaskStatus::Completed => (actual - estimated).max(0.0),
        TaskStatus::InProgress => {
            let pct = hours(task.completion_percentage).min(100.0);
            if pct == 0.0 {
                return 0.0;
            }
            let projected_total = actual / (pct / 100.0);
            (projected_total - estimated).max(0.0)
        }
        TaskStatus::NotStarted | TaskStatus::OnHold | TaskStatus::Cancelled => 0.0,
    }
}

/// Total overrun across a chain's tasks.
pub fn chain_overrun<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> f64 {
    tasks.into_iter().map(task_overrun).sum()
}

/// Overrun as a percentage of a buffer, capped at 100. A missing or zero
/// buffer reads as 0.
pub fn consumption_percentage(overrun: f64, buffer_size: f64) -> f64 {
    let buffer = hours(buffer_size);
    if buffer == 0.0 {
        return 0.0;
    }
    (hours(overrun) / buffer * 100.0).min(100.0)
}

/// Consumption reading for a chain against its buffer.
pub fn chain_reading<'a>(tasks: impl IntoIterator<Item = &'a Task>, buffer_size: f64) -> BufferReading {
    BufferReading::from_consumption(consumption_percentage(chain_overrun(tasks), buffer_size))
}

/// Consumption reading for a single task against its own `buffer_time`.
pub fn task_reading(task: &Task) -> BufferReading {
    if hours(task.estimated_time) == 0.0 {
        return BufferReading::default();
    }
    BufferReading::from_consumption(consumption_percentage(task_overrun(task), task.buffer_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BufferStatus;

    fn make_task(estimated: f64, status: TaskStatus, actual: Option<f64>, pct: f64) -> Task {
        Task {
            estimated_time: estimated,
            status,
            actual_time: actual,
            completion_percentage: pct,
            ..Task::new(1, "t", estimated)
        }
    }

    #[test]
    fn test_completed_overrun_caps_at_100() {
        // estimated 5h, buffer 2h, actual 7h: (7 - 5) / 2 = 100%
        let mut task = make_task(5.0, TaskStatus::Completed, Some(7.0), 100.0);
        task.buffer_time = 2.0;

        let reading = task_reading(&task);
        assert!((reading.consumption() - 100.0).abs() < 1e-9);
        assert_eq!(reading.status(), BufferStatus::Red);

        let reading = chain_reading([&task], 1.0);
        assert_eq!(reading.consumption(), 100.0);
    }

    #[test]
    fn test_early_finish_is_not_refunded() {
        let early = make_task(5.0, TaskStatus::Completed, Some(3.0), 100.0);
        let late = make_task(5.0, TaskStatus::Completed, Some(6.0), 100.0);
        assert_eq!(task_overrun(&early), 0.0);
        // Only the 1h overrun counts; the 2h saved elsewhere does not offset it.
        let reading = chain_reading([&early, &late], 4.0);
        assert!((reading.consumption() - 25.0).abs() < 1e-9);
        assert_eq!(reading.status(), BufferStatus::Green);
    }

    #[test]
    fn test_in_progress_projection() {
        // 3h spent at 50%: projected 6h against a 5h estimate
        let task = make_task(5.0, TaskStatus::InProgress, Some(3.0), 50.0);
        assert!((task_overrun(&task) - 1.0).abs() < 1e-9);

        let reading = chain_reading([&task], 2.0);
        assert!((reading.consumption() - 50.0).abs() < 1e-9);
        assert_eq!(reading.status(), BufferStatus::Yellow);
    }

    #[test]
    fn test_in_progress_on_track() {
        let task = make_task(10.0, TaskStatus::InProgress, Some(4.0), 50.0);
        assert_eq!(task_overrun(&task), 0.0);
    }

    #[test]
    fn test_zero_percent_contributes_nothing() {
        let task = make_task(5.0, TaskStatus::InProgress, Some(30.0), 0.0);
        assert_eq!(task_overrun(&task), 0.0);
    }

    #[test]
    fn test_not_started_and_off_ramps_contribute_nothing() {
        for status in [TaskStatus::NotStarted, TaskStatus::OnHold, TaskStatus::Cancelled] {
            let task = make_task(5.0, status, Some(50.0), 40.0);
            assert_eq!(task_overrun(&task), 0.0);
        }
    }

    #[test]
    fn test_zero_buffer_reads_zero() {
        let task = make_task(5.0, TaskStatus::Completed, Some(9.0), 100.0);
        assert_eq!(chain_reading([&task], 0.0).consumption(), 0.0);
        assert_eq!(task_reading(&task).consumption(), 0.0);
        assert_eq!(consumption_percentage(4.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_missing_estimate_reads_zero_for_task() {
        let mut task = make_task(0.0, TaskStatus::Completed, Some(9.0), 100.0);
        task.buffer_time = 2.0;
        assert_eq!(task_reading(&task), BufferReading::default());
    }
}
