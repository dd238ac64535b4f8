//! Completion date forecasting from progress and buffer consumption.

use chrono::{Days, NaiveDate};

use crate::models::{hours, Task, TaskStatus};

/// Percentage of estimated chain work done, weighting each task by its estimate.
///
/// Completed tasks count as fully done regardless of their stored percentage.
pub fn chain_progress<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> f64 {
    let (done, total) = tasks.into_iter().fold((0.0, 0.0), |(done, total), task| {
        let estimated = hours(task.estimated_time);
        let pct = match task.status {
            TaskStatus::Completed => 100.0,
            _ => hours(task.completion_percentage).min(100.0),
        };
        (done + estimated * pct / 100.0, total + estimated)
    });
    if total == 0.0 {
        0.0
    } else {
        done / total * 100.0
    }
}

/// Project an expected completion date.
///
/// Progress is compared with the share of the planned span already elapsed;
/// the resulting pace is then penalised by buffer consumption relative to
/// progress, and the remaining share of the span is stretched by that pace.
///
/// # Arguments
/// * `project_progress` - Percentage of the project completed (0-100)
/// * `buffer_consumption` - Percentage of the project buffer consumed (0-100)
/// * `start` / `target_end` - Planned span
/// * `today` - Reference date for elapsed time
///
/// # Returns
/// * `target_end` when no progress has been made, the project is done, or the
///   planned span is empty
/// * `None` if the projected date overflows the calendar
pub fn estimated_completion_date(
    project_progress: f64,
    buffer_consumption: f64,
    start: NaiveDate,
    target_end: NaiveDate,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if project_progress.is_nan() || project_progress <= 0.0 || project_progress >= 100.0 {
        return Some(target_end);
    }

    let total_days = (target_end - start).num_days() as f64;
    if total_days <= 0.0 {
        return Some(target_end);
    }

    let elapsed_days = (today - start).num_days() as f64;
    let expected_progress = elapsed_days / total_days * 100.0;
    let progress_ratio = if expected_progress <= 0.0 {
        1.0
    } else {
        project_progress / expected_progress
    };

    let buffer_impact = hours(buffer_consumption) / project_progress;
    let adjusted_ratio = progress_ratio * (1.0 - buffer_impact * 0.5);

    let remaining_days = (100.0 - project_progress) / 100.0 * total_days;
    let adjusted_remaining = if adjusted_ratio > 0.0 {
        remaining_days / adjusted_ratio
    } else {
        remaining_days * 2.0
    };
    if !adjusted_remaining.is_finite() {
        return None;
    }

    today.checked_add_days(Days::new(adjusted_remaining.floor() as u64))
}
