//! Root-sum-of-squares buffer sizing.

use crate::models::hours;

/// Size a buffer for a chain of task durations.
///
/// `buffer_factor * sqrt(sum(d^2))`. Uncertainty partially cancels across
/// independent tasks, so the buffer grows slower than the chain. Invalid
/// durations count as zero, which keeps the result non-decreasing in every
/// duration. Used unchanged for project and feeding buffers.
pub fn buffer_size(durations: impl IntoIterator<Item = f64>, buffer_factor: f64) -> f64 {
    let sum_of_squares: f64 = durations.into_iter().map(|d| hours(d).powi(2)).sum();
    sum_of_squares.sqrt() * hours(buffer_factor)
}
