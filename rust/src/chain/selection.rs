//! Longest-path selection over the enumerated path set.

use crate::graph::DependencyGraph;
use crate::interner::NodeIdx;
use crate::log_checks;
use crate::models::{hours, TaskId};
use crate::paths::{to_task_ids, NodePath};

/// Durations closer than this are treated as a tie.
const DURATION_EPSILON: f64 = 1e-9;

/// The path governing project duration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalChain {
    /// Task ids in path order, root first.
    pub tasks: Vec<TaskId>,
    /// Sum of `estimated_time` over the chain, in hours.
    pub duration: f64,
}

impl CriticalChain {
    /// The neutral result for a project with no tasks.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.tasks.contains(&task_id)
    }
}

/// Sum of estimated hours along a path.
pub fn path_duration(graph: &DependencyGraph<'_>, path: &[NodeIdx]) -> f64 {
    path.iter()
        .map(|&idx| hours(graph.task(idx).estimated_time))
        .sum()
}

/// Pick the path with the greatest total duration.
///
/// Ties go to the path that appears first in `paths`, so the result is stable
/// across runs for the same input. Returns the winning index into `paths`
/// together with the chain, or `None` when there are no paths.
pub fn select_critical_chain(
    graph: &DependencyGraph<'_>,
    paths: &[NodePath],
    verbosity: u8,
) -> Option<(usize, CriticalChain)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, path) in paths.iter().enumerate() {
        let duration = path_duration(graph, path);
        log_checks!(verbosity, "path {} duration {:.2}h", i, duration);
        match best {
            Some((_, best_duration)) if duration <= best_duration + DURATION_EPSILON => {}
            _ => best = Some((i, duration)),
        }
    }

    best.map(|(i, duration)| {
        (
            i,
            CriticalChain {
                tasks: to_task_ids(graph, &paths[i]),
                duration,
            },
        )
    })
}

/// Critical chain membership for every task in the graph, ascending by id.
///
/// Every task gets an explicit flag so stale `true` values from an earlier
/// run are cleared.
pub fn critical_flags(graph: &DependencyGraph<'_>, chain: &CriticalChain) -> Vec<(TaskId, bool)> {
    let mut on_chain = vec![false; graph.len()];
    for &id in &chain.tasks {
        if let Some(idx) = graph.index().get(id) {
            on_chain[idx as usize] = true;
        }
    }
    (0..graph.len() as NodeIdx)
        .map(|idx| (graph.index().resolve(idx), on_chain[idx as usize]))
        .collect()
}
