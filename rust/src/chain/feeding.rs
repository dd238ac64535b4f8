//! Feeding chain identification.

use rustc_hash::FxHashSet;

use crate::graph::DependencyGraph;
use crate::interner::NodeIdx;
use crate::log_checks;
use crate::models::TaskId;
use crate::paths::{to_task_ids, NodePath};

/// A non-critical segment that joins the critical chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeedingChain {
    /// Segment in path order, excluding the merge task.
    pub tasks: Vec<TaskId>,
    /// First critical chain task reached from the segment.
    pub merge_task_id: TaskId,
}

/// Extract every feeding segment from the path set.
///
/// Walking a path, each maximal run of non-critical tasks that is followed by
/// a critical chain task is a feeding segment, and that task is its merge
/// point. For a path that starts off the chain this is exactly the prefix
/// before the first chain task. Runs that reach a sink without touching the
/// chain feed nothing. Distinct segments sharing a merge point are kept
/// separately; only literally identical (segment, merge) pairs are collapsed,
/// keeping the first occurrence.
pub fn identify_feeding_chains(
    graph: &DependencyGraph<'_>,
    paths: &[NodePath],
    critical: &[NodeIdx],
    verbosity: u8,
) -> Vec<FeedingChain> {
    let mut on_chain = vec![false; graph.len()];
    for &idx in critical {
        on_chain[idx as usize] = true;
    }

    let mut seen: FxHashSet<FeedingChain> = FxHashSet::default();
    let mut chains = Vec::new();

    for path in paths {
        if path.as_slice() == critical {
            continue;
        }
        let mut run_start: Option<usize> = None;
        for (i, &idx) in path.iter().enumerate() {
            if !on_chain[idx as usize] {
                run_start.get_or_insert(i);
                continue;
            }
            let Some(start) = run_start.take() else {
                continue;
            };
            let chain = FeedingChain {
                tasks: to_task_ids(graph, &path[start..i]),
                merge_task_id: graph.index().resolve(idx),
            };
            if seen.insert(chain.clone()) {
                log_checks!(
                    verbosity,
                    "feeding chain {:?} merges at {}",
                    chain.tasks,
                    chain.merge_task_id
                );
                chains.push(chain);
            }
        }
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::select_critical_chain;
    use crate::config::CcpmConfig;
    use crate::models::Task;
    use crate::paths::enumerate_paths;

    fn make_task(id: TaskId, duration: f64, deps: &[TaskId]) -> Task {
        Task::new(id, format!("t{}", id), duration).after(deps.iter().copied())
    }

    fn feeding(tasks: &[Task]) -> Vec<FeedingChain> {
        let graph = DependencyGraph::build(tasks).unwrap();
        let paths = enumerate_paths(&graph, &CcpmConfig::default()).unwrap();
        let (winner, _) = select_critical_chain(&graph, &paths, 0).unwrap();
        identify_feeding_chains(&graph, &paths, &paths[winner], 0)
    }

    #[test]
    fn test_branch_merging_into_chain() {
        // A(10) -> B(4) -> D(3), A -> C(2) -> D
        let tasks = vec![
            make_task(1, 10.0, &[]),
            make_task(2, 4.0, &[1]),
            make_task(3, 2.0, &[1]),
            make_task(4, 3.0, &[2, 3]),
        ];
        assert_eq!(
            feeding(&tasks),
            vec![FeedingChain {
                tasks: vec![3],
                merge_task_id: 4,
            }]
        );
    }

    #[test]
    fn test_one_path_leaves_and_rejoins_twice() {
        // Chain 1 -> 2 -> 3 -> 4 -> 5; side path 1 -> 10 -> 3 -> 11 -> 5.
        let tasks = vec![
            make_task(1, 10.0, &[]),
            make_task(2, 10.0, &[1]),
            make_task(3, 10.0, &[2, 10]),
            make_task(4, 10.0, &[3]),
            make_task(5, 10.0, &[4, 11]),
            make_task(10, 1.0, &[1]),
            make_task(11, 1.0, &[3]),
        ];
        assert_eq!(
            feeding(&tasks),
            vec![
                FeedingChain {
                    tasks: vec![11],
                    merge_task_id: 5,
                },
                FeedingChain {
                    tasks: vec![10],
                    merge_task_id: 3,
                },
            ]
        );
    }

    #[test]
    fn test_independent_root_feeds_chain() {
        // Chain 1 -> 2 -> 4; task 3 is its own root feeding into 4.
        let tasks = vec![
            make_task(1, 10.0, &[]),
            make_task(2, 4.0, &[1]),
            make_task(3, 2.0, &[]),
            make_task(4, 3.0, &[2, 3]),
        ];
        assert_eq!(
            feeding(&tasks),
            vec![FeedingChain {
                tasks: vec![3],
                merge_task_id: 4,
            }]
        );
    }

    #[test]
    fn test_two_segments_share_merge_point() {
        // Chain 1 -> 2 -> 3; feeders 10 -> 11 -> 2 and 20 -> 2.
        let tasks = vec![
            make_task(1, 20.0, &[]),
            make_task(2, 5.0, &[1, 11, 20]),
            make_task(3, 5.0, &[2]),
            make_task(10, 1.0, &[]),
            make_task(11, 1.0, &[10]),
            make_task(20, 1.0, &[]),
        ];
        assert_eq!(
            feeding(&tasks),
            vec![
                FeedingChain {
                    tasks: vec![10, 11],
                    merge_task_id: 2,
                },
                FeedingChain {
                    tasks: vec![20],
                    merge_task_id: 2,
                },
            ]
        );
    }

    #[test]
    fn test_identical_segments_collapse() {
        // Feeder 10 reaches chain task 2, which then forks to sinks 3 and 4:
        // both paths through 10 yield ([10], 2).
        let tasks = vec![
            make_task(1, 20.0, &[]),
            make_task(2, 5.0, &[1, 10]),
            make_task(3, 5.0, &[2]),
            make_task(4, 1.0, &[2]),
            make_task(10, 1.0, &[]),
        ];
        assert_eq!(
            feeding(&tasks),
            vec![FeedingChain {
                tasks: vec![10],
                merge_task_id: 2,
            }]
        );
    }

    #[test]
    fn test_disconnected_path_is_not_feeding() {
        let tasks = vec![
            make_task(1, 10.0, &[]),
            make_task(2, 1.0, &[]),
            make_task(3, 1.0, &[2]),
        ];
        assert!(feeding(&tasks).is_empty());
    }
}
