use std::collections::HashSet;

use ccpm_rust::chain::path_duration;
use ccpm_rust::paths::to_task_ids;
use ccpm_rust::{
    buffer_size, consumption_percentage, enumerate_paths, select_critical_chain, BufferStatus,
    CcpmConfig, DependencyGraph, Project, ProjectSnapshot, ScheduleEngine, Task,
};
use proptest::prelude::*;

// Strategy to generate a project whose tasks form a DAG.
// Acyclicity holds because task N may only depend on tasks 0..N-1.
fn dag_project_strategy(max_tasks: usize) -> impl Strategy<Value = ProjectSnapshot> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let estimates = proptest::collection::vec(0u32..40, num_tasks);
        let deps = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..3),
            num_tasks,
        );

        (estimates, deps).prop_map(move |(estimates, raw_deps)| {
            let tasks = raw_deps
                .into_iter()
                .zip(estimates)
                .enumerate()
                .map(|(i, (potential_deps, estimate))| {
                    // Sanitize dependencies: only allow deps < i
                    let valid: HashSet<i64> = if i == 0 {
                        HashSet::new()
                    } else {
                        potential_deps.into_iter().map(|d| (d % i) as i64).collect()
                    };
                    // Half-hour granularity keeps sums exact.
                    Task::new(i as i64, format!("task_{}", i), f64::from(estimate) / 2.0)
                        .in_project(1)
                        .after(valid)
                })
                .collect();
            ProjectSnapshot::new(Project::new(1, "generated"), tasks)
        })
    })
}

proptest! {
    #[test]
    fn test_critical_chain_is_longest_path(snapshot in dag_project_strategy(9)) {
        let config = CcpmConfig::default();
        let graph = DependencyGraph::build(snapshot.project_tasks()).unwrap();
        let paths = enumerate_paths(&graph, &config).unwrap();
        let (winner, chain) = select_critical_chain(&graph, &paths, 0).unwrap();

        prop_assert_eq!(&to_task_ids(&graph, &paths[winner]), &chain.tasks);
        for path in &paths {
            prop_assert!(path_duration(&graph, path) <= chain.duration + 1e-9);
        }
    }

    #[test]
    fn test_paths_run_root_to_sink(snapshot in dag_project_strategy(9)) {
        let graph = DependencyGraph::build(snapshot.project_tasks()).unwrap();
        let paths = enumerate_paths(&graph, &CcpmConfig::default()).unwrap();

        prop_assert!(!paths.is_empty());
        for path in &paths {
            prop_assert!(graph.predecessors(path[0]).is_empty());
            prop_assert!(graph.successors(path[path.len() - 1]).is_empty());
            for pair in path.windows(2) {
                prop_assert!(graph.successors(pair[0]).contains(&pair[1]));
            }
        }
    }

    #[test]
    fn test_feeding_chains_merge_into_critical_chain(snapshot in dag_project_strategy(9)) {
        let result = ScheduleEngine::default().compute_schedule(&snapshot).unwrap();
        let chain = &result.critical_chain;

        for feeding in &result.feeding_chains {
            prop_assert!(!feeding.tasks.is_empty());
            prop_assert!(chain.contains(feeding.merge_task_id));
            for &task_id in &feeding.tasks {
                prop_assert!(!chain.contains(task_id));
            }
        }

        let flagged: Vec<i64> = result
            .critical_flags
            .iter()
            .filter(|(_, on)| *on)
            .map(|&(id, _)| id)
            .collect();
        let mut expected = chain.tasks.clone();
        expected.sort_unstable();
        prop_assert_eq!(flagged, expected);
    }

    #[test]
    fn test_schedule_is_deterministic(snapshot in dag_project_strategy(9)) {
        let engine = ScheduleEngine::default();
        let first = engine.recompute(&snapshot).unwrap();

        let mut shuffled = snapshot.clone();
        shuffled.tasks.reverse();
        let second = engine.recompute(&shuffled).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_buffer_size_grows_with_durations(
        durations in proptest::collection::vec(0.0f64..100.0, 1..12),
        which in any::<prop::sample::Index>(),
        extra in 0.0f64..100.0,
        factor in 0.0f64..2.0,
    ) {
        let base = buffer_size(durations.iter().copied(), factor);
        let mut longer = durations.clone();
        let i = which.index(longer.len());
        longer[i] += extra;
        let grown = buffer_size(longer.iter().copied(), factor);
        prop_assert!(base >= 0.0);
        prop_assert!(grown + 1e-9 >= base);
    }

    #[test]
    fn test_consumption_is_bounded(overrun in -50.0f64..500.0, buffer in 0.0f64..100.0) {
        let pct = consumption_percentage(overrun, buffer);
        prop_assert!((0.0..=100.0).contains(&pct));
        if buffer > 0.0 && overrun >= buffer {
            prop_assert_eq!(pct, 100.0);
        }
        if overrun <= 0.0 {
            prop_assert_eq!(pct, 0.0);
        }
    }

    #[test]
    fn test_status_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(BufferStatus::from_consumption(low) <= BufferStatus::from_consumption(high));
    }
}
