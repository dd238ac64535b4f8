//! Root-to-sink path enumeration.
//!
//! Paths come out in a deterministic order: roots ascending by task id, then
//! depth-first with successors ascending by task id. The critical chain
//! tie-break relies on this order.

use std::time::Instant;

use crate::config::CcpmConfig;
use crate::errors::{Result, ScheduleError};
use crate::graph::DependencyGraph;
use crate::interner::NodeIdx;
use crate::log_debug;
use crate::models::TaskId;

/// How often (in traversal steps) the deadline is checked.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// One root-to-sink path as dense node indices.
pub type NodePath = Vec<NodeIdx>;

/// Enumerate every maximal path from a root to a sink.
///
/// Each path keeps its own visited set, so a node already on the current path
/// is never re-entered even if a cycle slipped past graph validation. A branch
/// whose only continuations are such revisits yields no path.
///
/// # Errors
/// * `GraphTooLarge` once more than `config.max_paths` paths are found
/// * `DeadlineExceeded` if `config.enumeration_deadline` elapses
pub fn enumerate_paths(graph: &DependencyGraph<'_>, config: &CcpmConfig) -> Result<Vec<NodePath>> {
    let deadline = config.enumeration_deadline.map(|d| Instant::now() + d);
    let mut paths: Vec<NodePath> = Vec::new();

    let mut on_path = vec![false; graph.len()];
    let mut path: NodePath = Vec::new();
    // Position of the next successor to try, parallel to `path`.
    let mut cursor: Vec<usize> = Vec::new();
    let mut steps: usize = 0;

    for root in graph.roots() {
        path.push(root);
        cursor.push(0);
        on_path[root as usize] = true;

        while let Some(&node) = path.last() {
            steps += 1;
            if steps % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return Err(ScheduleError::DeadlineExceeded {
                            explored: paths.len(),
                        });
                    }
                }
            }

            let succs = graph.successors(node);
            if succs.is_empty() {
                if paths.len() == config.max_paths {
                    return Err(ScheduleError::GraphTooLarge {
                        paths: paths.len() + 1,
                        limit: config.max_paths,
                    });
                }
                log_debug!(config.verbosity, "path found: {:?}", to_task_ids(graph, &path));
                paths.push(path.clone());
                pop(&mut path, &mut cursor, &mut on_path);
                continue;
            }

            let top = cursor.len() - 1;
            let next = succs[cursor[top]..]
                .iter()
                .position(|&s| !on_path[s as usize]);
            match next {
                Some(offset) => {
                    let child = succs[cursor[top] + offset];
                    cursor[top] += offset + 1;
                    path.push(child);
                    cursor.push(0);
                    on_path[child as usize] = true;
                }
                None => pop(&mut path, &mut cursor, &mut on_path),
            }
        }
    }

    Ok(paths)
}

fn pop(path: &mut NodePath, cursor: &mut Vec<usize>, on_path: &mut [bool]) {
    if let Some(node) = path.pop() {
        on_path[node as usize] = false;
    }
    cursor.pop();
}

/// Translate a node path back to task ids.
pub fn to_task_ids(graph: &DependencyGraph<'_>, path: &[NodeIdx]) -> Vec<TaskId> {
    path.iter().map(|&idx| graph.index().resolve(idx)).collect()
}
