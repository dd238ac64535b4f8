//! Dependency graph construction and validation.
//!
//! Turns a flat task list with predecessor sets into successor adjacency over
//! dense node indices. Nodes are interned in ascending task id order, so every
//! ordering derived from node indices is also ascending by task id.

use crate::errors::{Result, ScheduleError};
use crate::interner::{NodeIdx, TaskIdInterner};
use crate::models::{Task, TaskId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Validated, acyclic snapshot of one project's dependencies.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    index: TaskIdInterner,
    tasks: Vec<&'a Task>,
    /// Direct successors (dependents) per node, ascending.
    successors: Vec<Vec<NodeIdx>>,
    /// Direct predecessors per node, ascending.
    predecessors: Vec<Vec<NodeIdx>>,
}

impl<'a> DependencyGraph<'a> {
    /// Build and validate the graph.
    ///
    /// Fails if a task id repeats, a predecessor is not among `tasks`, or the
    /// edges contain a cycle. Repeated edges are collapsed.
    pub fn build(tasks: impl IntoIterator<Item = &'a Task>) -> Result<Self> {
        let mut sorted: Vec<&'a Task> = tasks.into_iter().collect();
        sorted.sort_by_key(|t| t.id);

        let mut index = TaskIdInterner::with_capacity(sorted.len());
        for pair in sorted.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ScheduleError::DuplicateTask(pair[0].id));
            }
        }
        for task in &sorted {
            index.intern(task.id);
        }

        let n = sorted.len();
        let mut successors: Vec<Vec<NodeIdx>> = vec![Vec::new(); n];
        let mut predecessors: Vec<Vec<NodeIdx>> = vec![Vec::new(); n];

        for (idx, task) in sorted.iter().enumerate() {
            for &pred_id in &task.predecessors {
                let pred = index
                    .get(pred_id)
                    .ok_or(ScheduleError::DanglingReference {
                        task: task.id,
                        missing: pred_id,
                    })?;
                successors[pred as usize].push(idx as NodeIdx);
                predecessors[idx].push(pred);
            }
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        let graph = Self {
            index,
            tasks: sorted,
            successors,
            predecessors,
        };
        graph.check_acyclic()?;
        Ok(graph)
    }

    /// White/gray/black DFS; a gray successor is a back edge.
    fn check_acyclic(&self) -> Result<()> {
        let n = self.len();
        let mut color = vec![Color::White; n];
        // (node, position of the next successor to visit)
        let mut stack: Vec<(NodeIdx, usize)> = Vec::new();

        for start in 0..n as NodeIdx {
            if color[start as usize] != Color::White {
                continue;
            }
            color[start as usize] = Color::Gray;
            stack.push((start, 0));

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = stack[top];
                let succs = &self.successors[node as usize];
                if next < succs.len() {
                    let child = succs[next];
                    stack[top].1 += 1;
                    match color[child as usize] {
                        Color::White => {
                            color[child as usize] = Color::Gray;
                            stack.push((child, 0));
                        }
                        Color::Gray => {
                            let from = stack
                                .iter()
                                .position(|&(n, _)| n == child)
                                .unwrap_or(0);
                            let cycle = stack[from..]
                                .iter()
                                .map(|&(n, _)| self.index.resolve(n))
                                .collect();
                            return Err(ScheduleError::CyclicDependency { cycle });
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node as usize] = Color::Black;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn index(&self) -> &TaskIdInterner {
        &self.index
    }

    #[inline]
    pub fn task(&self, idx: NodeIdx) -> &'a Task {
        self.tasks[idx as usize]
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&'a Task> {
        self.index.get(id).map(|idx| self.task(idx))
    }

    #[inline]
    pub fn successors(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.successors[idx as usize]
    }

    #[inline]
    pub fn predecessors(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.predecessors[idx as usize]
    }

    /// Nodes without predecessors, ascending by task id.
    pub fn roots(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.len() as NodeIdx).filter(|&idx| self.predecessors(idx).is_empty())
    }

    /// Successor adjacency keyed by task id, ascending.
    pub fn adjacency(&self) -> Vec<(TaskId, Vec<TaskId>)> {
        (0..self.len() as NodeIdx)
            .map(|idx| {
                let succs = self
                    .successors(idx)
                    .iter()
                    .map(|&s| self.index.resolve(s))
                    .collect();
                (self.index.resolve(idx), succs)
            })
            .collect()
    }
}
