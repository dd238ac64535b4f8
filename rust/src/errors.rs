//! Error types for schedule computation.

use thiserror::Error;

use crate::models::{ProjectId, TaskId};

/// Errors that can occur while deriving a project's schedule.
///
/// Buffer sizing and consumption never produce these: malformed numbers on a
/// single task degrade to zero contribution instead.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Task {task} depends on unknown task {missing}")]
    DanglingReference { task: TaskId, missing: TaskId },
    #[error("Circular dependency detected: {cycle:?}")]
    CyclicDependency { cycle: Vec<TaskId> },
    #[error("Dependency graph too large: {paths} paths exceed the limit of {limit}")]
    GraphTooLarge { paths: usize, limit: usize },
    #[error("Path enumeration deadline exceeded after {explored} paths")]
    DeadlineExceeded { explored: usize },
    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),
    #[error("Task {task} not found in project {project}")]
    TaskNotFound { project: ProjectId, task: TaskId },
    #[error("Recomputation already in progress for project {0}")]
    RecomputationInProgress(ProjectId),
    #[error("Storage error: {0}")]
    Storage(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ScheduleError {
    /// One task on the offending cycle, if this is a cycle error.
    pub fn cycle_member(&self) -> Option<TaskId> {
        match self {
            ScheduleError::CyclicDependency { cycle } => cycle.first().copied(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
