//! Read and write contracts between the engine and persistence.
//!
//! The engine never talks to storage directly. A host implements
//! [`ScheduleSource`] and [`ScheduleSink`] over its own database;
//! [`MemoryStore`] is a complete in-process implementation.

use std::sync::{Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use crate::engine::ProjectUpdate;
use crate::errors::{Result, ScheduleError};
use crate::models::{FeedingBufferId, ProjectId, ProjectSnapshot, Task, TaskId};

/// Read side: everything needed to recompute one project.
pub trait ScheduleSource {
    /// The project record, its tasks with estimates, progress and
    /// predecessors, and its stored feeding buffers.
    fn load_project(&self, project_id: ProjectId) -> Result<ProjectSnapshot>;
}

/// Write side: apply one computed update as a single logical change.
pub trait ScheduleSink {
    fn apply(&self, project_id: ProjectId, update: ProjectUpdate) -> Result<()>;
}

/// In-memory project store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    projects: FxHashMap<ProjectId, ProjectSnapshot>,
    next_buffer_id: FeedingBufferId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|e| ScheduleError::Storage(e.to_string().into()))
    }

    /// Insert or replace a project.
    pub fn insert_project(&self, snapshot: ProjectSnapshot) -> Result<()> {
        let mut state = self.state()?;
        let max_id = snapshot
            .feeding_buffers
            .iter()
            .filter_map(|b| b.id)
            .max()
            .unwrap_or(0);
        state.next_buffer_id = state.next_buffer_id.max(max_id);
        state.projects.insert(snapshot.project.id, snapshot);
        Ok(())
    }

    /// Edit one task in place, e.g. with the [`crate::lifecycle`] transitions.
    pub fn update_task<F>(&self, project_id: ProjectId, task_id: TaskId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Task),
    {
        let mut state = self.state()?;
        let snapshot = state
            .projects
            .get_mut(&project_id)
            .ok_or(ScheduleError::ProjectNotFound(project_id))?;
        let task = snapshot
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(ScheduleError::TaskNotFound {
                project: project_id,
                task: task_id,
            })?;
        edit(task);
        Ok(())
    }
}

impl ScheduleSource for MemoryStore {
    fn load_project(&self, project_id: ProjectId) -> Result<ProjectSnapshot> {
        self.state()?
            .projects
            .get(&project_id)
            .cloned()
            .ok_or(ScheduleError::ProjectNotFound(project_id))
    }
}

impl ScheduleSink for MemoryStore {
    fn apply(&self, project_id: ProjectId, update: ProjectUpdate) -> Result<()> {
        let mut guard = self.state()?;
        let state = &mut *guard;
        let snapshot = state
            .projects
            .get_mut(&project_id)
            .ok_or(ScheduleError::ProjectNotFound(project_id))?;

        let consumption: FxHashMap<TaskId, f64> = update.task_consumption.into_iter().collect();
        let flags: Option<FxHashMap<TaskId, bool>> =
            update.critical_flags.map(|f| f.into_iter().collect());
        for task in snapshot
            .tasks
            .iter_mut()
            .filter(|t| t.project_id == Some(project_id))
        {
            if let Some(flags) = &flags {
                task.is_critical_chain = flags.get(&task.id).copied().unwrap_or(false);
            }
            if let Some(&value) = consumption.get(&task.id) {
                task.buffer_consumption = value;
            }
        }

        if let Some(size) = update.project_buffer {
            snapshot.project.project_buffer = size;
        }
        if let Some(reading) = update.project_reading {
            snapshot.project.set_reading(reading);
        }
        if let Some(plan) = update.feeding_buffers {
            let mut buffers = plan.buffers;
            for buffer in buffers.iter_mut().filter(|b| b.id.is_none()) {
                state.next_buffer_id += 1;
                buffer.id = Some(state.next_buffer_id);
            }
            snapshot.feeding_buffers = buffers;
        }
        Ok(())
    }
}
