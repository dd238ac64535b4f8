//! Stateless schedule engine.
//!
//! Every entry point takes a full [`ProjectSnapshot`] and returns a full
//! [`ProjectUpdate`]; nothing is carried between calls, so one engine can
//! serve any number of projects concurrently.

use rustc_hash::FxHashMap;

use crate::buffer::{buffer_size, chain_reading, task_reading};
use crate::chain::{
    critical_flags, identify_feeding_chains, select_critical_chain, CriticalChain, FeedingChain,
};
use crate::config::CcpmConfig;
use crate::errors::Result;
use crate::graph::DependencyGraph;
use crate::models::{
    BufferReading, FeedingBuffer, FeedingBufferId, ProjectSnapshot, Task, TaskId,
};
use crate::paths::enumerate_paths;
use crate::{log_changes, log_checks};

/// Derived chain structure for one project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleResult {
    pub critical_chain: CriticalChain,
    /// Membership flag for every project task, ascending by id.
    pub critical_flags: Vec<(TaskId, bool)>,
    pub feeding_chains: Vec<FeedingChain>,
}

/// Feeding buffer records after a recomputation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedingBufferPlan {
    /// Every buffer the project should have; `id` is `None` for new ones.
    pub buffers: Vec<FeedingBuffer>,
    /// Stored buffers whose feeding chain no longer exists.
    pub removed: Vec<FeedingBufferId>,
}

/// One logical write for a project. `None` sections are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectUpdate {
    pub critical_flags: Option<Vec<(TaskId, bool)>>,
    pub project_buffer: Option<f64>,
    pub project_reading: Option<BufferReading>,
    pub feeding_buffers: Option<FeedingBufferPlan>,
    /// Per-task consumption of each task's own buffer.
    pub task_consumption: Vec<(TaskId, f64)>,
}

/// Consumption measured against a given chain membership and buffer sizes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsumptionReport {
    pub project: BufferReading,
    /// Parallel to the feeding buffers that were measured.
    pub feeding: Vec<BufferReading>,
    pub tasks: Vec<(TaskId, f64)>,
}

/// Critical chain engine.
#[derive(Clone, Debug, Default)]
pub struct ScheduleEngine {
    config: CcpmConfig,
}

impl ScheduleEngine {
    pub fn new(config: CcpmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CcpmConfig {
        &self.config
    }

    /// Build the graph, enumerate paths, and select the critical and feeding chains.
    ///
    /// A project without tasks yields an empty chain rather than an error.
    pub fn compute_schedule(&self, snapshot: &ProjectSnapshot) -> Result<ScheduleResult> {
        let verbosity = self.config.verbosity;
        let graph = DependencyGraph::build(snapshot.project_tasks())?;
        let paths = enumerate_paths(&graph, &self.config)?;
        log_checks!(
            verbosity,
            "project {}: {} tasks, {} paths",
            snapshot.project.id,
            graph.len(),
            paths.len()
        );

        let Some((winner, critical_chain)) = select_critical_chain(&graph, &paths, verbosity)
        else {
            log_changes!(verbosity, "project {}: no critical chain", snapshot.project.id);
            return Ok(ScheduleResult::default());
        };
        log_changes!(
            verbosity,
            "project {}: critical chain {:?} ({:.2}h)",
            snapshot.project.id,
            critical_chain.tasks,
            critical_chain.duration
        );

        let feeding_chains = identify_feeding_chains(&graph, &paths, &paths[winner], verbosity);
        let critical_flags = critical_flags(&graph, &critical_chain);

        Ok(ScheduleResult {
            critical_chain,
            critical_flags,
            feeding_chains,
        })
    }

    /// Size the project buffer and one feeding buffer per feeding chain.
    ///
    /// Existing records whose (segment, merge task) match a chain keep their
    /// id, name and last reading; the rest are created or listed as removed.
    pub fn plan_buffers(
        &self,
        snapshot: &ProjectSnapshot,
        critical: &[TaskId],
        feeding: &[FeedingChain],
    ) -> (f64, FeedingBufferPlan) {
        let lookup = task_lookup(snapshot);
        let factor = self.config.buffer_factor;

        let project_buffer = buffer_size(estimates(&lookup, critical), factor);
        log_changes!(
            self.config.verbosity,
            "project {}: project buffer {:.2}h",
            snapshot.project.id,
            project_buffer
        );

        let mut matched = vec![false; snapshot.feeding_buffers.len()];
        let mut buffers = Vec::with_capacity(feeding.len());
        for chain in feeding {
            let size = buffer_size(estimates(&lookup, &chain.tasks), factor);
            let existing = snapshot.feeding_buffers.iter().enumerate().position(|(i, b)| {
                !matched[i] && b.merge_task_id == chain.merge_task_id && b.tasks == chain.tasks
            });
            let buffer = match existing {
                Some(i) => {
                    matched[i] = true;
                    FeedingBuffer {
                        buffer_size: size,
                        ..snapshot.feeding_buffers[i].clone()
                    }
                }
                None => FeedingBuffer {
                    id: None,
                    name: feeding_buffer_name(&lookup, chain.merge_task_id),
                    project_id: snapshot.project.id,
                    tasks: chain.tasks.clone(),
                    merge_task_id: chain.merge_task_id,
                    buffer_size: size,
                    ..Default::default()
                },
            };
            buffers.push(buffer);
        }

        let removed = snapshot
            .feeding_buffers
            .iter()
            .zip(&matched)
            .filter(|(_, &kept)| !kept)
            .filter_map(|(b, _)| b.id)
            .collect();

        (project_buffer, FeedingBufferPlan { buffers, removed })
    }

    /// Measure consumption of the project, feeding and per-task buffers.
    pub fn measure_consumption(
        &self,
        snapshot: &ProjectSnapshot,
        critical: &[TaskId],
        project_buffer: f64,
        feeding_buffers: &[FeedingBuffer],
    ) -> ConsumptionReport {
        let lookup = task_lookup(snapshot);

        let project = chain_reading(members(&lookup, critical), project_buffer);
        log_changes!(
            self.config.verbosity,
            "project {}: buffer consumption {:.1}% ({})",
            snapshot.project.id,
            project.consumption(),
            project.status()
        );

        let feeding = feeding_buffers
            .iter()
            .map(|b| chain_reading(members(&lookup, &b.tasks), b.buffer_size))
            .collect();

        let mut tasks: Vec<(TaskId, f64)> = lookup
            .values()
            .map(|t| (t.id, task_reading(t).consumption()))
            .collect();
        tasks.sort_by_key(|&(id, _)| id);

        ConsumptionReport {
            project,
            feeding,
            tasks,
        }
    }

    /// Full re-derivation after a task or dependency change.
    ///
    /// Chain membership, buffer sizes and readings all come from this run;
    /// stored derived fields in the snapshot are ignored.
    pub fn recompute(&self, snapshot: &ProjectSnapshot) -> Result<ProjectUpdate> {
        let schedule = self.compute_schedule(snapshot)?;
        let critical = &schedule.critical_chain.tasks;
        let (project_buffer, plan) = self.plan_buffers(snapshot, critical, &schedule.feeding_chains);
        let mut update = self.measured_update(snapshot, critical, project_buffer, plan);
        update.critical_flags = Some(schedule.critical_flags);
        Ok(update)
    }

    /// Re-size buffers for the stored chain membership and feeding records.
    pub fn resize_buffers(&self, snapshot: &ProjectSnapshot) -> ProjectUpdate {
        let critical = stored_critical(snapshot);
        let feeding: Vec<FeedingChain> = snapshot
            .feeding_buffers
            .iter()
            .map(|b| FeedingChain {
                tasks: b.tasks.clone(),
                merge_task_id: b.merge_task_id,
            })
            .collect();
        let (project_buffer, plan) = self.plan_buffers(snapshot, &critical, &feeding);
        self.measured_update(snapshot, &critical, project_buffer, plan)
    }

    /// Refresh readings after a task start, completion or progress change.
    pub fn monitor_consumption(&self, snapshot: &ProjectSnapshot) -> ProjectUpdate {
        let critical = stored_critical(snapshot);
        let plan = FeedingBufferPlan {
            buffers: snapshot.feeding_buffers.clone(),
            removed: Vec::new(),
        };
        let mut update =
            self.measured_update(snapshot, &critical, snapshot.project.project_buffer, plan);
        update.project_buffer = None;
        update
    }

    fn measured_update(
        &self,
        snapshot: &ProjectSnapshot,
        critical: &[TaskId],
        project_buffer: f64,
        mut plan: FeedingBufferPlan,
    ) -> ProjectUpdate {
        let report = self.measure_consumption(snapshot, critical, project_buffer, &plan.buffers);
        for (buffer, reading) in plan.buffers.iter_mut().zip(report.feeding) {
            buffer.set_reading(reading);
        }
        ProjectUpdate {
            critical_flags: None,
            project_buffer: Some(project_buffer),
            project_reading: Some(report.project),
            feeding_buffers: Some(plan),
            task_consumption: report.tasks,
        }
    }
}

fn task_lookup(snapshot: &ProjectSnapshot) -> FxHashMap<TaskId, &Task> {
    snapshot.project_tasks().map(|t| (t.id, t)).collect()
}

fn members<'a>(
    lookup: &'a FxHashMap<TaskId, &'a Task>,
    ids: &'a [TaskId],
) -> impl Iterator<Item = &'a Task> + 'a {
    ids.iter().filter_map(|id| lookup.get(id).copied())
}

fn estimates<'a>(
    lookup: &'a FxHashMap<TaskId, &'a Task>,
    ids: &'a [TaskId],
) -> impl Iterator<Item = f64> + 'a {
    members(lookup, ids).map(|t| t.estimated_time)
}

fn stored_critical(snapshot: &ProjectSnapshot) -> Vec<TaskId> {
    snapshot
        .project_tasks()
        .filter(|t| t.is_critical_chain)
        .map(|t| t.id)
        .collect()
}

fn feeding_buffer_name(lookup: &FxHashMap<TaskId, &Task>, merge_task_id: TaskId) -> String {
    match lookup.get(&merge_task_id) {
        Some(task) if !task.name.is_empty() => format!("Feeding buffer for {}", task.name),
        _ => format!("Feeding buffer for task {}", merge_task_id),
    }
}
