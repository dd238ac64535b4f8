//! Python bindings, built with the `python` feature.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::time::Duration;

use crate::buffer;
use crate::config::CcpmConfig;
use crate::engine::{ScheduleEngine, ScheduleResult};
use crate::errors::ScheduleError;
use crate::models::{BufferStatus, Project, ProjectSnapshot, Task, TaskId, TaskStatus};

/// Project id used for the ad-hoc snapshots built from Python task lists.
const SCRATCH_PROJECT: i64 = 0;

fn to_py_err(err: ScheduleError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Task record (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: i64,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub estimated_time: f64,
    #[pyo3(get, set)]
    pub buffer_time: f64,
    #[pyo3(get, set)]
    pub actual_time: Option<f64>,
    #[pyo3(get, set)]
    pub status: String,
    #[pyo3(get, set)]
    pub completion_percentage: f64,
    #[pyo3(get, set)]
    pub predecessors: Vec<i64>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (
        id,
        estimated_time,
        predecessors=None,
        name=None,
        buffer_time=0.0,
        actual_time=None,
        status=None,
        completion_percentage=0.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        id: i64,
        estimated_time: f64,
        predecessors: Option<Vec<i64>>,
        name: Option<String>,
        buffer_time: f64,
        actual_time: Option<f64>,
        status: Option<String>,
        completion_percentage: f64,
    ) -> Self {
        Self {
            id,
            name: name.unwrap_or_default(),
            estimated_time,
            buffer_time,
            actual_time,
            status: status.unwrap_or_else(|| TaskStatus::NotStarted.as_str().to_string()),
            completion_percentage,
            predecessors: predecessors.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={}, estimated_time={}, status={:?}, deps={})",
            self.id,
            self.estimated_time,
            self.status,
            self.predecessors.len()
        )
    }
}

impl PyTask {
    fn to_task(&self) -> PyResult<Task> {
        let status: TaskStatus = self.status.parse().map_err(PyValueError::new_err)?;
        Ok(Task {
            id: self.id,
            name: self.name.clone(),
            project_id: Some(SCRATCH_PROJECT),
            estimated_time: self.estimated_time,
            buffer_time: self.buffer_time,
            actual_time: self.actual_time,
            status,
            completion_percentage: self.completion_percentage,
            predecessors: self.predecessors.clone(),
            ..Default::default()
        })
    }
}

/// Engine configuration (PyO3 wrapper).
#[pyclass(name = "CcpmConfig")]
#[derive(Clone, Debug)]
pub struct PyCcpmConfig {
    #[pyo3(get, set)]
    pub buffer_factor: f64,
    #[pyo3(get, set)]
    pub max_paths: usize,
    /// Enumeration deadline in milliseconds (None = unlimited).
    #[pyo3(get, set)]
    pub deadline_ms: Option<u64>,
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl PyCcpmConfig {
    #[new]
    #[pyo3(signature = (buffer_factor=None, max_paths=None, deadline_ms=None, verbosity=None))]
    fn new(
        buffer_factor: Option<f64>,
        max_paths: Option<usize>,
        deadline_ms: Option<u64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = CcpmConfig::default();
        Self {
            buffer_factor: buffer_factor.unwrap_or(defaults.buffer_factor),
            max_paths: max_paths.unwrap_or(defaults.max_paths),
            deadline_ms,
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CcpmConfig(buffer_factor={}, max_paths={}, deadline_ms={:?})",
            self.buffer_factor, self.max_paths, self.deadline_ms
        )
    }
}

impl From<&PyCcpmConfig> for CcpmConfig {
    fn from(config: &PyCcpmConfig) -> Self {
        Self {
            buffer_factor: config.buffer_factor,
            max_paths: config.max_paths,
            enumeration_deadline: config.deadline_ms.map(Duration::from_millis),
            verbosity: config.verbosity,
        }
    }
}

fn schedule(tasks: &[PyTask], config: Option<&PyCcpmConfig>) -> PyResult<ScheduleResult> {
    let tasks = tasks.iter().map(PyTask::to_task).collect::<PyResult<Vec<_>>>()?;
    let snapshot = ProjectSnapshot::new(Project::new(SCRATCH_PROJECT, ""), tasks);
    let engine = ScheduleEngine::new(config.map(CcpmConfig::from).unwrap_or_default());
    engine.compute_schedule(&snapshot).map_err(to_py_err)
}

/// Compute the critical chain.
///
/// # Returns
/// * (task ids in chain order, total estimated hours); empty for no tasks
///
/// # Raises
/// * ValueError on unknown predecessors, cycles, or oversized graphs
#[pyfunction]
#[pyo3(signature = (tasks, config=None))]
fn calculate_critical_chain(
    tasks: Vec<PyTask>,
    config: Option<PyCcpmConfig>,
) -> PyResult<(Vec<TaskId>, f64)> {
    let result = schedule(&tasks, config.as_ref())?;
    Ok((result.critical_chain.tasks, result.critical_chain.duration))
}

/// Identify feeding chains as (segment task ids, merge task id) pairs.
#[pyfunction]
#[pyo3(signature = (tasks, config=None))]
fn identify_feeding_chains(
    tasks: Vec<PyTask>,
    config: Option<PyCcpmConfig>,
) -> PyResult<Vec<(Vec<TaskId>, TaskId)>> {
    let result = schedule(&tasks, config.as_ref())?;
    Ok(result
        .feeding_chains
        .into_iter()
        .map(|c| (c.tasks, c.merge_task_id))
        .collect())
}

/// Size a project buffer from critical chain durations.
#[pyfunction]
#[pyo3(signature = (task_durations, buffer_factor=0.5))]
fn calculate_project_buffer(task_durations: Vec<f64>, buffer_factor: f64) -> f64 {
    buffer::buffer_size(task_durations, buffer_factor)
}

/// Size a feeding buffer from feeding chain durations.
#[pyfunction]
#[pyo3(signature = (task_durations, buffer_factor=0.5))]
fn calculate_feeding_buffer(task_durations: Vec<f64>, buffer_factor: f64) -> f64 {
    buffer::buffer_size(task_durations, buffer_factor)
}

/// Classify a consumption percentage as "green", "yellow" or "red".
#[pyfunction]
fn calculate_buffer_status(buffer_consumption: f64) -> &'static str {
    BufferStatus::from_consumption(buffer_consumption).as_str()
}

/// Forecast a completion date from progress and buffer consumption.
#[pyfunction]
fn estimated_completion_date(
    project_progress: f64,
    buffer_consumption: f64,
    start_date: NaiveDate,
    target_end_date: NaiveDate,
    today: NaiveDate,
) -> Option<NaiveDate> {
    buffer::estimated_completion_date(
        project_progress,
        buffer_consumption,
        start_date,
        target_end_date,
        today,
    )
}

/// The ccpm_rust Python module.
#[pymodule]
fn ccpm_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_class::<PyCcpmConfig>()?;

    m.add_function(wrap_pyfunction!(calculate_critical_chain, m)?)?;
    m.add_function(wrap_pyfunction!(identify_feeding_chains, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_project_buffer, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_feeding_buffer, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_buffer_status, m)?)?;
    m.add_function(wrap_pyfunction!(estimated_completion_date, m)?)?;

    Ok(())
}
