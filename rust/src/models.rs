//! Core data types for critical chain scheduling.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use crate::config::{GREEN_LIMIT, YELLOW_LIMIT};

pub type TaskId = i64;
pub type ProjectId = i64;
pub type FeedingBufferId = i64;

/// Read an hour figure, treating NaN, infinite and negative values as zero.
#[inline]
pub fn hours(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Progress state of a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::OnHold => "on_hold",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(TaskStatus::NotStarted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "on_hold" => Ok(TaskStatus::OnHold),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("Unknown task status: {}", other)),
        }
    }
}

/// Lifecycle state of a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Completed,
    OnHold,
    Cancelled,
}

/// Three-level health signal derived from buffer consumption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferStatus {
    #[default]
    Green,
    Yellow,
    Red,
}

impl BufferStatus {
    /// Classify a consumption percentage: ≤33 green, ≤66 yellow, otherwise red.
    pub fn from_consumption(consumption: f64) -> Self {
        if consumption <= GREEN_LIMIT {
            BufferStatus::Green
        } else if consumption <= YELLOW_LIMIT {
            BufferStatus::Yellow
        } else {
            BufferStatus::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BufferStatus::Green => "green",
            BufferStatus::Yellow => "yellow",
            BufferStatus::Red => "red",
        }
    }
}

impl fmt::Display for BufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A consumption percentage paired with its status.
///
/// Only constructible through [`BufferReading::from_consumption`], so the two
/// fields can never disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BufferReading {
    consumption: f64,
    status: BufferStatus,
}

impl BufferReading {
    /// Clamp to [0, 100] (NaN reads as 0) and derive the status.
    pub fn from_consumption(consumption: f64) -> Self {
        let consumption = if consumption.is_nan() {
            0.0
        } else {
            consumption.clamp(0.0, 100.0)
        };
        Self {
            consumption,
            status: BufferStatus::from_consumption(consumption),
        }
    }

    pub fn consumption(&self) -> f64 {
        self.consumption
    }

    pub fn status(&self) -> BufferStatus {
        self.status
    }
}

/// A schedulable unit of work.
#[derive(Clone, Debug, Default)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Owning project; unattached tasks are ignored by chain computation.
    pub project_id: Option<ProjectId>,
    /// 50%-confidence duration in hours.
    pub estimated_time: f64,
    /// Protective time allocated to this task alone, in hours.
    pub buffer_time: f64,
    /// Measured hours so far, once work has started.
    pub actual_time: Option<f64>,
    pub status: TaskStatus,
    pub completion_percentage: f64,
    /// Ids of tasks that must finish before this one.
    pub predecessors: Vec<TaskId>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    /// Derived: set by the critical chain selector only.
    pub is_critical_chain: bool,
    /// Derived: percentage of `buffer_time` consumed.
    pub buffer_consumption: f64,
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>, estimated_time: f64) -> Self {
        Self {
            id,
            name: name.into(),
            estimated_time,
            ..Default::default()
        }
    }

    pub fn in_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn after(mut self, predecessors: impl IntoIterator<Item = TaskId>) -> Self {
        self.predecessors.extend(predecessors);
        self
    }
}

/// A collection of tasks sharing one schedule.
#[derive(Clone, Debug, Default)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDateTime>,
    pub target_end_date: Option<NaiveDateTime>,
    pub actual_end_date: Option<NaiveDateTime>,
    /// Project buffer in hours, sized from the critical chain.
    pub project_buffer: f64,
    pub buffer_consumption: f64,
    pub buffer_status: BufferStatus,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Store a reading, keeping consumption and status in lockstep.
    pub fn set_reading(&mut self, reading: BufferReading) {
        self.buffer_consumption = reading.consumption();
        self.buffer_status = reading.status();
    }
}

/// Protective buffer for a feeding chain, placed before its merge task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedingBuffer {
    /// Storage id; `None` for a buffer that has not been persisted yet.
    pub id: Option<FeedingBufferId>,
    pub name: String,
    pub project_id: ProjectId,
    /// The feeding segment in path order, excluding the merge task.
    pub tasks: Vec<TaskId>,
    /// Critical chain task the segment feeds into.
    pub merge_task_id: TaskId,
    pub buffer_size: f64,
    pub buffer_consumption: f64,
    pub buffer_status: BufferStatus,
}

impl FeedingBuffer {
    pub fn set_reading(&mut self, reading: BufferReading) {
        self.buffer_consumption = reading.consumption();
        self.buffer_status = reading.status();
    }
}

/// A block of tracked work time.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub task_id: Option<TaskId>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Hours; set when the entry is closed.
    pub duration: Option<f64>,
}

/// Everything the engine needs to know about one project.
#[derive(Clone, Debug, Default)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub tasks: Vec<Task>,
    pub feeding_buffers: Vec<FeedingBuffer>,
}

impl ProjectSnapshot {
    pub fn new(project: Project, tasks: Vec<Task>) -> Self {
        Self {
            project,
            tasks,
            feeding_buffers: Vec::new(),
        }
    }

    /// Tasks attached to this snapshot's project.
    pub fn project_tasks(&self) -> impl Iterator<Item = &Task> {
        let project_id = self.project.id;
        self.tasks
            .iter()
            .filter(move |t| t.project_id == Some(project_id))
    }
}
