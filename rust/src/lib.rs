//! Critical Chain Project Management scheduling engine.
//!
//! This crate computes a project's critical chain and feeding chains from its
//! task dependency graph, sizes project and feeding buffers with the
//! root-sum-square method, and tracks how much of each buffer has been
//! consumed as work progresses.
//!
//! The pure computations live in [`graph`], [`paths`], [`chain`] and
//! [`buffer`]. [`engine::ScheduleEngine`] composes them into whole-project
//! updates, and [`coordinator::ProjectCoordinator`] runs those updates against
//! a [`store::ScheduleSource`]/[`store::ScheduleSink`] pair, one at a time per
//! project. Python bindings are available behind the `python` feature.

pub mod buffer;
pub mod chain;
mod config;
pub mod coordinator;
pub mod engine;
mod errors;
pub mod graph;
mod interner;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod paths;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use buffer::{buffer_size, chain_progress, consumption_percentage, estimated_completion_date};
pub use chain::{
    critical_flags, identify_feeding_chains, select_critical_chain, CriticalChain, FeedingChain,
};
pub use config::{CcpmConfig, GREEN_LIMIT, YELLOW_LIMIT};
pub use coordinator::{LockPolicy, ProjectCoordinator};
pub use engine::{ConsumptionReport, FeedingBufferPlan, ProjectUpdate, ScheduleEngine, ScheduleResult};
pub use errors::{Result, ScheduleError};
pub use graph::DependencyGraph;
pub use interner::{NodeIdx, TaskIdInterner};
pub use models::{
    BufferReading, BufferStatus, FeedingBuffer, Project, ProjectId, ProjectSnapshot,
    ProjectStatus, Task, TaskId, TaskStatus, TimeEntry,
};
pub use paths::enumerate_paths;
pub use store::{MemoryStore, ScheduleSink, ScheduleSource};
