//! Per-project serialization of recomputations.
//!
//! Two recomputations of the same project must not interleave their
//! read-compute-write cycles, or one would write results derived from state
//! the other is halfway through replacing. Each project id has its own token;
//! different projects never wait on each other.

use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use rustc_hash::FxHashMap;

use crate::config::CcpmConfig;
use crate::engine::{ProjectUpdate, ScheduleEngine};
use crate::errors::{Result, ScheduleError};
use crate::log_checks;
use crate::models::{ProjectId, ProjectSnapshot};
use crate::store::{ScheduleSink, ScheduleSource};

/// What to do when a project already has a recomputation in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LockPolicy {
    /// Wait for the running recomputation to finish.
    #[default]
    Queue,
    /// Fail immediately with `RecomputationInProgress`.
    Reject,
}

/// Runs engine entry points against a store, one at a time per project.
pub struct ProjectCoordinator<S> {
    store: S,
    engine: ScheduleEngine,
    policy: LockPolicy,
    tokens: Mutex<FxHashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl<S> ProjectCoordinator<S>
where
    S: ScheduleSource + ScheduleSink,
{
    pub fn new(store: S, config: CcpmConfig, policy: LockPolicy) -> Self {
        Self {
            store,
            engine: ScheduleEngine::new(config),
            policy,
            tokens: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn token(&self, project_id: ProjectId) -> Arc<Mutex<()>> {
        // The map only holds tokens; a panic elsewhere cannot leave it inconsistent.
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.entry(project_id).or_default().clone()
    }

    /// Drop the project's token from the map once no other caller holds it.
    ///
    /// Clones are only handed out under the map lock, so a count of two (the
    /// map and `token`) means nobody is running or waiting on this project.
    fn release(&self, project_id: ProjectId, token: Arc<Mutex<()>>) {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&token) == 2 {
            tokens.remove(&project_id);
        }
    }

    /// Number of projects with a recomputation running or waiting.
    pub fn active_projects(&self) -> usize {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run `work` while holding the project's token.
    pub fn run_exclusive<T, F>(&self, project_id: ProjectId, work: F) -> Result<T>
    where
        F: FnOnce(&S, &ScheduleEngine) -> Result<T>,
    {
        let token = self.token(project_id);
        let result = self.locked(&token, project_id, work);
        self.release(project_id, token);
        result
    }

    fn locked<T, F>(&self, token: &Mutex<()>, project_id: ProjectId, work: F) -> Result<T>
    where
        F: FnOnce(&S, &ScheduleEngine) -> Result<T>,
    {
        let _guard = match self.policy {
            LockPolicy::Queue => token.lock().unwrap_or_else(PoisonError::into_inner),
            LockPolicy::Reject => match token.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    log_checks!(
                        self.engine.config().verbosity,
                        "project {}: recomputation rejected, another is in progress",
                        project_id
                    );
                    return Err(ScheduleError::RecomputationInProgress(project_id));
                }
            },
        };
        work(&self.store, &self.engine)
    }

    fn load_compute_apply<F>(&self, project_id: ProjectId, compute: F) -> Result<ProjectUpdate>
    where
        F: FnOnce(&ScheduleEngine, &ProjectSnapshot) -> Result<ProjectUpdate>,
    {
        self.run_exclusive(project_id, |store, engine| {
            let snapshot = store.load_project(project_id)?;
            let update = compute(engine, &snapshot)?;
            store.apply(project_id, update.clone())?;
            Ok(update)
        })
    }

    /// A task or dependency changed: rebuild chains, buffers and readings.
    pub fn on_schedule_changed(&self, project_id: ProjectId) -> Result<ProjectUpdate> {
        self.load_compute_apply(project_id, |engine, snapshot| engine.recompute(snapshot))
    }

    /// Buffer resize requested: re-size against the stored chains.
    pub fn on_buffer_resize_requested(&self, project_id: ProjectId) -> Result<ProjectUpdate> {
        self.load_compute_apply(project_id, |engine, snapshot| {
            Ok(engine.resize_buffers(snapshot))
        })
    }

    /// A task started, completed or reported progress: refresh readings.
    pub fn on_progress_changed(&self, project_id: ProjectId) -> Result<ProjectUpdate> {
        self.load_compute_apply(project_id, |engine, snapshot| {
            Ok(engine.monitor_consumption(snapshot))
        })
    }
}
