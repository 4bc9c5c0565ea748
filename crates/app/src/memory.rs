//! In-process implementations of the store and scheduler ports.
//!
//! Nothing here fires jobs on its own: [`MemoryScheduler`] only keeps the
//! job list so that reconciliation can run against it. Used by the virtual
//! setup and by tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sunshade_domain::error::{NotFoundError, SunshadeError};
use sunshade_domain::id::JobId;
use sunshade_domain::schedule::{EntryPoint, JobSpec, LiveJob};
use sunshade_domain::timespec::Timespec;

use crate::ports::{KeyValueStore, ScheduleService};

/// Key/value store backed by a `HashMap`. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send {
        let value = self.entries().get(key).cloned();
        async move { Ok(value) }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        self.entries().insert(key.to_string(), value);
        async { Ok(()) }
    }
}

/// A job held by [`MemoryScheduler`], with the entry point it would fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryJob {
    pub job: LiveJob,
    pub entry_point: EntryPoint,
}

#[derive(Debug, Default)]
struct SchedulerState {
    next_id: u64,
    jobs: BTreeMap<JobId, MemoryJob>,
}

/// Schedule service that only records jobs. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryScheduler {
    state: Mutex<SchedulerState>,
}

impl MemoryScheduler {
    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all registered jobs, ordered by id.
    #[must_use]
    pub fn jobs(&self) -> Vec<MemoryJob> {
        self.state().jobs.values().cloned().collect()
    }

    /// Look up a single job.
    #[must_use]
    pub fn job(&self, id: JobId) -> Option<MemoryJob> {
        self.state().jobs.get(&id).cloned()
    }

    /// Number of live jobs firing `entry_point`.
    #[must_use]
    pub fn count_for(&self, entry_point: EntryPoint) -> usize {
        self.state()
            .jobs
            .values()
            .filter(|job| job.entry_point == entry_point)
            .count()
    }

    fn not_found(id: JobId) -> SunshadeError {
        NotFoundError {
            entity: "Job",
            id: id.to_string(),
        }
        .into()
    }
}

impl ScheduleService for MemoryScheduler {
    fn create(
        &self,
        spec: &JobSpec,
        enabled: bool,
    ) -> impl Future<Output = Result<JobId, SunshadeError>> + Send {
        let mut state = self.state();
        state.next_id += 1;
        let id = JobId::new(state.next_id);
        state.jobs.insert(
            id,
            MemoryJob {
                job: LiveJob {
                    id,
                    enabled,
                    timespec: spec.timespec.to_string(),
                },
                entry_point: spec.entry_point,
            },
        );
        async move { Ok(id) }
    }

    fn update(
        &self,
        id: JobId,
        enabled: bool,
        timespec: &Timespec,
    ) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let result = match self.state().jobs.get_mut(&id) {
            Some(entry) => {
                entry.job.enabled = enabled;
                entry.job.timespec = timespec.to_string();
                Ok(())
            }
            None => Err(Self::not_found(id)),
        };
        async move { result }
    }

    fn delete(&self, id: JobId) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let result = self
            .state()
            .jobs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id));
        async move { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<LiveJob>, SunshadeError>> + Send {
        let jobs = self.state().jobs.values().map(|j| j.job.clone()).collect();
        async move { Ok(jobs) }
    }
}
