//! Schedule registry — keeps host jobs consistent with persisted bindings.
//!
//! Every job sunshade owns is identified by its [`JobSpec::key`]. The first
//! successful registration stores a [`ScheduleBinding`] under that key; later
//! calls use the binding to find the live job instead of creating another.
//!
//! The store and the scheduler are updated with two separate calls, so a
//! crash in between leaves a job without binding. The next reconciliation
//! then creates a second job; this gap is accepted.

use serde::Serialize;

use sunshade_domain::error::SunshadeError;
use sunshade_domain::id::JobId;
use sunshade_domain::schedule::{JobSpec, ScheduleBinding};

use crate::ports::{KeyValueStore, ScheduleService};

/// Result of [`ScheduleRegistry::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Registration {
    /// No binding existed; a job was created and bound.
    Created { job_id: JobId },
    /// The bound job was gone from the host; a replacement was created.
    Recreated { stale_job_id: JobId, job_id: JobId },
    /// The bound job is live and already runs on the desired timespec.
    AlreadyRegistered { job_id: JobId },
    /// The bound job is live but ran on another timespec; it was updated
    /// in place, keeping its enabled flag.
    Retimed { job_id: JobId },
}

/// Result of [`ScheduleRegistry::set_enabled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Toggle {
    Updated { job_id: JobId, enabled: bool },
    /// The bound job no longer exists on the host. Nothing was created; the
    /// next reconciliation replaces it.
    Missing { job_id: JobId },
    /// Nothing is bound to the key; no job was created.
    Unbound,
}

/// Result of [`ScheduleRegistry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Removal {
    /// The bound job was deleted. The binding itself stays in the store.
    Deleted { job_id: JobId },
    /// The bound job was already gone from the host.
    Missing { job_id: JobId },
    Unbound,
}

/// Reconciles desired [`JobSpec`]s with the store and the host scheduler.
pub struct ScheduleRegistry<S, K> {
    scheduler: S,
    store: K,
}

impl<S, K> ScheduleRegistry<S, K>
where
    S: ScheduleService,
    K: KeyValueStore,
{
    /// Create a new registry backed by the given scheduler and store.
    pub fn new(scheduler: S, store: K) -> Self {
        Self { scheduler, store }
    }

    /// Make sure exactly one live job is bound to `spec.key`.
    ///
    /// `enable` only applies when a job has to be created; an existing job
    /// keeps whatever enabled flag the host reports.
    ///
    /// # Errors
    ///
    /// Returns [`SunshadeError::Validation`] for an invalid spec, a storage
    /// or remote error when a call fails, or [`SunshadeError::Payload`] when
    /// the stored binding cannot be read. In every error case the previous
    /// binding is left as it was.
    #[tracing::instrument(skip(self, spec), fields(key = %spec.key))]
    pub async fn reconcile(
        &self,
        spec: &JobSpec,
        enable: bool,
    ) -> Result<Registration, SunshadeError> {
        spec.validate()?;

        let Some(binding) = self.binding(&spec.key).await? else {
            let job_id = self.install(spec, enable).await?;
            return Ok(Registration::Created { job_id });
        };

        let live = self.scheduler.list().await?;
        match live.iter().find(|job| job.id == binding.job_id) {
            Some(job) if job.timespec == spec.timespec.as_str() => {
                tracing::debug!(job_id = %job.id, "job already registered");
                Ok(Registration::AlreadyRegistered { job_id: job.id })
            }
            Some(job) => {
                self.scheduler
                    .update(job.id, job.enabled, &spec.timespec)
                    .await?;
                tracing::info!(
                    job_id = %job.id,
                    from = %job.timespec,
                    to = %spec.timespec,
                    "job timespec re-applied"
                );
                Ok(Registration::Retimed { job_id: job.id })
            }
            None => {
                tracing::info!(stale_job_id = %binding.job_id, "bound job missing, recreating");
                let job_id = self.install(spec, enable).await?;
                Ok(Registration::Recreated {
                    stale_job_id: binding.job_id,
                    job_id,
                })
            }
        }
    }

    /// Enable or disable the job bound to `spec.key`, re-applying its timespec.
    ///
    /// Never creates a job, not even when the bound one has disappeared.
    ///
    /// # Errors
    ///
    /// Returns a storage or remote error when a call fails, or
    /// [`SunshadeError::Payload`] when the stored binding cannot be read.
    #[tracing::instrument(skip(self, spec), fields(key = %spec.key))]
    pub async fn set_enabled(&self, spec: &JobSpec, enable: bool) -> Result<Toggle, SunshadeError> {
        let Some(binding) = self.binding(&spec.key).await? else {
            tracing::debug!("no binding, nothing to update");
            return Ok(Toggle::Unbound);
        };
        match self
            .scheduler
            .update(binding.job_id, enable, &spec.timespec)
            .await
        {
            Ok(()) => {
                tracing::info!(job_id = %binding.job_id, enable, "job updated");
                Ok(Toggle::Updated {
                    job_id: binding.job_id,
                    enabled: enable,
                })
            }
            Err(SunshadeError::NotFound(_)) => {
                tracing::warn!(job_id = %binding.job_id, "bound job missing, left for next reconciliation");
                Ok(Toggle::Missing {
                    job_id: binding.job_id,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the job bound to `spec.key`.
    ///
    /// The binding is not cleared: a later [`reconcile`](Self::reconcile)
    /// finds it stale and creates a fresh job.
    ///
    /// # Errors
    ///
    /// Returns a storage or remote error when a call fails, or
    /// [`SunshadeError::Payload`] when the stored binding cannot be read.
    #[tracing::instrument(skip(self, spec), fields(key = %spec.key))]
    pub async fn remove(&self, spec: &JobSpec) -> Result<Removal, SunshadeError> {
        let Some(binding) = self.binding(&spec.key).await? else {
            return Ok(Removal::Unbound);
        };
        match self.scheduler.delete(binding.job_id).await {
            Ok(()) => {
                tracing::info!(job_id = %binding.job_id, "job deleted");
                Ok(Removal::Deleted {
                    job_id: binding.job_id,
                })
            }
            Err(SunshadeError::NotFound(_)) => Ok(Removal::Missing {
                job_id: binding.job_id,
            }),
            Err(err) => Err(err),
        }
    }

    async fn binding(&self, key: &str) -> Result<Option<ScheduleBinding>, SunshadeError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(Some(ScheduleBinding::decode(key, &raw)?)),
            None => Ok(None),
        }
    }

    async fn install(&self, spec: &JobSpec, enable: bool) -> Result<JobId, SunshadeError> {
        let job_id = self.scheduler.create(spec, enable).await?;
        let binding = ScheduleBinding::new(&spec.key, job_id);
        self.store.set(&spec.key, binding.encode()?).await?;
        tracing::info!(%job_id, timespec = %spec.timespec, enable, "job registered");
        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::{MemoryScheduler, MemoryStore};
    use crate::test_support::FlakyStore;
    use sunshade_domain::schedule::EntryPoint;

    fn periodic(timespec: &str) -> JobSpec {
        JobSpec::builder()
            .key("sunshade-test-periodic")
            .timespec(timespec)
            .entry_point(EntryPoint::Periodic)
            .build()
            .unwrap()
    }

    fn make_registry() -> (
        ScheduleRegistry<Arc<MemoryScheduler>, Arc<MemoryStore>>,
        Arc<MemoryScheduler>,
        Arc<MemoryStore>,
    ) {
        let scheduler = Arc::new(MemoryScheduler::default());
        let store = Arc::new(MemoryStore::default());
        let registry = ScheduleRegistry::new(Arc::clone(&scheduler), Arc::clone(&store));
        (registry, scheduler, store)
    }

    async fn bound_id(store: &MemoryStore, key: &str) -> JobId {
        let raw = store.get(key).await.unwrap().unwrap();
        ScheduleBinding::decode(key, &raw).unwrap().job_id
    }

    #[tokio::test]
    async fn should_create_and_bind_job_when_never_registered() {
        let (registry, scheduler, store) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");

        let outcome = registry.reconcile(&spec, true).await.unwrap();

        let Registration::Created { job_id } = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(bound_id(&store, &spec.key).await, job_id);
        let job = scheduler.job(job_id).unwrap();
        assert!(job.job.enabled);
        assert_eq!(job.entry_point, EntryPoint::Periodic);
    }

    #[tokio::test]
    async fn should_keep_single_job_when_reconciled_twice() {
        let (registry, scheduler, _) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");

        let first = registry.reconcile(&spec, true).await.unwrap();
        let second = registry.reconcile(&spec, true).await.unwrap();

        let Registration::Created { job_id } = first else {
            panic!("expected Created, got {first:?}");
        };
        assert_eq!(second, Registration::AlreadyRegistered { job_id });
        assert_eq!(scheduler.count_for(EntryPoint::Periodic), 1);
    }

    #[tokio::test]
    async fn should_recreate_exactly_one_job_when_deleted_out_of_band() {
        let (registry, scheduler, store) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");
        let Registration::Created { job_id: first } = registry.reconcile(&spec, true).await.unwrap()
        else {
            panic!("expected Created");
        };

        scheduler.delete(first).await.unwrap();
        let outcome = registry.reconcile(&spec, true).await.unwrap();

        let Registration::Recreated {
            stale_job_id,
            job_id,
        } = outcome
        else {
            panic!("expected Recreated, got {outcome:?}");
        };
        assert_eq!(stale_job_id, first);
        assert_ne!(job_id, first);
        assert_eq!(bound_id(&store, &spec.key).await, job_id);
        assert_eq!(scheduler.count_for(EntryPoint::Periodic), 1);
    }

    #[tokio::test]
    async fn should_reapply_changed_timespec_and_keep_enabled_flag() {
        let (registry, scheduler, _) = make_registry();
        let Registration::Created { job_id } = registry
            .reconcile(&periodic("0 45/15 7-14 * * *"), true)
            .await
            .unwrap()
        else {
            panic!("expected Created");
        };
        registry
            .set_enabled(&periodic("0 45/15 7-14 * * *"), false)
            .await
            .unwrap();

        let outcome = registry
            .reconcile(&periodic("0 */10 8-16 * * *"), true)
            .await
            .unwrap();

        assert_eq!(outcome, Registration::Retimed { job_id });
        let job = scheduler.job(job_id).unwrap();
        assert_eq!(job.job.timespec, "0 */10 8-16 * * *");
        assert!(!job.job.enabled);
        assert_eq!(scheduler.jobs().len(), 1);
    }

    #[tokio::test]
    async fn should_accept_legacy_bare_id_binding() {
        let (registry, scheduler, store) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");
        let job_id = scheduler.create(&spec, true).await.unwrap();
        store.set(&spec.key, job_id.to_string()).await.unwrap();

        let outcome = registry.reconcile(&spec, true).await.unwrap();

        assert_eq!(outcome, Registration::AlreadyRegistered { job_id });
    }

    #[tokio::test]
    async fn should_not_create_when_enabling_unbound_job() {
        let (registry, scheduler, _) = make_registry();

        let outcome = registry
            .set_enabled(&periodic("0 45/15 7-14 * * *"), true)
            .await
            .unwrap();

        assert_eq!(outcome, Toggle::Unbound);
        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_bound_job() {
        let (registry, scheduler, _) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");
        registry.reconcile(&spec, true).await.unwrap();

        let outcome = registry.set_enabled(&spec, false).await.unwrap();

        let Toggle::Updated { job_id, enabled } = outcome else {
            panic!("expected Updated, got {outcome:?}");
        };
        assert!(!enabled);
        assert!(!scheduler.job(job_id).unwrap().job.enabled);
    }

    #[tokio::test]
    async fn should_leave_binding_after_remove_and_recreate_on_next_reconcile() {
        let (registry, scheduler, store) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");
        let Registration::Created { job_id } = registry.reconcile(&spec, true).await.unwrap() else {
            panic!("expected Created");
        };

        let removal = registry.remove(&spec).await.unwrap();
        assert_eq!(removal, Removal::Deleted { job_id });
        assert!(scheduler.jobs().is_empty());
        assert_eq!(bound_id(&store, &spec.key).await, job_id);

        let outcome = registry.reconcile(&spec, true).await.unwrap();
        assert!(matches!(outcome, Registration::Recreated { stale_job_id, .. } if stale_job_id == job_id));
        assert_eq!(scheduler.jobs().len(), 1);
    }

    #[tokio::test]
    async fn should_report_missing_job_without_recreating_it() {
        let (registry, scheduler, _) = make_registry();
        let spec = periodic("0 45/15 7-14 * * *");
        let Registration::Created { job_id } = registry.reconcile(&spec, true).await.unwrap() else {
            panic!("expected Created");
        };
        scheduler.delete(job_id).await.unwrap();

        assert_eq!(
            registry.set_enabled(&spec, true).await.unwrap(),
            Toggle::Missing { job_id }
        );
        assert_eq!(
            registry.remove(&spec).await.unwrap(),
            Removal::Missing { job_id }
        );
        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_report_unbound_when_removing_unknown_key() {
        let (registry, _, _) = make_registry();
        let outcome = registry.remove(&periodic("@sunset")).await.unwrap();
        assert_eq!(outcome, Removal::Unbound);
    }

    #[tokio::test]
    async fn should_abandon_without_creating_when_store_read_fails() {
        let scheduler = Arc::new(MemoryScheduler::default());
        let store = Arc::new(FlakyStore::default());
        store.fail_reads(true);
        let registry = ScheduleRegistry::new(Arc::clone(&scheduler), Arc::clone(&store));

        let result = registry.reconcile(&periodic("@sunrise"), true).await;

        assert!(matches!(result, Err(SunshadeError::Storage(_))));
        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_keep_previous_binding_when_binding_unreadable() {
        let (registry, scheduler, store) = make_registry();
        let spec = periodic("@sunrise");
        store.set(&spec.key, "{garbage".to_string()).await.unwrap();

        let result = registry.reconcile(&spec, true).await;

        assert!(matches!(result, Err(SunshadeError::Payload(_))));
        assert_eq!(store.get(&spec.key).await.unwrap().as_deref(), Some("{garbage"));
        assert!(scheduler.jobs().is_empty());
    }

    #[tokio::test]
    async fn should_leave_orphan_job_when_binding_write_fails() {
        let scheduler = Arc::new(MemoryScheduler::default());
        let store = Arc::new(FlakyStore::default());
        store.fail_writes(true);
        let registry = ScheduleRegistry::new(Arc::clone(&scheduler), Arc::clone(&store));
        let spec = periodic("@sunrise");

        assert!(registry.reconcile(&spec, true).await.is_err());
        assert_eq!(scheduler.jobs().len(), 1);

        store.fail_writes(false);
        let outcome = registry.reconcile(&spec, true).await.unwrap();
        assert!(matches!(outcome, Registration::Created { .. }));
        assert_eq!(scheduler.jobs().len(), 2);
    }
}
