//! Schedule service port — the host's recurring-timer subsystem.

use std::future::Future;
use std::sync::Arc;

use sunshade_domain::error::SunshadeError;
use sunshade_domain::id::JobId;
use sunshade_domain::schedule::{JobSpec, LiveJob};
use sunshade_domain::timespec::Timespec;

/// Creates, updates, deletes and lists recurring jobs on the host.
///
/// Each job fires `spec.entry_point` on its timespec. How the host calls
/// back into sunshade is up to the adapter.
pub trait ScheduleService {
    /// Register a new job and return the id the host assigned to it.
    fn create(
        &self,
        spec: &JobSpec,
        enabled: bool,
    ) -> impl Future<Output = Result<JobId, SunshadeError>> + Send;

    /// Change the enabled flag and timespec of an existing job.
    fn update(
        &self,
        id: JobId,
        enabled: bool,
        timespec: &Timespec,
    ) -> impl Future<Output = Result<(), SunshadeError>> + Send;

    /// Delete a job.
    fn delete(&self, id: JobId) -> impl Future<Output = Result<(), SunshadeError>> + Send;

    /// List all jobs currently registered on the host.
    fn list(&self) -> impl Future<Output = Result<Vec<LiveJob>, SunshadeError>> + Send;
}

impl<T: ScheduleService + Send + Sync> ScheduleService for Arc<T> {
    fn create(
        &self,
        spec: &JobSpec,
        enabled: bool,
    ) -> impl Future<Output = Result<JobId, SunshadeError>> + Send {
        (**self).create(spec, enabled)
    }

    fn update(
        &self,
        id: JobId,
        enabled: bool,
        timespec: &Timespec,
    ) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        (**self).update(id, enabled, timespec)
    }

    fn delete(&self, id: JobId) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        (**self).delete(id)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<LiveJob>, SunshadeError>> + Send {
        (**self).list()
    }
}
