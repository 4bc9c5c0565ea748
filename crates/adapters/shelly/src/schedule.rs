//! [`ScheduleService`] on the device's `Schedule` component.
//!
//! Each job calls back into sunshade with `HTTP.GET {callback_base}/trigger/<entry point>`.

use std::future::Future;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::{Value, json};

use sunshade_app::ports::ScheduleService;
use sunshade_domain::error::SunshadeError;
use sunshade_domain::id::JobId;
use sunshade_domain::schedule::{JobSpec, LiveJob};
use sunshade_domain::timespec::Timespec;

use crate::client::ShellyClient;

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<ListedJob>,
}

#[derive(Debug, Deserialize)]
struct ListedJob {
    id: u64,
    #[serde(default)]
    enable: bool,
    #[serde(default)]
    timespec: String,
}

impl From<ListedJob> for LiveJob {
    fn from(job: ListedJob) -> Self {
        Self {
            id: JobId::new(job.id),
            enabled: job.enable,
            timespec: job.timespec,
        }
    }
}

/// URL the device requests when the job fires.
pub(crate) fn callback_url(callback_base: &str, spec: &JobSpec) -> String {
    format!(
        "{}/trigger/{}",
        callback_base.trim_end_matches('/'),
        spec.entry_point
    )
}

pub(crate) fn create_params(callback_base: &str, spec: &JobSpec, enabled: bool) -> Value {
    json!({
        "enable": enabled,
        "timespec": spec.timespec.as_str(),
        "calls": [{
            "method": "HTTP.GET",
            "params": { "url": callback_url(callback_base, spec) },
        }],
    })
}

impl ScheduleService for ShellyClient {
    fn create(
        &self,
        spec: &JobSpec,
        enabled: bool,
    ) -> impl Future<Output = Result<JobId, SunshadeError>> + Send {
        let client = self.clone();
        let params = create_params(&self.config.callback_base, spec, enabled);
        async move {
            let created: Created = client.call("Schedule.Create", params).await?;
            Ok(JobId::new(created.id))
        }
    }

    fn update(
        &self,
        id: JobId,
        enabled: bool,
        timespec: &Timespec,
    ) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let client = self.clone();
        let params = json!({ "id": id.get(), "enable": enabled, "timespec": timespec.as_str() });
        async move {
            client
                .call::<IgnoredAny>("Schedule.Update", params)
                .await
                .map_err(|err| err.into_domain("Job", id))?;
            Ok(())
        }
    }

    fn delete(&self, id: JobId) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let client = self.clone();
        async move {
            client
                .call::<IgnoredAny>("Schedule.Delete", json!({ "id": id.get() }))
                .await
                .map_err(|err| err.into_domain("Job", id))?;
            Ok(())
        }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<LiveJob>, SunshadeError>> + Send {
        let client = self.clone();
        async move {
            let list: JobList = client.call("Schedule.List", json!({})).await?;
            Ok(list.jobs.into_iter().map(LiveJob::from).collect())
        }
    }
}
