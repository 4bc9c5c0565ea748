//! Orchestrator — the four scheduled entry points.
//!
//! | Entry point | Jobs | Cover |
//! |---|---|---|
//! | sunrise | enable periodic and finalize | |
//! | periodic | | weather check and decision |
//! | finalize | disable periodic | force the final position |
//! | sunset | disable periodic and finalize | |
//!
//! Every run returns a [`TriggerReport`]. Failures are logged and reported,
//! never propagated: the next scheduled run starts from scratch.
//!
//! Cover work runs under [`OrchestratorSettings::cycle_timeout`]. Triggers
//! are serialized by the caller, so a device or weather service that never
//! answers would otherwise hold up every later trigger.

use std::future::Future;
use std::time::Duration;

use sunshade_domain::cover::Position;
use sunshade_domain::decision::DecisionPolicy;
use sunshade_domain::error::{PayloadError, SunshadeError};
use sunshade_domain::schedule::{EntryPoint, JobSet, JobSpec};
use sunshade_domain::weather::WeatherSample;

use super::cover_controller::CoverController;
use super::report::{CoverOutcome, JobOutcome, JobReport, TriggerReport, describe};
use super::schedule_registry::ScheduleRegistry;
use crate::ports::{CoverActuator, KeyValueStore, ScheduleService, WeatherProvider};

/// Everything the orchestrator needs besides its ports.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub policy: DecisionPolicy,
    /// Position forced by the finalize entry point.
    pub final_position: Position,
    pub jobs: JobSet,
    /// Store key the last weather sample is written under.
    pub snapshot_key: String,
    /// Upper bound for the cover work of a single trigger.
    pub cycle_timeout: Duration,
}

/// Wires the registry, the decision policy and the cover controller
/// together behind the entry points.
pub struct Orchestrator<S, K, W, A> {
    registry: ScheduleRegistry<S, K>,
    store: K,
    weather: W,
    cover: CoverController<A>,
    settings: OrchestratorSettings,
}

impl<S, K, W, A> Orchestrator<S, K, W, A>
where
    S: ScheduleService,
    K: KeyValueStore + Clone,
    W: WeatherProvider,
    A: CoverActuator,
{
    pub fn new(scheduler: S, store: K, weather: W, actuator: A, settings: OrchestratorSettings) -> Self {
        Self {
            registry: ScheduleRegistry::new(scheduler, store.clone()),
            store,
            weather,
            cover: CoverController::new(actuator),
            settings,
        }
    }

    /// Reconcile all four jobs with the store and the scheduler.
    ///
    /// Run on every process start. Each job is handled on its own: one
    /// failure does not prevent the others from being registered.
    #[tracing::instrument(skip(self))]
    pub async fn initialize(&self) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(4);
        for spec in self.settings.jobs.iter() {
            let result = self.registry.reconcile(spec, spec.enabled).await;
            reports.push(job_report(spec, result));
        }
        reports
    }

    /// Delete all four jobs from the scheduler. Bindings stay in the store.
    #[tracing::instrument(skip(self))]
    pub async fn remove_all(&self) -> Vec<JobReport> {
        let mut reports = Vec::with_capacity(4);
        for spec in self.settings.jobs.iter() {
            let result = self.registry.remove(spec).await;
            reports.push(job_report(spec, result));
        }
        reports
    }

    /// Run the entry point named `entry_point`.
    pub async fn dispatch(&self, entry_point: EntryPoint) -> TriggerReport {
        match entry_point {
            EntryPoint::Sunrise => self.on_sunrise().await,
            EntryPoint::Periodic => self.on_periodic_tick().await,
            EntryPoint::Finalize => self.on_finalize().await,
            EntryPoint::Sunset => self.on_sunset().await,
        }
    }

    /// Enable the daytime jobs.
    #[tracing::instrument(skip(self))]
    pub async fn on_sunrise(&self) -> TriggerReport {
        let jobs = vec![
            self.toggle(&self.settings.jobs.periodic, true).await,
            self.toggle(&self.settings.jobs.finalize, true).await,
        ];
        TriggerReport {
            entry_point: EntryPoint::Sunrise,
            jobs,
            cover: None,
        }
    }

    /// Check the weather and move the cover accordingly.
    #[tracing::instrument(skip(self))]
    pub async fn on_periodic_tick(&self) -> TriggerReport {
        let cover = self.bounded(self.weather_cycle()).await.unwrap_or_else(|err| {
            tracing::warn!(error = %describe(&err), "weather cycle abandoned");
            CoverOutcome::failed(&err)
        });
        TriggerReport {
            entry_point: EntryPoint::Periodic,
            jobs: Vec::new(),
            cover: Some(cover),
        }
    }

    /// Stop polling for the day and force the final position.
    ///
    /// The manual override input is not consulted here.
    #[tracing::instrument(skip(self))]
    pub async fn on_finalize(&self) -> TriggerReport {
        let jobs = vec![self.toggle(&self.settings.jobs.periodic, false).await];
        let cover = self.bounded(self.force_final_position()).await.unwrap_or_else(|err| {
            tracing::warn!(error = %describe(&err), "final position not applied");
            CoverOutcome::failed(&err)
        });
        TriggerReport {
            entry_point: EntryPoint::Finalize,
            jobs,
            cover: Some(cover),
        }
    }

    /// Disable the daytime jobs for the night.
    #[tracing::instrument(skip(self))]
    pub async fn on_sunset(&self) -> TriggerReport {
        let jobs = vec![
            self.toggle(&self.settings.jobs.periodic, false).await,
            self.toggle(&self.settings.jobs.finalize, false).await,
        ];
        TriggerReport {
            entry_point: EntryPoint::Sunset,
            jobs,
            cover: None,
        }
    }

    async fn toggle(&self, spec: &JobSpec, enable: bool) -> JobReport {
        let result = self.registry.set_enabled(spec, enable).await;
        job_report(spec, result)
    }

    async fn bounded<F>(&self, work: F) -> Result<CoverOutcome, SunshadeError>
    where
        F: Future<Output = Result<CoverOutcome, SunshadeError>>,
    {
        let limit = self.settings.cycle_timeout;
        match tokio::time::timeout(limit, work).await {
            Ok(result) => result,
            Err(elapsed) => {
                tracing::warn!(timeout = ?limit, "cover work timed out");
                Err(SunshadeError::Remote(Box::new(elapsed)))
            }
        }
    }

    async fn weather_cycle(&self) -> Result<CoverOutcome, SunshadeError> {
        let (status, sample) = tokio::join!(self.cover.actuator().status(), self.weather.fetch());
        let current = status?;
        let sample = sample?;
        tracing::debug!(
            temperature = sample.temperature_c,
            cloud_cover = sample.cloud_cover_pct,
            daylight = ?sample.is_daylight,
            position = %current.position,
            "conditions fetched"
        );

        self.save_snapshot(&sample).await;

        let manual_override = self.cover.actuator().read_override().await?.unwrap_or(false);
        match self.settings.policy.decide(&sample, manual_override) {
            Some(target) => {
                let action = self.cover.apply_position(target, &current).await?;
                Ok(CoverOutcome::from_action(action, current.position))
            }
            None if manual_override => {
                tracing::info!("manual override active, leaving cover alone");
                Ok(CoverOutcome::Overridden)
            }
            None => {
                tracing::debug!("no position change called for");
                Ok(CoverOutcome::NoDecision)
            }
        }
    }

    async fn force_final_position(&self) -> Result<CoverOutcome, SunshadeError> {
        let current = self.cover.actuator().status().await?;
        let action = self
            .cover
            .apply_position(self.settings.final_position, &current)
            .await?;
        Ok(CoverOutcome::from_action(action, current.position))
    }

    /// Write the sample to the store for diagnostics. Failures only log.
    async fn save_snapshot(&self, sample: &WeatherSample) {
        let result = async {
            let raw = serde_json::to_string(sample).map_err(PayloadError::from)?;
            self.store.set(&self.settings.snapshot_key, raw).await
        }
        .await;
        if let Err(err) = result {
            tracing::warn!(
                key = %self.settings.snapshot_key,
                error = %describe(&err),
                "weather snapshot not saved"
            );
        }
    }
}

fn job_report<T: Into<JobOutcome>>(spec: &JobSpec, result: Result<T, SunshadeError>) -> JobReport {
    let outcome = match result {
        Ok(value) => value.into(),
        Err(err) => {
            let error = describe(&err);
            tracing::warn!(key = %spec.key, %error, "job operation failed");
            JobOutcome::Failed { error }
        }
    };
    JobReport {
        key: spec.key.clone(),
        outcome,
    }
}
