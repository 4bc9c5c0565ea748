//! Port fakes shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, TimeZone, Utc};

use sunshade_domain::cover::{CoverState, Position};
use sunshade_domain::error::SunshadeError;
use sunshade_domain::weather::WeatherSample;

use crate::ports::{CoverActuator, KeyValueStore, WeatherProvider};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remote(message: &str) -> SunshadeError {
    SunshadeError::Remote(message.to_string().into())
}

/// A weather sample observed at noon on a fixed day.
pub fn sample(temperature_c: f64, cloud_cover_pct: f64, is_daylight: Option<bool>) -> WeatherSample {
    let observed_at = NaiveDate::from_ymd_opt(2024, 6, 21)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    WeatherSample {
        temperature_c,
        cloud_cover_pct,
        is_daylight,
        observed_at,
        fetched_at: Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap(),
    }
}

/// Cover that moves instantly and records every command.
#[derive(Debug)]
pub struct FakeCover {
    state: Mutex<CoverState>,
    moves: Mutex<Vec<Position>>,
    manual_override: Mutex<Option<bool>>,
    fail_status: AtomicBool,
    fail_moves: AtomicBool,
}

impl FakeCover {
    pub fn resting_at(position: u8) -> Self {
        Self {
            state: Mutex::new(CoverState::resting_at(Position::saturating(position))),
            moves: Mutex::new(Vec::new()),
            manual_override: Mutex::new(None),
            fail_status: AtomicBool::new(false),
            fail_moves: AtomicBool::new(false),
        }
    }

    pub fn moves(&self) -> Vec<Position> {
        lock(&self.moves).clone()
    }

    pub fn position(&self) -> Position {
        lock(&self.state).position
    }

    pub fn set_override(&self, value: Option<bool>) {
        *lock(&self.manual_override) = value;
    }

    pub fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    pub fn fail_moves(&self, fail: bool) {
        self.fail_moves.store(fail, Ordering::SeqCst);
    }
}

impl CoverActuator for FakeCover {
    fn status(&self) -> impl Future<Output = Result<CoverState, SunshadeError>> + Send {
        let result = if self.fail_status.load(Ordering::SeqCst) {
            Err(remote("status unavailable"))
        } else {
            Ok(*lock(&self.state))
        };
        async move { result }
    }

    fn move_to(&self, position: Position) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let result = if self.fail_moves.load(Ordering::SeqCst) {
            Err(remote("move rejected"))
        } else {
            lock(&self.moves).push(position);
            *lock(&self.state) = CoverState::resting_at(position);
            Ok(())
        };
        async move { result }
    }

    fn read_override(&self) -> impl Future<Output = Result<Option<bool>, SunshadeError>> + Send {
        let value = *lock(&self.manual_override);
        async move { Ok(value) }
    }
}

/// Weather provider returning a fixed sample.
#[derive(Debug)]
pub struct StubWeather {
    sample: Mutex<Option<WeatherSample>>,
    hung: bool,
}

impl StubWeather {
    pub fn new(sample: WeatherSample) -> Self {
        Self {
            sample: Mutex::new(Some(sample)),
            hung: false,
        }
    }

    /// A provider whose every fetch fails.
    pub fn unavailable() -> Self {
        Self {
            sample: Mutex::new(None),
            hung: false,
        }
    }

    /// A provider whose fetch never completes.
    pub fn hung() -> Self {
        Self {
            sample: Mutex::new(None),
            hung: true,
        }
    }
}

impl WeatherProvider for StubWeather {
    fn fetch(&self) -> impl Future<Output = Result<WeatherSample, SunshadeError>> + Send {
        let result = lock(&self.sample)
            .clone()
            .ok_or_else(|| remote("weather service unreachable"));
        let hung = self.hung;
        async move {
            if hung {
                std::future::pending::<()>().await;
            }
            result
        }
    }
}

/// Key/value store whose reads or writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn storage_error() -> SunshadeError {
        SunshadeError::Storage("store offline".into())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send {
        let result = if self.fail_reads.load(Ordering::SeqCst) {
            Err(Self::storage_error())
        } else {
            Ok(lock(&self.entries).get(key).cloned())
        };
        async move { result }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(Self::storage_error())
        } else {
            lock(&self.entries).insert(key.to_string(), value);
            Ok(())
        };
        async move { result }
    }
}
