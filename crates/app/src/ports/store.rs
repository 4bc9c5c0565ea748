//! Key/value store port — durable storage that survives restarts.

use std::future::Future;
use std::sync::Arc;

use sunshade_domain::error::SunshadeError;

/// String-keyed persistent storage.
///
/// A missing key is not an error: [`get`](Self::get) returns `Ok(None)`.
/// Implementations only guarantee single-key atomicity.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send;
}

impl<T: KeyValueStore + Send + Sync> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        (**self).set(key, value)
    }
}
