//! [`KeyValueStore`] on the device's `KVS` component.

use std::future::Future;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::{Value, json};

use sunshade_app::ports::KeyValueStore;
use sunshade_domain::error::SunshadeError;

use crate::client::ShellyClient;
use crate::error::ShellyError;

#[derive(Debug, Deserialize)]
struct Entry {
    value: Value,
}

/// Stored values are strings, but scripts running on the device may have
/// written plain numbers.
fn stored_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn storage_error(err: ShellyError) -> SunshadeError {
    match err {
        ShellyError::Malformed(payload) => SunshadeError::Payload(payload),
        other => SunshadeError::Storage(Box::new(other)),
    }
}

impl KeyValueStore for ShellyClient {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SunshadeError>> + Send {
        let client = self.clone();
        let params = json!({ "key": key });
        async move {
            match client.call::<Entry>("KVS.Get", params).await {
                Ok(entry) => Ok(Some(stored_text(entry.value))),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(storage_error(err)),
            }
        }
    }

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let client = self.clone();
        let params = json!({ "key": key, "value": value });
        async move {
            client
                .call::<IgnoredAny>("KVS.Set", params)
                .await
                .map_err(storage_error)?;
            Ok(())
        }
    }
}
