//! JSON-RPC client for the device's `/rpc` endpoint.

use std::sync::Arc;
use std::time::Duration;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShellyError;

/// Connection settings for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellyConfig {
    /// Base URL of the device, e.g. `http://192.168.1.40`.
    pub url: String,
    /// Base URL the device's jobs call back into, e.g. `http://192.168.1.10:8080`.
    pub callback_base: String,
    pub cover_id: u32,
    /// Input acting as manual override. `None` disables the override.
    pub input_id: Option<u32>,
    /// Deadline for a single RPC call.
    pub timeout: Duration,
}

/// Client for a Shelly Gen2 device.
///
/// Cheap to clone: clones share the HTTP connection pool and the request
/// id counter.
#[derive(Debug, Clone)]
pub struct ShellyClient {
    client: reqwest::Client,
    rpc_url: String,
    pub(crate) config: ShellyConfig,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct Reply {
    result: Option<Value>,
    error: Option<Fault>,
}

#[derive(Debug, Deserialize)]
struct Fault {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Decode an RPC reply frame into the expected result type.
pub(crate) fn decode_reply<R: DeserializeOwned>(body: &str) -> Result<R, ShellyError> {
    let reply: Reply = serde_json::from_str(body)?;
    if let Some(fault) = reply.error {
        return Err(ShellyError::Rpc {
            code: fault.code,
            message: fault.message,
        });
    }
    Ok(serde_json::from_value(reply.result.unwrap_or(Value::Null))?)
}

impl ShellyClient {
    /// Create a client for the device at `config.url`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ShellyConfig) -> Result<Self, ShellyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            rpc_url: format!("{}/rpc", config.url.trim_end_matches('/')),
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Invoke `method` with `params` and decode its result.
    ///
    /// # Errors
    ///
    /// Returns [`ShellyError::Rpc`] when the device rejects the call, and
    /// the transport or decoding variants otherwise.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, ShellyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "rpc call");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&Request { id, method, params })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match decode_reply(&body) {
            Err(ShellyError::Malformed(_)) if !status.is_success() => {
                tracing::warn!(method, status = status.as_u16(), "rpc call refused");
                Err(ShellyError::Status(status.as_u16()))
            }
            other => other,
        }
    }
}
