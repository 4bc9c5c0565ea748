//! # sunshade-adapter-shelly
//!
//! Adapter for Shelly Gen2 devices over their JSON-RPC HTTP endpoint.
//!
//! ## Responsibilities
//! - `KeyValueStore` on the device's `KVS` component (schedule bindings, weather snapshot)
//! - `ScheduleService` on the device's `Schedule` component; jobs call back into
//!   sunshade over HTTP
//! - `CoverActuator` on the `Cover` component, with an `Input` as manual override
//! - Reading the device location from its system configuration
//!
//! RPC error `-105` ("not found") becomes `None` where a port allows it,
//! and [`SunshadeError::NotFound`](sunshade_domain::error::SunshadeError::NotFound)
//! for job updates and deletions.
//!
//! ## Dependency rule
//! Depends on `sunshade-app` (for port traits) and `sunshade-domain` (for domain types).

mod client;
mod cover;
mod error;
mod kvs;
mod schedule;
mod sys;

pub use client::{ShellyClient, ShellyConfig};
pub use error::{NOT_FOUND, ShellyError};
