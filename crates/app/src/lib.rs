//! # sunshade-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `KeyValueStore` — durable string-keyed storage
//!   - `ScheduleService` — the host's recurring-timer subsystem
//!   - `WeatherProvider` — one weather sample per call
//!   - `CoverActuator` — cover status, moves, and the manual override input
//! - Define **driving/inbound** use-cases:
//!   - `ScheduleRegistry` — idempotent job registration against persisted bindings
//!   - `CoverController` — move commands with no-op elision
//!   - `Orchestrator` — the sunrise / periodic / finalize / sunset entry points
//! - Provide **in-process infrastructure** (memory store and scheduler) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `sunshade-domain` only (plus `tokio` for joining futures).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod memory;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
