//! # sunshade-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Receive the scheduler's job callbacks (`/trigger/{entry_point}`), which
//!   also serve as manual triggers for debugging
//! - Expose schedule maintenance (`/schedules`, `/schedules/reconcile`)
//! - Serialize entry point runs: no two ever execute at the same time
//! - Map application results into JSON responses
//!
//! ## Dependency rule
//! Depends on `sunshade-app` (for port traits and services) and `sunshade-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
