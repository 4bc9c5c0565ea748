//! # sunshade-domain
//!
//! Pure domain model for the sunshade cover automation.
//!
//! ## Responsibilities
//! - Foundational types: job identifiers, error conventions, timestamps
//! - Define **timer specs** (the host scheduler's cron-like grammar)
//! - Define **job specs** and the persisted **schedule bindings**
//! - Define **weather samples** as handed over by weather providers
//! - Define **cover state**, positions, and the move/skip planning rule
//! - Define the **decision policy** turning a sample into a target position
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod cover;
pub mod decision;
pub mod schedule;
pub mod timespec;
pub mod weather;
