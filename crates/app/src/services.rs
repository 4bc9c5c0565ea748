//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod cover_controller;
pub mod orchestrator;
pub mod report;
pub mod schedule_registry;
