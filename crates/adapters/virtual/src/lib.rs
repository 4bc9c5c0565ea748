//! # sunshade-adapter-virtual
//!
//! Virtual/demo adapter that runs sunshade without any hardware or network.
//!
//! ## Provided components
//!
//! | Component | Port | Behaviour |
//! |-----------|------|-----------|
//! | [`VirtualCover`] | `CoverActuator` | Moves instantly, records every command, settable override input |
//! | [`VirtualWeather`] | `WeatherProvider` | Returns settable conditions stamped with the current time |
//! | [`MemoryStore`] | `KeyValueStore` | `HashMap`, lost on restart |
//! | [`MemoryScheduler`] | `ScheduleService` | Records jobs, never fires them |
//!
//! ## Dependency rule
//!
//! Depends on `sunshade-app` (port traits) and `sunshade-domain` only.

mod devices;

pub use devices::{Conditions, MOVE_LOG_LIMIT, VirtualCover, VirtualWeather};
pub use sunshade_app::memory::{MemoryJob, MemoryScheduler, MemoryStore};
