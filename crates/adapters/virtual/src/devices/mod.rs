//! Simulated devices — a cover and a weather source.

mod cover;
mod weather;

pub use cover::{MOVE_LOG_LIMIT, VirtualCover};
pub use weather::{Conditions, VirtualWeather};
