//! Cover actuator port — the motorized cover and its manual input.

use std::future::Future;
use std::sync::Arc;

use sunshade_domain::cover::{CoverState, Position};
use sunshade_domain::error::SunshadeError;

/// The physical cover and the input used to override automation.
pub trait CoverActuator {
    /// Read the current cover state.
    fn status(&self) -> impl Future<Output = Result<CoverState, SunshadeError>> + Send;

    /// Start moving the cover to `position`. Returns once the command is
    /// accepted, not once the cover arrives.
    fn move_to(&self, position: Position) -> impl Future<Output = Result<(), SunshadeError>> + Send;

    /// Read the manual override input. `None` when no such input exists.
    fn read_override(&self) -> impl Future<Output = Result<Option<bool>, SunshadeError>> + Send;
}

impl<T: CoverActuator + Send + Sync> CoverActuator for Arc<T> {
    fn status(&self) -> impl Future<Output = Result<CoverState, SunshadeError>> + Send {
        (**self).status()
    }

    fn move_to(&self, position: Position) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        (**self).move_to(position)
    }

    fn read_override(&self) -> impl Future<Output = Result<Option<bool>, SunshadeError>> + Send {
        (**self).read_override()
    }
}
