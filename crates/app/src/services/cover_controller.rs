//! Cover controller — sends position commands, skipping no-op moves.

use sunshade_domain::cover::{CoverAction, CoverState, Position};
use sunshade_domain::error::SunshadeError;

use crate::ports::CoverActuator;

/// Drives the cover through a [`CoverActuator`].
pub struct CoverController<A> {
    actuator: A,
}

impl<A: CoverActuator> CoverController<A> {
    pub fn new(actuator: A) -> Self {
        Self { actuator }
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Send the cover to `target` unless `current` already sits there.
    ///
    /// Does not wait for the cover to arrive.
    ///
    /// # Errors
    ///
    /// Returns whatever the actuator returns when the move command fails.
    #[tracing::instrument(skip(self, current), fields(current = %current.position))]
    pub async fn apply_position(
        &self,
        target: Position,
        current: &CoverState,
    ) -> Result<CoverAction, SunshadeError> {
        let action = CoverAction::plan(target, current);
        match action {
            CoverAction::Skipped => tracing::debug!("no position change needed"),
            CoverAction::MoveTo(position) => {
                self.actuator.move_to(position).await?;
                tracing::info!(%position, "cover move requested");
            }
        }
        Ok(action)
    }
}
