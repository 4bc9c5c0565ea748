//! Cover state, positions, and move planning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SunshadeError, ValidationError};

/// Cover position in percent: `0` is fully closed, `100` fully open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const CLOSED: Self = Self(0);
    pub const OPEN: Self = Self(100);

    /// Create a position, checking it is within `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PositionOutOfRange`] otherwise.
    pub fn new(value: i64) -> Result<Self, SunshadeError> {
        Ok(Self::try_from(value)?)
    }

    /// Create a position from a percentage, saturating at 100.
    #[must_use]
    pub const fn saturating(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Position {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(ValidationError::PositionOutOfRange(value)),
        }
    }
}

impl From<Position> for u8 {
    fn from(value: Position) -> Self {
        value.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// What the motor is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementState {
    Idle,
    Opening,
    Closing,
}

/// Direction of the most recent movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Open,
    Close,
}

/// Cover status as read from the actuator before a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverState {
    pub position: Position,
    pub movement: MovementState,
    pub last_direction: Option<Direction>,
}

impl CoverState {
    /// An idle cover resting at `position`.
    #[must_use]
    pub fn resting_at(position: Position) -> Self {
        Self {
            position,
            movement: MovementState::Idle,
            last_direction: None,
        }
    }
}

/// What to do with the cover for a given target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "position", rename_all = "snake_case")]
pub enum CoverAction {
    /// The cover already sits at the target.
    Skipped,
    /// Send the cover to this position.
    MoveTo(Position),
}

impl CoverAction {
    /// Plan the action for `target` given the last-fetched `current` state.
    ///
    /// Equal positions never produce a move, regardless of movement state.
    #[must_use]
    pub fn plan(target: Position, current: &CoverState) -> Self {
        if target == current.position {
            Self::Skipped
        } else {
            Self::MoveTo(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_bounds_and_reject_out_of_range() {
        assert_eq!(Position::new(0).unwrap(), Position::CLOSED);
        assert_eq!(Position::new(100).unwrap(), Position::OPEN);
        assert!(matches!(
            Position::new(101),
            Err(SunshadeError::Validation(
                ValidationError::PositionOutOfRange(101)
            ))
        ));
        assert!(Position::new(-1).is_err());
    }

    #[test]
    fn should_skip_when_target_equals_current() {
        let current = CoverState::resting_at(Position::new(60).unwrap());
        assert_eq!(
            CoverAction::plan(Position::new(60).unwrap(), &current),
            CoverAction::Skipped
        );
    }

    #[test]
    fn should_move_when_target_differs() {
        let current = CoverState::resting_at(Position::OPEN);
        let target = Position::new(60).unwrap();
        assert_eq!(CoverAction::plan(target, &current), CoverAction::MoveTo(target));
    }

    #[test]
    fn should_deserialize_position_from_number() {
        let pos: Position = serde_json::from_str("42").unwrap();
        assert_eq!(pos.get(), 42);
        assert!(serde_json::from_str::<Position>("150").is_err());
    }

    #[test]
    fn should_serialize_action_with_tag() {
        let json = serde_json::to_value(CoverAction::MoveTo(Position::new(60).unwrap())).unwrap();
        assert_eq!(json["action"], "move_to");
        assert_eq!(json["position"], 60);
    }
}
