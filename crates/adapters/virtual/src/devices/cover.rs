//! Virtual cover — reaches every requested position instantly.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sunshade_app::ports::CoverActuator;
use sunshade_domain::cover::{CoverState, Direction, Position};
use sunshade_domain::error::SunshadeError;

/// Number of requested positions kept in the move log.
pub const MOVE_LOG_LIMIT: usize = 64;

#[derive(Debug)]
struct CoverInner {
    state: CoverState,
    moves: VecDeque<Position>,
    manual_override: Option<bool>,
}

/// A simulated cover with a manual override input.
#[derive(Debug)]
pub struct VirtualCover {
    inner: Mutex<CoverInner>,
}

impl Default for VirtualCover {
    fn default() -> Self {
        Self::new(Position::OPEN)
    }
}

impl VirtualCover {
    /// A cover resting at `position`, override input present and released.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            inner: Mutex::new(CoverInner {
                state: CoverState::resting_at(position),
                moves: VecDeque::with_capacity(MOVE_LOG_LIMIT),
                manual_override: Some(false),
            }),
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.lock().state.position
    }

    /// The last [`MOVE_LOG_LIMIT`] positions requested through the
    /// actuator, oldest first.
    #[must_use]
    pub fn moves(&self) -> Vec<Position> {
        self.lock().moves.iter().copied().collect()
    }

    /// Set the override input. `None` simulates a device without one.
    pub fn set_override(&self, value: Option<bool>) {
        self.lock().manual_override = value;
    }

    /// Move the cover by hand, bypassing the move log.
    pub fn set_position(&self, position: Position) {
        self.lock().state = CoverState::resting_at(position);
    }

    fn lock(&self) -> MutexGuard<'_, CoverInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CoverActuator for VirtualCover {
    fn status(&self) -> impl Future<Output = Result<CoverState, SunshadeError>> + Send {
        let state = self.lock().state;
        async move { Ok(state) }
    }

    fn move_to(&self, position: Position) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        {
            let mut inner = self.lock();
            let direction = match position.cmp(&inner.state.position) {
                std::cmp::Ordering::Greater => Some(Direction::Open),
                std::cmp::Ordering::Less => Some(Direction::Close),
                std::cmp::Ordering::Equal => inner.state.last_direction,
            };
            inner.state = CoverState {
                last_direction: direction,
                ..CoverState::resting_at(position)
            };
            if inner.moves.len() == MOVE_LOG_LIMIT {
                inner.moves.pop_front();
            }
            inner.moves.push_back(position);
        }
        tracing::debug!(%position, "virtual cover moved");
        async { Ok(()) }
    }

    fn read_override(&self) -> impl Future<Output = Result<Option<bool>, SunshadeError>> + Send {
        let value = self.lock().manual_override;
        async move { Ok(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_default_to_open_with_released_override() {
        let cover = VirtualCover::default();
        let state = cover.status().await.unwrap();
        assert_eq!(state.position, Position::OPEN);
        assert_eq!(cover.read_override().await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn should_reach_target_and_record_move() {
        let cover = VirtualCover::default();
        cover.move_to(Position::saturating(60)).await.unwrap();

        let state = cover.status().await.unwrap();
        assert_eq!(state.position, Position::saturating(60));
        assert_eq!(state.last_direction, Some(Direction::Close));
        assert_eq!(cover.moves(), vec![Position::saturating(60)]);
    }

    #[tokio::test]
    async fn should_keep_only_recent_moves() {
        let cover = VirtualCover::default();
        for step in 0..MOVE_LOG_LIMIT + 10 {
            let percent = u8::try_from(step % 101).unwrap();
            cover.move_to(Position::saturating(percent)).await.unwrap();
        }

        let moves = cover.moves();
        assert_eq!(moves.len(), MOVE_LOG_LIMIT);
        assert_eq!(moves[0], Position::saturating(10));
        assert_eq!(
            moves.last().copied(),
            Some(Position::saturating(u8::try_from(MOVE_LOG_LIMIT + 9).unwrap()))
        );
    }

    #[tokio::test]
    async fn should_not_log_manual_position_changes() {
        let cover = VirtualCover::default();
        cover.set_position(Position::CLOSED);
        assert_eq!(cover.position(), Position::CLOSED);
        assert!(cover.moves().is_empty());
    }

    #[tokio::test]
    async fn should_report_missing_override_input() {
        let cover = VirtualCover::default();
        cover.set_override(None);
        assert_eq!(cover.read_override().await.unwrap(), None);
    }
}
