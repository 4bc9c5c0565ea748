//! [`CoverActuator`] on the device's `Cover` and `Input` components.

use std::future::Future;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::json;

use sunshade_app::ports::CoverActuator;
use sunshade_domain::cover::{CoverState, Direction, MovementState, Position};
use sunshade_domain::error::{PayloadError, SunshadeError};

use crate::client::ShellyClient;

#[derive(Debug, Deserialize)]
struct CoverStatus {
    /// `open`, `closed`, `opening`, `closing`, `stopped` or `calibrating`.
    state: Option<String>,
    /// Absent or null while the cover is not calibrated.
    current_pos: Option<i64>,
    last_direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InputStatus {
    state: Option<bool>,
}

impl TryFrom<CoverStatus> for CoverState {
    type Error = PayloadError;

    fn try_from(status: CoverStatus) -> Result<Self, Self::Error> {
        let raw = status
            .current_pos
            .ok_or(PayloadError::MissingField("current_pos"))?;
        let position = Position::try_from(raw).map_err(|err| PayloadError::InvalidField {
            field: "current_pos",
            source: Box::new(err),
        })?;
        let movement = match status.state.as_deref() {
            Some("opening") => MovementState::Opening,
            Some("closing") => MovementState::Closing,
            _ => MovementState::Idle,
        };
        let last_direction = match status.last_direction.as_deref() {
            Some("open") => Some(Direction::Open),
            Some("close") => Some(Direction::Close),
            _ => None,
        };
        Ok(Self {
            position,
            movement,
            last_direction,
        })
    }
}

impl CoverActuator for ShellyClient {
    fn status(&self) -> impl Future<Output = Result<CoverState, SunshadeError>> + Send {
        let client = self.clone();
        let params = json!({ "id": self.config.cover_id });
        async move {
            let status: CoverStatus = client.call("Cover.GetStatus", params).await?;
            Ok(CoverState::try_from(status)?)
        }
    }

    fn move_to(&self, position: Position) -> impl Future<Output = Result<(), SunshadeError>> + Send {
        let client = self.clone();
        let params = json!({ "id": self.config.cover_id, "pos": position.get() });
        async move {
            client.call::<IgnoredAny>("Cover.GoToPosition", params).await?;
            Ok(())
        }
    }

    fn read_override(&self) -> impl Future<Output = Result<Option<bool>, SunshadeError>> + Send {
        let client = self.clone();
        let input_id = self.config.input_id;
        async move {
            let Some(id) = input_id else {
                return Ok(None);
            };
            match client
                .call::<InputStatus>("Input.GetStatus", json!({ "id": id }))
                .await
            {
                Ok(status) => Ok(status.state),
                Err(err) if err.is_not_found() => Ok(None),
                Err(err) => Err(err.into()),
            }
        }
    }
}
