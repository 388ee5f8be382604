//! Post-reservation delivery handshake.
//!
//! An accepted offer opens the flow at [`DeliveryStage::EnRoutePending`]. The
//! agency announces the car is on its way, then confirms arrival, after which
//! the flow is cleared. Arrival before an en-route update is refused.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const TITLE_DELIVERY_UPDATE: &str = "Delivery Update";
pub const TITLE_CAR_ARRIVED: &str = "Car Arrived";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStage {
    None,
    EnRoutePending,
    EnRouteSent,
}

/// An agency-issued delivery event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    SendUpdate,
    ConfirmArrival,
}

impl DeliveryStage {
    /// Apply `step`. Returns the next stage, or `None` once the flow is
    /// complete and should be forgotten.
    pub fn advance(self, step: DeliveryStep) -> Result<Option<DeliveryStage>, CoreError> {
        match (self, step) {
            (DeliveryStage::EnRoutePending, DeliveryStep::SendUpdate)
            | (DeliveryStage::EnRouteSent, DeliveryStep::SendUpdate) => {
                Ok(Some(DeliveryStage::EnRouteSent))
            }
            (DeliveryStage::EnRouteSent, DeliveryStep::ConfirmArrival) => Ok(None),
            (DeliveryStage::None, DeliveryStep::SendUpdate) => Err(CoreError::Conflict(
                "No delivery is open for this offer".into(),
            )),
            (_, DeliveryStep::ConfirmArrival) => Err(CoreError::Conflict(
                "Send a delivery update before confirming arrival".into(),
            )),
        }
    }
}

pub fn default_update_message(car_model: &str) -> String {
    format!("Your {car_model} is on its way! Estimated arrival: 10 minutes.")
}

pub fn default_arrival_message(car_model: &str) -> String {
    format!("Your {car_model} has arrived at the pickup location. Safe travels!")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn happy_path_clears_after_arrival() {
        let stage = DeliveryStage::EnRoutePending
            .advance(DeliveryStep::SendUpdate)
            .unwrap();
        assert_eq!(stage, Some(DeliveryStage::EnRouteSent));

        // a repeated update keeps the flow en route
        let stage = DeliveryStage::EnRouteSent
            .advance(DeliveryStep::SendUpdate)
            .unwrap();
        assert_eq!(stage, Some(DeliveryStage::EnRouteSent));

        assert_eq!(
            DeliveryStage::EnRouteSent
                .advance(DeliveryStep::ConfirmArrival)
                .unwrap(),
            None
        );
    }

    #[test]
    fn arrival_before_update_is_refused() {
        assert_matches!(
            DeliveryStage::EnRoutePending.advance(DeliveryStep::ConfirmArrival),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            DeliveryStage::None.advance(DeliveryStep::ConfirmArrival),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            DeliveryStage::None.advance(DeliveryStep::SendUpdate),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn stage_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&DeliveryStage::EnRoutePending).unwrap(),
            "\"EN_ROUTE_PENDING\""
        );
    }

    #[test]
    fn default_messages_mention_the_model() {
        assert_eq!(
            default_update_message("Clio"),
            "Your Clio is on its way! Estimated arrival: 10 minutes."
        );
        assert!(default_arrival_message("Clio").contains("Clio has arrived"));
    }
}
