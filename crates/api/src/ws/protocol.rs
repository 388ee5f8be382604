//! JSON frames exchanged over the WebSocket.
//!
//! Every frame is `{"event": <name>, "data": <payload>}`.

use axum::extract::ws::Message;
use kree_core::types::DbId;
use kree_db::models::notification::Notification;
use serde::{Deserialize, Serialize};

use crate::negotiation::views::{OfferView, ProposalView};

/// Events a connected client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Inbound {
    #[serde(rename = "registerClient")]
    RegisterClient(DbId),
    #[serde(rename = "registerAgency")]
    RegisterAgency(DbId),
    #[serde(rename = "send_delivery_update")]
    SendDeliveryUpdate(DeliveryPayload),
    #[serde(rename = "confirm_delivery_arrival")]
    ConfirmDeliveryArrival(DeliveryPayload),
}

/// Payload of both delivery events, inbound from the agency and echoed to
/// the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub client_id: DbId,
    pub offer_id: DbId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPayload {
    pub user_id: DbId,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAcceptedPayload {
    pub client_id: DbId,
    pub offer_id: DbId,
    pub proposal_id: DbId,
    pub car_model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Events the server pushes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Outbound {
    #[serde(rename = "registered")]
    Registered(RegisteredPayload),
    #[serde(rename = "new_price_request")]
    NewPriceRequest(ProposalView),
    #[serde(rename = "notification")]
    Notification(Notification),
    #[serde(rename = "new_offer_received")]
    NewOfferReceived(OfferView),
    #[serde(rename = "offer_accepted_by_client")]
    OfferAcceptedByClient(OfferAcceptedPayload),
    #[serde(rename = "send_delivery_update")]
    SendDeliveryUpdate(DeliveryPayload),
    #[serde(rename = "confirm_delivery_arrival")]
    ConfirmDeliveryArrival(DeliveryPayload),
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

impl Outbound {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Outbound::Error(ErrorPayload {
            code: code.into(),
            message: message.into(),
        })
    }

    /// Event name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Outbound::Registered(_) => "registered",
            Outbound::NewPriceRequest(_) => "new_price_request",
            Outbound::Notification(_) => "notification",
            Outbound::NewOfferReceived(_) => "new_offer_received",
            Outbound::OfferAcceptedByClient(_) => "offer_accepted_by_client",
            Outbound::SendDeliveryUpdate(_) => "send_delivery_update",
            Outbound::ConfirmDeliveryArrival(_) => "confirm_delivery_arrival",
            Outbound::Error(_) => "error",
        }
    }

    /// Encode as a text frame.
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        let text = serde_json::to_string(self)?;
        Ok(Message::Text(text.into()))
    }
}
