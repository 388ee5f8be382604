use std::sync::Arc;

use kree_core::delivery::{
    default_arrival_message, default_update_message, DeliveryStep, TITLE_CAR_ARRIVED,
    TITLE_DELIVERY_UPDATE,
};
use kree_core::error::CoreError;
use kree_core::roles::Caller;
use kree_core::status::{NotificationKind, OfferStatus};
use kree_db::models::notification::Notification;
use kree_db::models::offer::Offer;
use kree_db::store::MarketStore;

use super::tracker::DeliveryTracker;
use crate::error::AppResult;
use crate::notifications::NotificationDispatcher;
use crate::ws::protocol::{DeliveryPayload, Outbound};
use crate::ws::{Group, WsManager};

/// Handles the agency-side delivery events received over the socket.
///
/// Each event is verified against the store, applied to the
/// [`DeliveryTracker`], persisted as a notification for the client, and
/// echoed to the client's private group. A failed write rolls the stage back.
pub struct DeliveryCoordinator {
    store: Arc<dyn MarketStore>,
    dispatcher: Arc<NotificationDispatcher>,
    ws_manager: Arc<WsManager>,
    tracker: Arc<DeliveryTracker>,
}

impl DeliveryCoordinator {
    pub fn new(
        store: Arc<dyn MarketStore>,
        dispatcher: Arc<NotificationDispatcher>,
        ws_manager: Arc<WsManager>,
        tracker: Arc<DeliveryTracker>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            ws_manager,
            tracker,
        }
    }

    /// `send_delivery_update`: the car is on its way.
    pub async fn send_update(
        &self,
        caller: Caller,
        payload: DeliveryPayload,
    ) -> AppResult<Notification> {
        self.handle(caller, payload, DeliveryStep::SendUpdate).await
    }

    /// `confirm_delivery_arrival`: the car reached the pickup location.
    pub async fn confirm_arrival(
        &self,
        caller: Caller,
        payload: DeliveryPayload,
    ) -> AppResult<Notification> {
        self.handle(caller, payload, DeliveryStep::ConfirmArrival).await
    }

    async fn handle(
        &self,
        caller: Caller,
        payload: DeliveryPayload,
        step: DeliveryStep,
    ) -> AppResult<Notification> {
        let offer = self.verify(caller, &payload).await?;
        let transition = self.tracker.advance(offer.id, step).await?;

        let (record, echo) = match self.record(&offer, &payload, step).await {
            Ok(recorded) => recorded,
            Err(error) => {
                self.tracker.revert(offer.id, transition).await;
                return Err(error);
            }
        };

        let event = match step {
            DeliveryStep::SendUpdate => Outbound::SendDeliveryUpdate(echo),
            DeliveryStep::ConfirmArrival => Outbound::ConfirmDeliveryArrival(echo),
        };
        self.ws_manager
            .push(Group::User(payload.client_id), &event)
            .await;

        tracing::info!(
            offer_id = offer.id,
            client_id = payload.client_id,
            agency_id = caller.user_id,
            stage = ?transition.to,
            "Delivery event handled"
        );
        Ok(record)
    }

    /// Persist the client's notification for `step` and build the echo.
    async fn record(
        &self,
        offer: &Offer,
        payload: &DeliveryPayload,
        step: DeliveryStep,
    ) -> AppResult<(Notification, DeliveryPayload)> {
        let car_model = match payload.car_model.as_deref().map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self
                .store
                .find_car(offer.car_id)
                .await?
                .map(|car| car.model)
                .unwrap_or_else(|| "car".to_string()),
        };

        let (title, kind, default_message) = match step {
            DeliveryStep::SendUpdate => (
                TITLE_DELIVERY_UPDATE,
                NotificationKind::Delivery,
                default_update_message(&car_model),
            ),
            DeliveryStep::ConfirmArrival => (
                TITLE_CAR_ARRIVED,
                NotificationKind::DeliveryFinal,
                default_arrival_message(&car_model),
            ),
        };
        let message = match payload.message.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => default_message,
        };

        let record = self
            .dispatcher
            .notify(payload.client_id, title, message.clone(), kind, Some(offer.id))
            .await?;
        let echo = DeliveryPayload {
            client_id: payload.client_id,
            offer_id: offer.id,
            car_model: Some(car_model),
            message: Some(message),
        };
        Ok((record, echo))
    }

    /// The offer must exist, belong to the calling agency, be accepted, and
    /// answer a proposal submitted by `payload.client_id`.
    async fn verify(&self, caller: Caller, payload: &DeliveryPayload) -> AppResult<Offer> {
        caller.require_agency()?;

        let offer = self
            .store
            .find_offer(payload.offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", payload.offer_id))?;
        if offer.agency_id != caller.user_id {
            return Err(CoreError::Forbidden("Offer belongs to another agency".into()).into());
        }
        if offer.status != OfferStatus::Accepted {
            return Err(CoreError::Conflict("Offer has not been accepted".into()).into());
        }

        let proposal = self
            .store
            .find_proposal(offer.proposal_id)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceProposal", offer.proposal_id))?;
        if proposal.user_id != payload.client_id {
            return Err(
                CoreError::Forbidden("Client did not submit this offer's proposal".into()).into(),
            );
        }
        Ok(offer)
    }
}
