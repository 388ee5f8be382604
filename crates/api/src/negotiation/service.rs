use std::sync::Arc;

use chrono::Utc;
use kree_core::error::CoreError;
use kree_core::negotiation::{
    ensure_car_owner, ensure_offer_pending, ensure_proposal_open, ensure_proposal_owner,
    validate_offer_price, validate_price_range, validate_rental_window, ExpiryPolicy,
};
use kree_core::notification::{
    offer_accepted_message, offer_received_message, offer_rejected_message,
    proposal_accepted_message, TITLE_OFFER_ACCEPTED, TITLE_OFFER_RECEIVED, TITLE_OFFER_REJECTED,
    TITLE_PROPOSAL_ACCEPTED,
};
use kree_core::roles::Caller;
use kree_core::status::{
    NotificationKind, OfferAnswer, OfferStatus, PaymentStatus, ReservationStatus,
};
use kree_core::types::DbId;
use kree_db::models::offer::{CreateOffer, Offer};
use kree_db::models::price_proposal::{CreatePriceProposal, PriceProposal};
use kree_db::models::reservation::{NewReservation, Reservation};
use kree_db::store::{MarketStore, Settlement};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::views::{Lookup, OfferView, ProposalView};
use crate::delivery::DeliveryTracker;
use crate::error::AppResult;
use crate::notifications::NotificationDispatcher;
use crate::ws::protocol::{OfferAcceptedPayload, Outbound};

/// Body of `PUT /offers/answer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOfferRequest {
    pub offer_id: DbId,
    #[serde(default)]
    pub status: String,
}

/// Result of answering an offer. `reservation` is set only on acceptance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnswerOutcome {
    pub offer: Offer,
    pub reservation: Option<Reservation>,
}

/// Coordinates proposals, offers, and reservations.
pub struct NegotiationService {
    pub(super) store: Arc<dyn MarketStore>,
    dispatcher: Arc<NotificationDispatcher>,
    pub(super) deliveries: Arc<DeliveryTracker>,
    expiry: ExpiryPolicy,
}

impl NegotiationService {
    pub fn new(
        store: Arc<dyn MarketStore>,
        dispatcher: Arc<NotificationDispatcher>,
        deliveries: Arc<DeliveryTracker>,
        expiry: ExpiryPolicy,
    ) -> Self {
        Self {
            store,
            dispatcher,
            deliveries,
            expiry,
        }
    }

    pub fn expiry(&self) -> &ExpiryPolicy {
        &self.expiry
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// Create a `pending` proposal and broadcast it to every agency.
    pub async fn submit_proposal(
        &self,
        caller: Caller,
        input: CreatePriceProposal,
    ) -> AppResult<PriceProposal> {
        caller.require_client()?;
        input.validate()?;
        validate_price_range(input.price_min, input.price_max).map_err(CoreError::Validation)?;
        validate_rental_window(input.start_date, input.end_date).map_err(CoreError::Validation)?;
        if input.pickup_location.trim().is_empty() || input.return_location.trim().is_empty() {
            return Err(
                CoreError::Validation("pickupLocation and returnLocation are required".into())
                    .into(),
            );
        }
        if let Some(car_id) = input.car_id {
            if self.store.find_car(car_id).await?.is_none() {
                return Err(CoreError::not_found("Car", car_id).into());
            }
        }

        let expires_at = self.expiry.expires_at(Utc::now());
        let proposal = self
            .store
            .create_proposal(&input.into_new(caller.user_id, expires_at))
            .await?;

        let view = Lookup::new(self.store.as_ref())
            .proposal_view(proposal.clone())
            .await?;
        let reached = self
            .dispatcher
            .broadcast_agencies(&Outbound::NewPriceRequest(view))
            .await;
        tracing::info!(
            proposal_id = proposal.id,
            user_id = caller.user_id,
            agencies = reached,
            "Price proposal submitted"
        );
        Ok(proposal)
    }

    /// Proposals submitted by the calling client.
    pub async fn proposals_for_client(&self, caller: Caller) -> AppResult<Vec<ProposalView>> {
        caller.require_client()?;
        let proposals = self.store.proposals_for_client(caller.user_id).await?;
        Ok(Lookup::new(self.store.as_ref())
            .proposal_views(proposals)
            .await?)
    }

    /// Proposals whose reference car belongs to the calling agency.
    pub async fn proposals_for_agency(&self, caller: Caller) -> AppResult<Vec<ProposalView>> {
        caller.require_agency()?;
        let car_ids = self.store.car_ids_for_agency(caller.user_id).await?;
        let proposals = self.store.proposals_for_cars(&car_ids).await?;
        Ok(Lookup::new(self.store.as_ref())
            .proposal_views(proposals)
            .await?)
    }

    /// Accept a proposal at its `priceMax` without an offer.
    ///
    /// Only the agency owning the proposal's reference car may do this.
    pub async fn accept_proposal(&self, caller: Caller, proposal_id: DbId) -> AppResult<Reservation> {
        caller.require_agency()?;

        let proposal = self.find_proposal(proposal_id).await?;
        let car_id = proposal.car_id.ok_or_else(|| {
            CoreError::Forbidden("Proposal has no reference car to accept directly".into())
        })?;
        let car = self
            .store
            .find_car(car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", car_id))?;
        ensure_car_owner(car.agency_id, caller.user_id)?;
        ensure_proposal_open(proposal.status)?;
        self.expiry.check(proposal.expires_at, Utc::now())?;

        let new_reservation = snapshot(&proposal, car.id, car.agency_id, proposal.price_max);
        let reservation = match self.store.settle_proposal(&new_reservation).await? {
            Settlement::Settled(r) => r,
            Settlement::ProposalClosed | Settlement::OfferClosed => {
                return Err(proposal_closed().into());
            }
        };
        tracing::info!(
            proposal_id,
            reservation_id = reservation.id,
            agency_id = caller.user_id,
            "Proposal accepted directly"
        );

        if let Err(error) = self
            .announce_proposal_accepted(caller, &proposal, &car.model, reservation.id)
            .await
        {
            tracing::warn!(
                proposal_id,
                reservation_id = reservation.id,
                error = %error,
                "Reservation created but client notification failed"
            );
        }

        Ok(reservation)
    }

    async fn announce_proposal_accepted(
        &self,
        caller: Caller,
        proposal: &PriceProposal,
        car_model: &str,
        reservation_id: DbId,
    ) -> AppResult<()> {
        let agency_name = self.user_name(caller.user_id, "An agency").await?;
        self.dispatcher
            .notify(
                proposal.user_id,
                TITLE_PROPOSAL_ACCEPTED,
                proposal_accepted_message(&agency_name, proposal.price_max, car_model),
                NotificationKind::Reservation,
                Some(reservation_id),
            )
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Offers
    // -----------------------------------------------------------------------

    /// Create a `pending` offer on an open proposal and notify its client.
    pub async fn submit_offer(&self, caller: Caller, input: CreateOffer) -> AppResult<Offer> {
        caller.require_agency()?;
        input.validate()?;
        validate_offer_price(input.price).map_err(CoreError::Validation)?;
        if input.message.trim().is_empty() {
            return Err(CoreError::Validation("message is required".into()).into());
        }

        let car = self
            .store
            .find_car(input.car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", input.car_id))?;
        ensure_car_owner(car.agency_id, caller.user_id)?;

        let proposal = self.find_proposal(input.proposal_id).await?;
        ensure_proposal_open(proposal.status)?;
        self.expiry.check(proposal.expires_at, Utc::now())?;

        let offer = self
            .store
            .create_offer(&input.into_new(caller.user_id))
            .await?
            .ok_or_else(proposal_closed)?;
        tracing::info!(
            offer_id = offer.id,
            proposal_id = proposal.id,
            agency_id = caller.user_id,
            price = offer.price,
            "Offer submitted"
        );

        let agency_name = self.user_name(caller.user_id, "An agency").await?;
        self.dispatcher
            .notify(
                proposal.user_id,
                TITLE_OFFER_RECEIVED,
                offer_received_message(&agency_name, offer.price),
                NotificationKind::Offre,
                Some(offer.id),
            )
            .await?;

        let view = Lookup::new(self.store.as_ref())
            .offer_view(offer.clone())
            .await?;
        self.dispatcher
            .push_to_user(proposal.user_id, &Outbound::NewOfferReceived(view))
            .await;

        Ok(offer)
    }

    /// Offers made by the calling agency.
    pub async fn offers_for_agency(&self, caller: Caller) -> AppResult<Vec<OfferView>> {
        caller.require_agency()?;
        let offers = self.store.offers_for_agency(caller.user_id).await?;
        Ok(Lookup::new(self.store.as_ref()).offer_views(offers).await?)
    }

    /// Offers made on the calling client's proposals.
    pub async fn offers_for_client(&self, caller: Caller) -> AppResult<Vec<OfferView>> {
        caller.require_client()?;
        let offers = self.store.offers_for_client(caller.user_id).await?;
        Ok(Lookup::new(self.store.as_ref()).offer_views(offers).await?)
    }

    /// Accept or reject an offer on one of the caller's proposals.
    ///
    /// Acceptance settles the proposal atomically; only the first settlement
    /// of a proposal succeeds and any later one is a `Conflict`.
    pub async fn answer_offer(
        &self,
        caller: Caller,
        request: AnswerOfferRequest,
    ) -> AppResult<OfferAnswerOutcome> {
        caller.require_client()?;
        let answer: OfferAnswer = request.status.parse().map_err(CoreError::from)?;

        let offer = self
            .store
            .find_offer(request.offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Offer", request.offer_id))?;
        let proposal = self.find_proposal(offer.proposal_id).await?;
        ensure_proposal_owner(proposal.user_id, caller.user_id)?;
        ensure_offer_pending(offer.status)?;

        match answer {
            OfferAnswer::Accepted => self.accept_offer(caller, offer, proposal).await,
            OfferAnswer::Rejected => self.reject_offer(offer).await,
        }
    }

    async fn accept_offer(
        &self,
        caller: Caller,
        offer: Offer,
        proposal: PriceProposal,
    ) -> AppResult<OfferAnswerOutcome> {
        self.expiry.check(proposal.expires_at, Utc::now())?;
        ensure_proposal_open(proposal.status)?;

        let new_reservation = snapshot(&proposal, offer.car_id, offer.agency_id, offer.price);
        let reservation = match self.store.settle_offer(offer.id, &new_reservation).await? {
            Settlement::Settled(r) => r,
            Settlement::ProposalClosed => return Err(proposal_closed().into()),
            Settlement::OfferClosed => return Err(offer_closed().into()),
        };
        self.deliveries.open(offer.id).await;
        tracing::info!(
            offer_id = offer.id,
            proposal_id = proposal.id,
            reservation_id = reservation.id,
            "Offer accepted"
        );

        if let Err(error) = self
            .announce_offer_accepted(caller, &offer, proposal.id, reservation.id)
            .await
        {
            tracing::warn!(
                offer_id = offer.id,
                reservation_id = reservation.id,
                error = %error,
                "Reservation created but agency notification failed"
            );
        }

        let offer = match self.store.find_offer(offer.id).await {
            Ok(Some(stored)) => stored,
            _ => Offer {
                status: OfferStatus::Accepted,
                ..offer
            },
        };
        Ok(OfferAnswerOutcome {
            offer,
            reservation: Some(reservation),
        })
    }

    async fn announce_offer_accepted(
        &self,
        caller: Caller,
        offer: &Offer,
        proposal_id: DbId,
        reservation_id: DbId,
    ) -> AppResult<()> {
        let client_name = self.user_name(caller.user_id, "A client").await?;
        let car_model = self
            .store
            .find_car(offer.car_id)
            .await?
            .map(|car| car.model)
            .unwrap_or_default();
        self.dispatcher
            .notify(
                offer.agency_id,
                TITLE_OFFER_ACCEPTED,
                offer_accepted_message(&client_name, offer.price, &car_model),
                NotificationKind::Reservation,
                Some(reservation_id),
            )
            .await?;
        self.dispatcher
            .push_to_user(
                offer.agency_id,
                &Outbound::OfferAcceptedByClient(OfferAcceptedPayload {
                    client_id: caller.user_id,
                    offer_id: offer.id,
                    proposal_id,
                    car_model,
                }),
            )
            .await;
        Ok(())
    }

    async fn reject_offer(&self, offer: Offer) -> AppResult<OfferAnswerOutcome> {
        let offer = self
            .store
            .reject_offer(offer.id)
            .await?
            .ok_or_else(offer_closed)?;
        tracing::info!(offer_id = offer.id, "Offer rejected");

        if let Err(error) = self.announce_offer_rejected(&offer).await {
            tracing::warn!(
                offer_id = offer.id,
                error = %error,
                "Offer rejected but agency notification failed"
            );
        }

        Ok(OfferAnswerOutcome {
            offer,
            reservation: None,
        })
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    pub(super) async fn find_proposal(&self, id: DbId) -> AppResult<PriceProposal> {
        Ok(self
            .store
            .find_proposal(id)
            .await?
            .ok_or_else(|| CoreError::not_found("PriceProposal", id))?)
    }

    async fn announce_offer_rejected(&self, offer: &Offer) -> AppResult<()> {
        let car_brand = self
            .store
            .find_car(offer.car_id)
            .await?
            .map(|car| car.brand)
            .unwrap_or_default();
        self.dispatcher
            .notify(
                offer.agency_id,
                TITLE_OFFER_REJECTED,
                offer_rejected_message(&car_brand),
                NotificationKind::Offre,
                Some(offer.id),
            )
            .await?;
        Ok(())
    }

    async fn user_name(&self, id: DbId, fallback: &str) -> AppResult<String> {
        Ok(self
            .store
            .find_user(id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| fallback.to_string()))
    }
}

/// The reservation created when `proposal` is settled.
fn snapshot(
    proposal: &PriceProposal,
    car_id: DbId,
    agency_id: DbId,
    total_price: f64,
) -> NewReservation {
    NewReservation {
        user_id: proposal.user_id,
        car_id,
        agency_id,
        proposal_id: proposal.id,
        start_date: proposal.start_date,
        end_date: proposal.end_date,
        pickup_location: proposal.pickup_location.clone(),
        return_location: proposal.return_location.clone(),
        total_price,
        status: ReservationStatus::Accepted,
        payment_status: PaymentStatus::Pending,
    }
}

fn proposal_closed() -> CoreError {
    CoreError::Conflict("Price proposal is no longer pending".into())
}

fn offer_closed() -> CoreError {
    CoreError::Conflict("Offer has already been answered".into())
}
