//! The persistence seam used by the API layer.
//!
//! [`MarketStore`] is object-safe so the server can hold an
//! `Arc<dyn MarketStore>` and pick [`PgStore`] or [`MemoryStore`] at startup.
//! Both implementations make the settlement operations atomic: the status
//! compare-and-set and the reservation insert either all happen or none do.

mod memory;
mod postgres;

use async_trait::async_trait;
use kree_core::types::DbId;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::DbError;
use crate::models::car::{Car, CreateCar};
use crate::models::notification::{NewNotification, Notification};
use crate::models::offer::{NewOffer, Offer};
use crate::models::price_proposal::{NewPriceProposal, PriceProposal};
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::user::{CreateUser, User};

/// Outcome of a settlement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Statuses moved to `accepted` and the reservation was created.
    Settled(Reservation),
    /// The proposal was no longer `pending`; nothing was written.
    ProposalClosed,
    /// The offer was no longer `pending`; nothing was written.
    OfferClosed,
}

#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> Result<(), DbError>;

    async fn create_user(&self, input: &CreateUser) -> Result<User, DbError>;
    async fn find_user(&self, id: DbId) -> Result<Option<User>, DbError>;

    async fn create_car(&self, input: &CreateCar) -> Result<Car, DbError>;
    async fn find_car(&self, id: DbId) -> Result<Option<Car>, DbError>;
    async fn car_ids_for_agency(&self, agency_id: DbId) -> Result<Vec<DbId>, DbError>;

    async fn create_proposal(&self, input: &NewPriceProposal) -> Result<PriceProposal, DbError>;
    async fn find_proposal(&self, id: DbId) -> Result<Option<PriceProposal>, DbError>;
    async fn proposals_for_client(&self, user_id: DbId) -> Result<Vec<PriceProposal>, DbError>;
    /// Proposals whose reference car is in `car_ids`.
    async fn proposals_for_cars(&self, car_ids: &[DbId]) -> Result<Vec<PriceProposal>, DbError>;

    /// Insert a `pending` offer only if its proposal is still `pending`.
    async fn create_offer(&self, input: &NewOffer) -> Result<Option<Offer>, DbError>;
    async fn find_offer(&self, id: DbId) -> Result<Option<Offer>, DbError>;
    async fn offers_for_agency(&self, agency_id: DbId) -> Result<Vec<Offer>, DbError>;
    /// Offers made on any proposal submitted by `client_id`.
    async fn offers_for_client(&self, client_id: DbId) -> Result<Vec<Offer>, DbError>;
    /// Compare-and-set `pending -> rejected`; `None` if the offer was not pending.
    async fn reject_offer(&self, id: DbId) -> Result<Option<Offer>, DbError>;

    /// Accept `offer_id` and its proposal, then insert `reservation`.
    async fn settle_offer(
        &self,
        offer_id: DbId,
        reservation: &NewReservation,
    ) -> Result<Settlement, DbError>;

    /// Accept `reservation.proposal_id` without an offer, then insert.
    async fn settle_proposal(&self, reservation: &NewReservation) -> Result<Settlement, DbError>;

    async fn list_reservations(&self) -> Result<Vec<Reservation>, DbError>;
    async fn find_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError>;
    async fn update_reservation(
        &self,
        id: DbId,
        changes: &UpdateReservation,
    ) -> Result<Option<Reservation>, DbError>;
    async fn delete_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError>;

    async fn create_notification(&self, input: &NewNotification)
        -> Result<Notification, DbError>;
    async fn list_notifications(
        &self,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, DbError>;
    async fn unread_count(&self, user_id: DbId) -> Result<i64, DbError>;
    /// `false` when no notification `id` belongs to `user_id`.
    async fn mark_notification_read(&self, id: DbId, user_id: DbId) -> Result<bool, DbError>;
    async fn mark_all_notifications_read(&self, user_id: DbId) -> Result<u64, DbError>;
}
