use async_trait::async_trait;
use kree_core::types::DbId;

use super::{MarketStore, Settlement};
use crate::error::DbError;
use crate::models::car::{Car, CreateCar};
use crate::models::notification::{NewNotification, Notification};
use crate::models::offer::{NewOffer, Offer};
use crate::models::price_proposal::{NewPriceProposal, PriceProposal};
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::user::{CreateUser, User};
use crate::repositories::{
    CarRepo, NotificationRepo, OfferRepo, PriceProposalRepo, ReservationRepo, UserRepo,
};
use crate::DbPool;

/// [`MarketStore`] backed by PostgreSQL through the repository structs.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn ping(&self) -> Result<(), DbError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, DbError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, DbError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_car(&self, input: &CreateCar) -> Result<Car, DbError> {
        Ok(CarRepo::create(&self.pool, input).await?)
    }

    async fn find_car(&self, id: DbId) -> Result<Option<Car>, DbError> {
        Ok(CarRepo::find_by_id(&self.pool, id).await?)
    }

    async fn car_ids_for_agency(&self, agency_id: DbId) -> Result<Vec<DbId>, DbError> {
        Ok(CarRepo::ids_for_agency(&self.pool, agency_id).await?)
    }

    async fn create_proposal(&self, input: &NewPriceProposal) -> Result<PriceProposal, DbError> {
        Ok(PriceProposalRepo::create(&self.pool, input).await?)
    }

    async fn find_proposal(&self, id: DbId) -> Result<Option<PriceProposal>, DbError> {
        Ok(PriceProposalRepo::find_by_id(&self.pool, id).await?)
    }

    async fn proposals_for_client(&self, user_id: DbId) -> Result<Vec<PriceProposal>, DbError> {
        Ok(PriceProposalRepo::list_by_user(&self.pool, user_id).await?)
    }

    async fn proposals_for_cars(&self, car_ids: &[DbId]) -> Result<Vec<PriceProposal>, DbError> {
        if car_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(PriceProposalRepo::list_by_cars(&self.pool, car_ids).await?)
    }

    async fn create_offer(&self, input: &NewOffer) -> Result<Option<Offer>, DbError> {
        Ok(OfferRepo::create_if_open(&self.pool, input).await?)
    }

    async fn find_offer(&self, id: DbId) -> Result<Option<Offer>, DbError> {
        Ok(OfferRepo::find_by_id(&self.pool, id).await?)
    }

    async fn offers_for_agency(&self, agency_id: DbId) -> Result<Vec<Offer>, DbError> {
        Ok(OfferRepo::list_by_agency(&self.pool, agency_id).await?)
    }

    async fn offers_for_client(&self, client_id: DbId) -> Result<Vec<Offer>, DbError> {
        Ok(OfferRepo::list_for_client(&self.pool, client_id).await?)
    }

    async fn reject_offer(&self, id: DbId) -> Result<Option<Offer>, DbError> {
        Ok(OfferRepo::reject_if_pending(&self.pool, id).await?)
    }

    async fn settle_offer(
        &self,
        offer_id: DbId,
        reservation: &NewReservation,
    ) -> Result<Settlement, DbError> {
        let mut tx = self.pool.begin().await?;

        // Dropping `tx` without commit rolls back the proposal CAS.
        if !PriceProposalRepo::accept_if_pending(&mut tx, reservation.proposal_id).await? {
            return Ok(Settlement::ProposalClosed);
        }
        if !OfferRepo::accept_if_pending(&mut tx, offer_id).await? {
            return Ok(Settlement::OfferClosed);
        }
        let created = ReservationRepo::insert(&mut tx, Some(offer_id), reservation).await?;

        tx.commit().await?;
        tracing::debug!(
            offer_id,
            proposal_id = reservation.proposal_id,
            reservation_id = created.id,
            "Offer settled"
        );
        Ok(Settlement::Settled(created))
    }

    async fn settle_proposal(&self, reservation: &NewReservation) -> Result<Settlement, DbError> {
        let mut tx = self.pool.begin().await?;

        if !PriceProposalRepo::accept_if_pending(&mut tx, reservation.proposal_id).await? {
            return Ok(Settlement::ProposalClosed);
        }
        let created = ReservationRepo::insert(&mut tx, None, reservation).await?;

        tx.commit().await?;
        tracing::debug!(
            proposal_id = reservation.proposal_id,
            reservation_id = created.id,
            "Proposal settled directly"
        );
        Ok(Settlement::Settled(created))
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, DbError> {
        Ok(ReservationRepo::list(&self.pool).await?)
    }

    async fn find_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError> {
        Ok(ReservationRepo::find_by_id(&self.pool, id).await?)
    }

    async fn update_reservation(
        &self,
        id: DbId,
        changes: &UpdateReservation,
    ) -> Result<Option<Reservation>, DbError> {
        Ok(ReservationRepo::update(&self.pool, id, changes).await?)
    }

    async fn delete_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError> {
        Ok(ReservationRepo::delete(&self.pool, id).await?)
    }

    async fn create_notification(
        &self,
        input: &NewNotification,
    ) -> Result<Notification, DbError> {
        Ok(NotificationRepo::create(&self.pool, input).await?)
    }

    async fn list_notifications(
        &self,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, DbError> {
        Ok(NotificationRepo::list_for_user(&self.pool, user_id, unread_only, limit, offset).await?)
    }

    async fn unread_count(&self, user_id: DbId) -> Result<i64, DbError> {
        Ok(NotificationRepo::unread_count(&self.pool, user_id).await?)
    }

    async fn mark_notification_read(&self, id: DbId, user_id: DbId) -> Result<bool, DbError> {
        Ok(NotificationRepo::mark_read(&self.pool, id, user_id).await?)
    }

    async fn mark_all_notifications_read(&self, user_id: DbId) -> Result<u64, DbError> {
        Ok(NotificationRepo::mark_all_read(&self.pool, user_id).await?)
    }
}
