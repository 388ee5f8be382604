use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use kree_core::status::{OfferStatus, ProposalStatus};
use kree_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use super::{MarketStore, Settlement};
use crate::error::DbError;
use crate::models::car::{Car, CreateCar};
use crate::models::notification::{NewNotification, Notification};
use crate::models::offer::{NewOffer, Offer};
use crate::models::price_proposal::{NewPriceProposal, PriceProposal};
use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};
use crate::models::user::{CreateUser, User};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    users: BTreeMap<DbId, User>,
    cars: BTreeMap<DbId, Car>,
    proposals: BTreeMap<DbId, PriceProposal>,
    offers: BTreeMap<DbId, Offer>,
    reservations: BTreeMap<DbId, Reservation>,
    notifications: BTreeMap<DbId, Notification>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn require_user(&self, id: DbId) -> Result<(), DbError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DbError::MissingReference { entity: "user", id })
        }
    }

    fn require_car(&self, id: DbId) -> Result<(), DbError> {
        if self.cars.contains_key(&id) {
            Ok(())
        } else {
            Err(DbError::MissingReference { entity: "car", id })
        }
    }

    fn insert_reservation(
        &mut self,
        offer_id: Option<DbId>,
        input: &NewReservation,
        now: Timestamp,
    ) -> Reservation {
        let id = self.next_id();
        let reservation = Reservation {
            id,
            user_id: input.user_id,
            car_id: input.car_id,
            agency_id: input.agency_id,
            proposal_id: input.proposal_id,
            offer_id,
            start_date: input.start_date,
            end_date: input.end_date,
            pickup_location: input.pickup_location.clone(),
            return_location: input.return_location.clone(),
            total_price: input.total_price,
            status: input.status,
            payment_status: input.payment_status,
            created_at: now,
            updated_at: now,
        };
        self.reservations.insert(id, reservation.clone());
        reservation
    }
}

/// Newest first, ties broken by id.
fn newest_first<T>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> (Timestamp, DbId),
) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

/// Process-local [`MarketStore`] for tests and `STORE_BACKEND=memory`.
///
/// All tables live behind one `RwLock`, so a settlement holds the write
/// guard for its whole compare-and-set plus insert.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, DbError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let user = User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            role: input.role,
            phone_number: input.phone_number.clone(),
            city: input.city.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, DbError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_car(&self, input: &CreateCar) -> Result<Car, DbError> {
        let mut tables = self.tables.write().await;
        tables.require_user(input.agency_id)?;
        let id = tables.next_id();
        let car = Car {
            id,
            agency_id: input.agency_id,
            model: input.model.clone(),
            brand: input.brand.clone(),
            color: input.color.clone(),
            fuel_type: input.fuel_type.clone(),
            gearbox: input.gearbox.clone(),
            seats: input.seats,
            km: input.km,
            image_url: input.image_url.clone(),
            created_at: Utc::now(),
        };
        tables.cars.insert(id, car.clone());
        Ok(car)
    }

    async fn find_car(&self, id: DbId) -> Result<Option<Car>, DbError> {
        Ok(self.tables.read().await.cars.get(&id).cloned())
    }

    async fn car_ids_for_agency(&self, agency_id: DbId) -> Result<Vec<DbId>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .cars
            .values()
            .filter(|car| car.agency_id == agency_id)
            .map(|car| car.id)
            .collect())
    }

    async fn create_proposal(&self, input: &NewPriceProposal) -> Result<PriceProposal, DbError> {
        let mut tables = self.tables.write().await;
        tables.require_user(input.user_id)?;
        if let Some(car_id) = input.car_id {
            tables.require_car(car_id)?;
        }
        let id = tables.next_id();
        let now = Utc::now();
        let proposal = PriceProposal {
            id,
            user_id: input.user_id,
            car_id: input.car_id,
            model: input.model.clone(),
            color: input.color.clone(),
            gearbox: input.gearbox.clone(),
            fuel_type: input.fuel_type.clone(),
            seats: input.seats,
            features: input.features.clone(),
            price_min: input.price_min,
            price_max: input.price_max,
            start_date: input.start_date,
            end_date: input.end_date,
            pickup_location: input.pickup_location.clone(),
            return_location: input.return_location.clone(),
            identity_document_url: input.identity_document_url.clone(),
            portrait_url: input.portrait_url.clone(),
            status: ProposalStatus::Pending,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        tables.proposals.insert(id, proposal.clone());
        Ok(proposal)
    }

    async fn find_proposal(&self, id: DbId) -> Result<Option<PriceProposal>, DbError> {
        Ok(self.tables.read().await.proposals.get(&id).cloned())
    }

    async fn proposals_for_client(&self, user_id: DbId) -> Result<Vec<PriceProposal>, DbError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .proposals
                .values()
                .filter(|p| p.user_id == user_id)
                .cloned(),
            |p| (p.created_at, p.id),
        ))
    }

    async fn proposals_for_cars(&self, car_ids: &[DbId]) -> Result<Vec<PriceProposal>, DbError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .proposals
                .values()
                .filter(|p| p.car_id.is_some_and(|car_id| car_ids.contains(&car_id)))
                .cloned(),
            |p| (p.created_at, p.id),
        ))
    }

    async fn create_offer(&self, input: &NewOffer) -> Result<Option<Offer>, DbError> {
        let mut tables = self.tables.write().await;
        let open = tables
            .proposals
            .get(&input.proposal_id)
            .is_some_and(|p| p.status.is_open());
        if !open {
            return Ok(None);
        }
        tables.require_user(input.agency_id)?;
        tables.require_car(input.car_id)?;

        let id = tables.next_id();
        let now = Utc::now();
        let offer = Offer {
            id,
            agency_id: input.agency_id,
            car_id: input.car_id,
            proposal_id: input.proposal_id,
            price: input.price,
            message: input.message.clone(),
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.offers.insert(id, offer.clone());
        Ok(Some(offer))
    }

    async fn find_offer(&self, id: DbId) -> Result<Option<Offer>, DbError> {
        Ok(self.tables.read().await.offers.get(&id).cloned())
    }

    async fn offers_for_agency(&self, agency_id: DbId) -> Result<Vec<Offer>, DbError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .offers
                .values()
                .filter(|o| o.agency_id == agency_id)
                .cloned(),
            |o| (o.created_at, o.id),
        ))
    }

    async fn offers_for_client(&self, client_id: DbId) -> Result<Vec<Offer>, DbError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .offers
                .values()
                .filter(|o| {
                    tables
                        .proposals
                        .get(&o.proposal_id)
                        .is_some_and(|p| p.user_id == client_id)
                })
                .cloned(),
            |o| (o.created_at, o.id),
        ))
    }

    async fn reject_offer(&self, id: DbId) -> Result<Option<Offer>, DbError> {
        let mut tables = self.tables.write().await;
        match tables.offers.get_mut(&id) {
            Some(offer) if offer.status.is_pending() => {
                offer.status = OfferStatus::Rejected;
                offer.updated_at = Utc::now();
                Ok(Some(offer.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn settle_offer(
        &self,
        offer_id: DbId,
        reservation: &NewReservation,
    ) -> Result<Settlement, DbError> {
        let mut tables = self.tables.write().await;

        // Check both guards before mutating either row.
        let proposal_open = tables
            .proposals
            .get(&reservation.proposal_id)
            .is_some_and(|p| p.status.is_open());
        if !proposal_open {
            return Ok(Settlement::ProposalClosed);
        }
        let offer_pending = tables
            .offers
            .get(&offer_id)
            .is_some_and(|o| o.status.is_pending());
        if !offer_pending {
            return Ok(Settlement::OfferClosed);
        }

        let now = Utc::now();
        if let Some(proposal) = tables.proposals.get_mut(&reservation.proposal_id) {
            proposal.status = ProposalStatus::Accepted;
            proposal.updated_at = now;
        }
        if let Some(offer) = tables.offers.get_mut(&offer_id) {
            offer.status = OfferStatus::Accepted;
            offer.updated_at = now;
        }
        let created = tables.insert_reservation(Some(offer_id), reservation, now);
        Ok(Settlement::Settled(created))
    }

    async fn settle_proposal(&self, reservation: &NewReservation) -> Result<Settlement, DbError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        match tables.proposals.get_mut(&reservation.proposal_id) {
            Some(proposal) if proposal.status.is_open() => {
                proposal.status = ProposalStatus::Accepted;
                proposal.updated_at = now;
            }
            _ => return Ok(Settlement::ProposalClosed),
        }
        let created = tables.insert_reservation(None, reservation, now);
        Ok(Settlement::Settled(created))
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, DbError> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.reservations.values().cloned(),
            |r| (r.created_at, r.id),
        ))
    }

    async fn find_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError> {
        Ok(self.tables.read().await.reservations.get(&id).cloned())
    }

    async fn update_reservation(
        &self,
        id: DbId,
        changes: &UpdateReservation,
    ) -> Result<Option<Reservation>, DbError> {
        let mut tables = self.tables.write().await;
        Ok(tables.reservations.get_mut(&id).map(|reservation| {
            changes.apply_to(reservation);
            reservation.updated_at = Utc::now();
            reservation.clone()
        }))
    }

    async fn delete_reservation(&self, id: DbId) -> Result<Option<Reservation>, DbError> {
        Ok(self.tables.write().await.reservations.remove(&id))
    }

    async fn create_notification(
        &self,
        input: &NewNotification,
    ) -> Result<Notification, DbError> {
        let mut tables = self.tables.write().await;
        tables.require_user(input.user_id)?;
        let id = tables.next_id();
        let notification = Notification {
            id,
            user_id: input.user_id,
            title: input.title.clone(),
            message: input.message.clone(),
            kind: input.kind,
            is_read: false,
            related_entity_id: input.related_entity_id,
            created_at: Utc::now(),
        };
        tables.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, DbError> {
        let tables = self.tables.read().await;
        let rows = newest_first(
            tables
                .notifications
                .values()
                .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
                .cloned(),
            |n| (n.created_at, n.id),
        );
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn unread_count(&self, user_id: DbId) -> Result<i64, DbError> {
        let tables = self.tables.read().await;
        let count = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();
        Ok(count as i64)
    }

    async fn mark_notification_read(&self, id: DbId, user_id: DbId) -> Result<bool, DbError> {
        let mut tables = self.tables.write().await;
        match tables.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: DbId) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        let mut count = 0;
        for n in tables.notifications.values_mut() {
            if n.user_id == user_id && !n.is_read {
                n.is_read = true;
                count += 1;
            }
        }
        Ok(count)
    }
}
