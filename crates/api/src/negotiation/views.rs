//! Populated read models returned by the REST surface and socket pushes.
//!
//! Each view flattens the stored row and adds the related users and cars,
//! mirroring what the mobile client renders.

use std::collections::HashMap;

use kree_core::types::DbId;
use kree_db::models::car::Car;
use kree_db::models::offer::Offer;
use kree_db::models::price_proposal::PriceProposal;
use kree_db::models::reservation::Reservation;
use kree_db::models::user::UserSummary;
use kree_db::store::MarketStore;
use kree_db::DbError;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarView {
    #[serde(flatten)]
    pub car: Car,
    pub agency: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: PriceProposal,
    /// The client who submitted the proposal.
    pub user: Option<UserSummary>,
    /// Reference car with its owning agency.
    pub car: Option<CarView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferView {
    #[serde(flatten)]
    pub offer: Offer,
    pub agency: Option<UserSummary>,
    pub car: Option<Car>,
    pub proposal: Option<PriceProposal>,
    pub client: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub client: Option<UserSummary>,
    pub agency: Option<UserSummary>,
    pub car: Option<Car>,
}

/// Memoizing loader for related records while building a batch of views.
pub struct Lookup<'a> {
    store: &'a dyn MarketStore,
    users: HashMap<DbId, Option<UserSummary>>,
    cars: HashMap<DbId, Option<Car>>,
    proposals: HashMap<DbId, Option<PriceProposal>>,
}

impl<'a> Lookup<'a> {
    pub fn new(store: &'a dyn MarketStore) -> Self {
        Self {
            store,
            users: HashMap::new(),
            cars: HashMap::new(),
            proposals: HashMap::new(),
        }
    }

    pub async fn user(&mut self, id: DbId) -> Result<Option<UserSummary>, DbError> {
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let user = self.store.find_user(id).await?.as_ref().map(UserSummary::from);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub async fn car(&mut self, id: DbId) -> Result<Option<Car>, DbError> {
        if let Some(cached) = self.cars.get(&id) {
            return Ok(cached.clone());
        }
        let car = self.store.find_car(id).await?;
        self.cars.insert(id, car.clone());
        Ok(car)
    }

    pub async fn proposal(&mut self, id: DbId) -> Result<Option<PriceProposal>, DbError> {
        if let Some(cached) = self.proposals.get(&id) {
            return Ok(cached.clone());
        }
        let proposal = self.store.find_proposal(id).await?;
        self.proposals.insert(id, proposal.clone());
        Ok(proposal)
    }

    async fn car_view(&mut self, id: DbId) -> Result<Option<CarView>, DbError> {
        let Some(car) = self.car(id).await? else {
            return Ok(None);
        };
        let agency = self.user(car.agency_id).await?;
        Ok(Some(CarView { car, agency }))
    }

    pub async fn proposal_view(&mut self, proposal: PriceProposal) -> Result<ProposalView, DbError> {
        let user = self.user(proposal.user_id).await?;
        let car = match proposal.car_id {
            Some(car_id) => self.car_view(car_id).await?,
            None => None,
        };
        Ok(ProposalView {
            proposal,
            user,
            car,
        })
    }

    pub async fn offer_view(&mut self, offer: Offer) -> Result<OfferView, DbError> {
        let agency = self.user(offer.agency_id).await?;
        let car = self.car(offer.car_id).await?;
        let proposal = self.proposal(offer.proposal_id).await?;
        let client = match &proposal {
            Some(p) => self.user(p.user_id).await?,
            None => None,
        };
        Ok(OfferView {
            offer,
            agency,
            car,
            proposal,
            client,
        })
    }

    pub async fn reservation_view(
        &mut self,
        reservation: Reservation,
    ) -> Result<ReservationView, DbError> {
        let client = self.user(reservation.user_id).await?;
        let agency = self.user(reservation.agency_id).await?;
        let car = self.car(reservation.car_id).await?;
        Ok(ReservationView {
            reservation,
            client,
            agency,
            car,
        })
    }

    pub async fn proposal_views(
        &mut self,
        proposals: Vec<PriceProposal>,
    ) -> Result<Vec<ProposalView>, DbError> {
        let mut views = Vec::with_capacity(proposals.len());
        for p in proposals {
            views.push(self.proposal_view(p).await?);
        }
        Ok(views)
    }

    pub async fn offer_views(&mut self, offers: Vec<Offer>) -> Result<Vec<OfferView>, DbError> {
        let mut views = Vec::with_capacity(offers.len());
        for o in offers {
            views.push(self.offer_view(o).await?);
        }
        Ok(views)
    }

    pub async fn reservation_views(
        &mut self,
        reservations: Vec<Reservation>,
    ) -> Result<Vec<ReservationView>, DbError> {
        let mut views = Vec::with_capacity(reservations.len());
        for r in reservations {
            views.push(self.reservation_view(r).await?);
        }
        Ok(views)
    }
}
