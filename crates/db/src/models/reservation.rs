//! Reservation models and DTOs.

use kree_core::status::{PaymentStatus, ReservationStatus};
use kree_core::types::{Amount, DbId, RentalDate, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reservations` table.
///
/// `offer_id` is absent when the agency accepted the proposal directly.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: DbId,
    pub user_id: DbId,
    pub car_id: DbId,
    pub agency_id: DbId,
    pub proposal_id: DbId,
    pub offer_id: Option<DbId>,
    pub start_date: RentalDate,
    pub end_date: RentalDate,
    pub pickup_location: String,
    pub return_location: String,
    pub total_price: Amount,
    #[sqlx(try_from = "String")]
    pub status: ReservationStatus,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Reservation snapshot written by a settlement.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: DbId,
    pub car_id: DbId,
    pub agency_id: DbId,
    pub proposal_id: DbId,
    pub start_date: RentalDate,
    pub end_date: RentalDate,
    pub pickup_location: String,
    pub return_location: String,
    pub total_price: Amount,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
}

/// Partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateReservation {
    pub start_date: Option<RentalDate>,
    pub end_date: Option<RentalDate>,
    pub pickup_location: Option<String>,
    pub return_location: Option<String>,
    pub total_price: Option<Amount>,
    pub status: Option<ReservationStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateReservation {
    /// Apply the present fields onto `reservation` in place.
    pub fn apply_to(&self, reservation: &mut Reservation) {
        if let Some(v) = self.start_date {
            reservation.start_date = v;
        }
        if let Some(v) = self.end_date {
            reservation.end_date = v;
        }
        if let Some(v) = &self.pickup_location {
            reservation.pickup_location = v.clone();
        }
        if let Some(v) = &self.return_location {
            reservation.return_location = v.clone();
        }
        if let Some(v) = self.total_price {
            reservation.total_price = v;
        }
        if let Some(v) = self.status {
            reservation.status = v;
        }
        if let Some(v) = self.payment_status {
            reservation.payment_status = v;
        }
    }
}
