use chrono::NaiveDate;
use kree_core::error::CoreError;
use kree_core::negotiation::validate_rental_window;
use kree_core::roles::{Caller, Role};
use kree_core::status::{
    check_payment_transition, check_reservation_transition, PaymentStatus, ReservationStatus,
};
use kree_core::types::{Amount, DbId};
use kree_db::models::reservation::{Reservation, UpdateReservation};
use serde::Deserialize;

use super::service::NegotiationService;
use super::views::{Lookup, ReservationView};
use crate::error::AppResult;

/// Body of `PUT /reservations/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pickup_location: Option<String>,
    pub return_location: Option<String>,
    pub total_price: Option<Amount>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

impl NegotiationService {
    pub async fn list_reservations(&self) -> AppResult<Vec<ReservationView>> {
        let reservations = self.store.list_reservations().await?;
        Ok(Lookup::new(self.store.as_ref())
            .reservation_views(reservations)
            .await?)
    }

    pub async fn get_reservation(&self, id: DbId) -> AppResult<ReservationView> {
        let reservation = self.find_reservation(id).await?;
        Ok(Lookup::new(self.store.as_ref())
            .reservation_view(reservation)
            .await?)
    }

    /// Set the reservation status. Only the owning agency may do this.
    pub async fn update_reservation_status(
        &self,
        caller: Caller,
        id: DbId,
        status: &str,
    ) -> AppResult<Reservation> {
        self.update_reservation(
            caller,
            id,
            UpdateReservationRequest {
                status: Some(status.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Set the payment label. Only the owning agency may do this.
    pub async fn update_payment_status(
        &self,
        caller: Caller,
        id: DbId,
        payment_status: &str,
    ) -> AppResult<Reservation> {
        self.update_reservation(
            caller,
            id,
            UpdateReservationRequest {
                payment_status: Some(payment_status.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply a partial update. Only the owning agency may do this.
    pub async fn update_reservation(
        &self,
        caller: Caller,
        id: DbId,
        request: UpdateReservationRequest,
    ) -> AppResult<Reservation> {
        caller.require_agency()?;
        let current = self.find_reservation(id).await?;
        if current.agency_id != caller.user_id {
            return Err(
                CoreError::Forbidden("Reservation belongs to another agency".into()).into(),
            );
        }

        let changes = validate_changes(&current, request)?;
        let updated = self
            .store
            .update_reservation(id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found("Reservation", id))?;
        tracing::info!(
            reservation_id = id,
            status = %updated.status,
            payment_status = %updated.payment_status,
            "Reservation updated"
        );
        Ok(updated)
    }

    /// Delete a reservation. Agencies may delete any; clients only their own.
    pub async fn delete_reservation(&self, caller: Caller, id: DbId) -> AppResult<Reservation> {
        let current = self.find_reservation(id).await?;
        if caller.role == Role::Client && current.user_id != caller.user_id {
            return Err(
                CoreError::Forbidden("Reservation belongs to another client".into()).into(),
            );
        }

        let deleted = self
            .store
            .delete_reservation(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Reservation", id))?;
        if let Some(offer_id) = deleted.offer_id {
            self.deliveries.clear(offer_id).await;
        }
        tracing::info!(reservation_id = id, user_id = caller.user_id, "Reservation deleted");
        Ok(deleted)
    }

    async fn find_reservation(&self, id: DbId) -> AppResult<Reservation> {
        Ok(self
            .store
            .find_reservation(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Reservation", id))?)
    }
}

/// Parse and check a requested change against the current reservation.
fn validate_changes(
    current: &Reservation,
    request: UpdateReservationRequest,
) -> Result<UpdateReservation, CoreError> {
    let status = request
        .status
        .as_deref()
        .map(str::parse::<ReservationStatus>)
        .transpose()?;
    let payment_status = request
        .payment_status
        .as_deref()
        .map(str::parse::<PaymentStatus>)
        .transpose()?;

    if let Some(next) = status {
        check_reservation_transition(current.status, next)?;
    }
    if let Some(next) = payment_status {
        check_payment_transition(current.payment_status, next)?;
    }

    let start = request.start_date.unwrap_or(current.start_date);
    let end = request.end_date.unwrap_or(current.end_date);
    validate_rental_window(start, end).map_err(CoreError::Validation)?;

    if let Some(price) = request.total_price {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Validation(
                "totalPrice must be a non-negative number".into(),
            ));
        }
    }

    let pickup_location = non_empty(request.pickup_location, "pickupLocation")?;
    let return_location = non_empty(request.return_location, "returnLocation")?;

    Ok(UpdateReservation {
        start_date: request.start_date,
        end_date: request.end_date,
        pickup_location,
        return_location,
        total_price: request.total_price,
        status,
        payment_status,
    })
}

fn non_empty(value: Option<String>, field: &str) -> Result<Option<String>, CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(CoreError::Validation(format!("{field} must not be empty")))
        }
        Some(v) => Ok(Some(v)),
        None => Ok(None),
    }
}
