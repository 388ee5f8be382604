//! Handlers for the `/reservations` resource.
//!
//! Reads are open to any authenticated user; writes require the agency that
//! owns the reservation, except delete which the booking client may also do.

use axum::extract::{Path, State};
use axum::Json;
use kree_core::types::DbId;
use kree_db::models::reservation::Reservation;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAgency;
use crate::negotiation::views::ReservationView;
use crate::negotiation::UpdateReservationRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of the status endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    #[serde(default)]
    pub status: String,
}

/// Body of the payment endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    #[serde(default)]
    pub payment_status: String,
}

/// GET /api/v1/reservations
pub async fn list_reservations(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ReservationView>>>> {
    let reservations = state.negotiation.list_reservations().await?;
    Ok(Json(DataResponse { data: reservations }))
}

/// GET /api/v1/reservations/{id}
pub async fn get_reservation(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReservationView>>> {
    let reservation = state.negotiation.get_reservation(id).await?;
    Ok(Json(DataResponse { data: reservation }))
}

/// PUT /api/v1/reservations/{id}
pub async fn update_reservation(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(request): AppJson<UpdateReservationRequest>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    let reservation = state
        .negotiation
        .update_reservation(user.caller(), id, request)
        .await?;
    Ok(Json(DataResponse { data: reservation }))
}

/// PUT /api/v1/reservations/{id}/status
pub async fn update_status(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(body): AppJson<StatusBody>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    let reservation = state
        .negotiation
        .update_reservation_status(user.caller(), id, &body.status)
        .await?;
    Ok(Json(DataResponse { data: reservation }))
}

/// PUT /api/v1/reservations/{id}/payment
pub async fn update_payment(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(body): AppJson<PaymentBody>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    let reservation = state
        .negotiation
        .update_payment_status(user.caller(), id, &body.payment_status)
        .await?;
    Ok(Json(DataResponse { data: reservation }))
}

/// DELETE /api/v1/reservations/{id}
///
/// Returns the deleted reservation.
pub async fn delete_reservation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    let reservation = state
        .negotiation
        .delete_reservation(user.caller(), id)
        .await?;
    Ok(Json(DataResponse { data: reservation }))
}
