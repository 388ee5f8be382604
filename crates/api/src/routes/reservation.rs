use axum::routing::{get, put};
use axum::Router;

use crate::handlers::reservation;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// GET    /                -> list_reservations
/// GET    /{id}            -> get_reservation
/// PUT    /{id}            -> update_reservation
/// DELETE /{id}            -> delete_reservation
/// PUT    /{id}/status     -> update_status
/// PUT    /{id}/payment    -> update_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reservation::list_reservations))
        .route(
            "/{id}",
            get(reservation::get_reservation)
                .put(reservation::update_reservation)
                .delete(reservation::delete_reservation),
        )
        .route("/{id}/status", put(reservation::update_status))
        .route("/{id}/payment", put(reservation::update_payment))
}
