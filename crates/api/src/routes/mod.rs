pub mod health;
pub mod notification;
pub mod offer;
pub mod proposal;
pub mod reservation;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                   WebSocket (token via header or ?token=)
///
/// /proposals                            submit (POST, client)
/// /proposals/mine                       own proposals (GET, client)
/// /proposals/for-my-cars                proposals on caller's cars (GET, agency)
/// /proposals/{id}/accept                direct accept (PUT, agency)
///
/// /offers                               submit (POST, agency)
/// /offers/mine                          own offers (GET, agency)
/// /offers/for-client                    offers on caller's proposals (GET, client)
/// /offers/answer                        accept or reject (PUT, client)
///
/// /reservations                         list (GET)
/// /reservations/{id}                    get, update (PUT, agency), delete
/// /reservations/{id}/status             update status (PUT, agency)
/// /reservations/{id}/payment            update payment status (PUT, agency)
///
/// /notifications                        list (?unread_only, limit, offset)
/// /notifications/read-all               mark all read (POST)
/// /notifications/unread-count           unread count (GET)
/// /notifications/{id}/read              mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_handler))
        // Negotiation
        .nest("/proposals", proposal::router())
        .nest("/offers", offer::router())
        .nest("/reservations", reservation::router())
        // Inbox
        .nest("/notifications", notification::router())
}
