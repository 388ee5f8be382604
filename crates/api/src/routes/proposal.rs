use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::proposal;
use crate::state::AppState;

/// Routes mounted at `/proposals`.
///
/// ```text
/// POST   /                -> submit_proposal
/// GET    /mine            -> list_mine
/// GET    /for-my-cars     -> list_for_my_cars
/// PUT    /{id}/accept     -> accept_proposal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(proposal::submit_proposal))
        .route("/mine", get(proposal::list_mine))
        .route("/for-my-cars", get(proposal::list_for_my_cars))
        .route("/{id}/accept", put(proposal::accept_proposal))
}
