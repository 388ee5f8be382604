use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::offer;
use crate::state::AppState;

/// Routes mounted at `/offers`.
///
/// ```text
/// POST   /                -> submit_offer
/// GET    /mine            -> list_mine
/// GET    /for-client      -> list_for_client
/// PUT    /answer          -> answer_offer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(offer::submit_offer))
        .route("/mine", get(offer::list_mine))
        .route("/for-client", get(offer::list_for_client))
        .route("/answer", put(offer::answer_offer))
}
