//! Handlers for the `/offers` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kree_db::models::offer::{CreateOffer, Offer};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::{RequireAgency, RequireClient};
use crate::negotiation::views::OfferView;
use crate::negotiation::{AnswerOfferRequest, OfferAnswerOutcome};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/offers
pub async fn submit_offer(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateOffer>,
) -> AppResult<(StatusCode, Json<DataResponse<Offer>>)> {
    let offer = state.negotiation.submit_offer(user.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: offer })))
}

/// GET /api/v1/offers/mine
pub async fn list_mine(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<OfferView>>>> {
    let offers = state.negotiation.offers_for_agency(user.caller()).await?;
    Ok(Json(DataResponse { data: offers }))
}

/// GET /api/v1/offers/for-client
pub async fn list_for_client(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<OfferView>>>> {
    let offers = state.negotiation.offers_for_client(user.caller()).await?;
    Ok(Json(DataResponse { data: offers }))
}

/// PUT /api/v1/offers/answer
///
/// Body: `{ "offerId": 1, "status": "accepted" | "rejected" }`.
pub async fn answer_offer(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppJson(request): AppJson<AnswerOfferRequest>,
) -> AppResult<Json<DataResponse<OfferAnswerOutcome>>> {
    let outcome = state.negotiation.answer_offer(user.caller(), request).await?;
    Ok(Json(DataResponse { data: outcome }))
}
