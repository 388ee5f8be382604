//! Handlers for the `/proposals` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kree_core::types::DbId;
use kree_db::models::price_proposal::{CreatePriceProposal, PriceProposal};
use kree_db::models::reservation::Reservation;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::rbac::{RequireAgency, RequireClient};
use crate::negotiation::views::ProposalView;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/proposals
pub async fn submit_proposal(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePriceProposal>,
) -> AppResult<(StatusCode, Json<DataResponse<PriceProposal>>)> {
    let proposal = state
        .negotiation
        .submit_proposal(user.caller(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/v1/proposals/mine
pub async fn list_mine(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProposalView>>>> {
    let proposals = state.negotiation.proposals_for_client(user.caller()).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/for-my-cars
pub async fn list_for_my_cars(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProposalView>>>> {
    let proposals = state.negotiation.proposals_for_agency(user.caller()).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// PUT /api/v1/proposals/{id}/accept
///
/// Accept the proposal at its maximum price and create the reservation.
pub async fn accept_proposal(
    RequireAgency(user): RequireAgency,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Reservation>>)> {
    let reservation = state.negotiation.accept_proposal(user.caller(), id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}
