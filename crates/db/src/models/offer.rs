//! Agency offer models and DTOs.

use kree_core::status::OfferStatus;
use kree_core::types::{Amount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `offers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: DbId,
    pub agency_id: DbId,
    pub car_id: DbId,
    pub proposal_id: DbId,
    pub price: Amount,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: OfferStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for submitting an offer.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOffer {
    pub car_id: DbId,
    pub proposal_id: DbId,
    pub price: Amount,
    #[serde(default)]
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

/// Fully resolved insert for `offers`.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub agency_id: DbId,
    pub car_id: DbId,
    pub proposal_id: DbId,
    pub price: Amount,
    pub message: String,
}

impl CreateOffer {
    pub fn into_new(self, agency_id: DbId) -> NewOffer {
        NewOffer {
            agency_id,
            car_id: self.car_id,
            proposal_id: self.proposal_id,
            price: self.price,
            message: self.message,
        }
    }
}
