//! Price proposal ("name your price") models and DTOs.

use kree_core::status::ProposalStatus;
use kree_core::types::{Amount, DbId, RentalDate, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `price_proposals` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProposal {
    pub id: DbId,
    /// The proposing client.
    pub user_id: DbId,
    /// Reference car the client saw, if any.
    pub car_id: Option<DbId>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub gearbox: Option<String>,
    pub fuel_type: Option<String>,
    pub seats: Option<i32>,
    pub features: Vec<String>,
    pub price_min: Amount,
    pub price_max: Amount,
    pub start_date: RentalDate,
    pub end_date: RentalDate,
    pub pickup_location: String,
    pub return_location: String,
    pub identity_document_url: Option<String>,
    pub portrait_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProposalStatus,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for submitting a proposal.
///
/// Field-level checks run through `validator`; the cross-field price and
/// date checks live in `kree_core::negotiation`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceProposal {
    pub car_id: Option<DbId>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub gearbox: Option<String>,
    pub fuel_type: Option<String>,
    #[validate(range(min = 1, max = 60, message = "seats must be between 1 and 60"))]
    pub seats: Option<i32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[validate(range(min = 0.0, message = "priceMin must not be negative"))]
    pub price_min: Amount,
    #[validate(range(min = 0.0, message = "priceMax must not be negative"))]
    pub price_max: Amount,
    pub start_date: RentalDate,
    pub end_date: RentalDate,
    #[serde(default)]
    #[validate(length(min = 1, message = "pickupLocation is required"))]
    pub pickup_location: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "returnLocation is required"))]
    pub return_location: String,
    pub identity_document_url: Option<String>,
    pub portrait_url: Option<String>,
}

/// Fully resolved insert for `price_proposals`.
#[derive(Debug, Clone)]
pub struct NewPriceProposal {
    pub user_id: DbId,
    pub car_id: Option<DbId>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub gearbox: Option<String>,
    pub fuel_type: Option<String>,
    pub seats: Option<i32>,
    pub features: Vec<String>,
    pub price_min: Amount,
    pub price_max: Amount,
    pub start_date: RentalDate,
    pub end_date: RentalDate,
    pub pickup_location: String,
    pub return_location: String,
    pub identity_document_url: Option<String>,
    pub portrait_url: Option<String>,
    pub expires_at: Timestamp,
}

impl CreatePriceProposal {
    /// Attach the submitting client and computed expiry.
    pub fn into_new(self, user_id: DbId, expires_at: Timestamp) -> NewPriceProposal {
        NewPriceProposal {
            user_id,
            car_id: self.car_id,
            model: self.model,
            color: self.color,
            gearbox: self.gearbox,
            fuel_type: self.fuel_type,
            seats: self.seats,
            features: self.features,
            price_min: self.price_min,
            price_max: self.price_max,
            start_date: self.start_date,
            end_date: self.end_date,
            pickup_location: self.pickup_location,
            return_location: self.return_location,
            identity_document_url: self.identity_document_url,
            portrait_url: self.portrait_url,
            expires_at,
        }
    }
}
