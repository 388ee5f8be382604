//! Car entity models and DTOs.

use kree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cars` table. `agency_id` is the owning agency's user id.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: DbId,
    pub agency_id: DbId,
    pub model: String,
    pub brand: String,
    pub color: String,
    pub fuel_type: String,
    pub gearbox: String,
    pub seats: i32,
    pub km: i64,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a car.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCar {
    pub agency_id: DbId,
    pub model: String,
    pub brand: String,
    pub color: String,
    pub fuel_type: String,
    pub gearbox: String,
    pub seats: i32,
    pub km: i64,
    pub image_url: Option<String>,
}
