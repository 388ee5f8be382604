//! Repository for the `cars` table.

use kree_core::types::DbId;
use sqlx::PgPool;

use crate::models::car::{Car, CreateCar};

const COLUMNS: &str =
    "id, agency_id, model, brand, color, fuel_type, gearbox, seats, km, image_url, created_at";

pub struct CarRepo;

impl CarRepo {
    pub async fn create(pool: &PgPool, input: &CreateCar) -> Result<Car, sqlx::Error> {
        let query = format!(
            "INSERT INTO cars \
                (agency_id, model, brand, color, fuel_type, gearbox, seats, km, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Car>(&query)
            .bind(input.agency_id)
            .bind(&input.model)
            .bind(&input.brand)
            .bind(&input.color)
            .bind(&input.fuel_type)
            .bind(&input.gearbox)
            .bind(input.seats)
            .bind(input.km)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Car>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cars WHERE id = $1");
        sqlx::query_as::<_, Car>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of every car owned by `agency_id`.
    pub async fn ids_for_agency(pool: &PgPool, agency_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM cars WHERE agency_id = $1 ORDER BY id")
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }
}
