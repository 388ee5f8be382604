//! Repository for the `reservations` table.

use kree_core::types::DbId;
use sqlx::PgPool;

use crate::models::reservation::{NewReservation, Reservation, UpdateReservation};

const COLUMNS: &str = "id, user_id, car_id, agency_id, proposal_id, offer_id, start_date, \
    end_date, pickup_location, return_location, total_price, status, payment_status, \
    created_at, updated_at";

pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert the reservation produced by a settlement. Runs inside the
    /// settlement transaction so it commits together with the status CAS.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Option<DbId>,
        input: &NewReservation,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservations \
                (user_id, car_id, agency_id, proposal_id, offer_id, start_date, end_date, \
                 pickup_location, return_location, total_price, status, payment_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(input.user_id)
            .bind(input.car_id)
            .bind(input.agency_id)
            .bind(input.proposal_id)
            .bind(offer_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.pickup_location)
            .bind(&input.return_location)
            .bind(input.total_price)
            .bind(input.status.as_str())
            .bind(input.payment_status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Reservation>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update the present fields. Returns `None` if no row has `id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReservation,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET \
                start_date = COALESCE($2, start_date), \
                end_date = COALESCE($3, end_date), \
                pickup_location = COALESCE($4, pickup_location), \
                return_location = COALESCE($5, return_location), \
                total_price = COALESCE($6, total_price), \
                status = COALESCE($7, status), \
                payment_status = COALESCE($8, payment_status), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.pickup_location)
            .bind(&input.return_location)
            .bind(input.total_price)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.payment_status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete and return the removed row, if any.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("DELETE FROM reservations WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
