//! Repository for the `price_proposals` table.

use kree_core::status::ProposalStatus;
use kree_core::types::DbId;
use sqlx::PgPool;

use crate::models::price_proposal::{NewPriceProposal, PriceProposal};

const COLUMNS: &str = "id, user_id, car_id, model, color, gearbox, fuel_type, seats, features, \
    price_min, price_max, start_date, end_date, pickup_location, return_location, \
    identity_document_url, portrait_url, status, expires_at, created_at, updated_at";

pub struct PriceProposalRepo;

impl PriceProposalRepo {
    /// Insert a new proposal in `pending` status.
    pub async fn create(
        pool: &PgPool,
        input: &NewPriceProposal,
    ) -> Result<PriceProposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO price_proposals \
                (user_id, car_id, model, color, gearbox, fuel_type, seats, features, \
                 price_min, price_max, start_date, end_date, pickup_location, return_location, \
                 identity_document_url, portrait_url, status, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PriceProposal>(&query)
            .bind(input.user_id)
            .bind(input.car_id)
            .bind(&input.model)
            .bind(&input.color)
            .bind(&input.gearbox)
            .bind(&input.fuel_type)
            .bind(input.seats)
            .bind(&input.features)
            .bind(input.price_min)
            .bind(input.price_max)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.pickup_location)
            .bind(&input.return_location)
            .bind(&input.identity_document_url)
            .bind(&input.portrait_url)
            .bind(ProposalStatus::Pending.as_str())
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PriceProposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM price_proposals WHERE id = $1");
        sqlx::query_as::<_, PriceProposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Proposals submitted by a client, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PriceProposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM price_proposals \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PriceProposal>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Proposals whose reference car is one of `car_ids`, newest first.
    pub async fn list_by_cars(
        pool: &PgPool,
        car_ids: &[DbId],
    ) -> Result<Vec<PriceProposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM price_proposals \
             WHERE car_id = ANY($1) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PriceProposal>(&query)
            .bind(car_ids)
            .fetch_all(pool)
            .await
    }

    /// Compare-and-set `pending -> accepted` inside a settlement transaction.
    ///
    /// Returns `false` when the proposal was no longer pending.
    pub async fn accept_if_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE price_proposals \
             SET status = 'accepted', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
