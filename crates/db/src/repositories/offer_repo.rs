//! Repository for the `offers` table.

use kree_core::types::DbId;
use sqlx::PgPool;

use crate::models::offer::{NewOffer, Offer};

const COLUMNS: &str =
    "id, agency_id, car_id, proposal_id, price, message, status, created_at, updated_at";

/// Column list qualified with the `o` alias, for joins.
const O_COLUMNS: &str = "o.id, o.agency_id, o.car_id, o.proposal_id, o.price, o.message, \
    o.status, o.created_at, o.updated_at";

pub struct OfferRepo;

impl OfferRepo {
    /// Insert a `pending` offer only while its proposal is still `pending`.
    ///
    /// Returns `None` when the proposal is missing or already settled.
    pub async fn create_if_open(
        pool: &PgPool,
        input: &NewOffer,
    ) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!(
            "INSERT INTO offers (agency_id, car_id, proposal_id, price, message) \
             SELECT $1, $2, p.id, $4, $5 FROM price_proposals p \
             WHERE p.id = $3 AND p.status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(input.agency_id)
            .bind(input.car_id)
            .bind(input.proposal_id)
            .bind(input.price)
            .bind(&input.message)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offers WHERE id = $1");
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Offers made by an agency, newest first.
    pub async fn list_by_agency(pool: &PgPool, agency_id: DbId) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM offers \
             WHERE agency_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }

    /// Offers made on any of a client's proposals, newest first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!(
            "SELECT {O_COLUMNS} FROM offers o \
             JOIN price_proposals p ON p.id = o.proposal_id \
             WHERE p.user_id = $1 \
             ORDER BY o.created_at DESC, o.id DESC"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Compare-and-set `pending -> rejected`. `None` if the offer was not pending.
    pub async fn reject_if_pending(pool: &PgPool, id: DbId) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!(
            "UPDATE offers SET status = 'rejected', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set `pending -> accepted` inside a settlement transaction.
    pub async fn accept_if_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET status = 'accepted', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
