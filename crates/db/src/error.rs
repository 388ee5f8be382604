use kree_core::types::DbId;

/// Failure inside a [`MarketStore`](crate::store::MarketStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A write referenced a row that does not exist.
    #[error("Referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: DbId },
}
