/// All store primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A calendar day bounding a rental window (`YYYY-MM-DD` on the wire).
pub type RentalDate = chrono::NaiveDate;

/// Monetary amount in the marketplace currency (MAD).
pub type Amount = f64;
