//! Guards and input checks for the proposal → offer → reservation workflow.
//!
//! These are pure functions over already-loaded values. The API layer loads
//! entities from the store, runs the guards in order, and only then mutates.

use chrono::Duration;

use crate::error::CoreError;
use crate::status::{OfferStatus, ProposalStatus};
use crate::types::{Amount, DbId, RentalDate, Timestamp};

/// Default lifetime of a price proposal, in seconds.
pub const DEFAULT_PROPOSAL_TTL_SECS: i64 = 300;

/// Longest accepted proposal lifetime (30 days).
pub const MAX_PROPOSAL_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Proposal lifetime and whether it gates offers and acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub ttl: Duration,
    pub enforce: bool,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_PROPOSAL_TTL_SECS),
            enforce: true,
        }
    }
}

impl ExpiryPolicy {
    /// `ttl_secs` is clamped to `0..=MAX_PROPOSAL_TTL_SECS`.
    pub fn new(ttl_secs: i64, enforce: bool) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.clamp(0, MAX_PROPOSAL_TTL_SECS)),
            enforce,
        }
    }

    /// Expiry instant for a proposal created at `created_at`.
    ///
    /// Saturates at the latest representable instant.
    pub fn expires_at(&self, created_at: Timestamp) -> Timestamp {
        created_at
            .checked_add_signed(self.ttl)
            .unwrap_or(Timestamp::MAX_UTC)
    }

    /// `Conflict` when enforcement is on and `now` is past `expires_at`.
    pub fn check(&self, expires_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
        if self.enforce && now > expires_at {
            return Err(CoreError::Conflict("Price proposal has expired".into()));
        }
        Ok(())
    }
}

pub fn ensure_proposal_open(status: ProposalStatus) -> Result<(), CoreError> {
    if status.is_open() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Price proposal is already {status}"
        )))
    }
}

pub fn ensure_offer_pending(status: OfferStatus) -> Result<(), CoreError> {
    if status.is_pending() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!("Offer is already {status}")))
    }
}

/// The car must belong to the acting agency.
pub fn ensure_car_owner(car_agency_id: DbId, caller_id: DbId) -> Result<(), CoreError> {
    if car_agency_id == caller_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You can only act on cars that belong to your agency".into(),
        ))
    }
}

/// The proposal must have been submitted by the acting client.
pub fn ensure_proposal_owner(proposal_user_id: DbId, caller_id: DbId) -> Result<(), CoreError> {
    if proposal_user_id == caller_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "This offer was not made on one of your price proposals".into(),
        ))
    }
}

pub fn validate_price_range(min: Amount, max: Amount) -> Result<(), String> {
    if !min.is_finite() || !max.is_finite() {
        return Err("priceMin and priceMax must be numbers".into());
    }
    if min < 0.0 || max < 0.0 {
        return Err("priceMin and priceMax must not be negative".into());
    }
    if min > max {
        return Err("priceMin must not exceed priceMax".into());
    }
    Ok(())
}

pub fn validate_rental_window(start: RentalDate, end: RentalDate) -> Result<(), String> {
    if start > end {
        return Err("startDate must not be after endDate".into());
    }
    Ok(())
}

pub fn validate_offer_price(price: Amount) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("price must be greater than zero".into());
    }
    Ok(())
}
