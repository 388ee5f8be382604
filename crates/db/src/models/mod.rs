//! Row types and DTOs, one module per table.
//!
//! Every row type serializes camelCase to match the mobile client.

pub mod car;
pub mod notification;
pub mod offer;
pub mod price_proposal;
pub mod reservation;
pub mod user;
