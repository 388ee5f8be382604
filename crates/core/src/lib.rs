//! Domain vocabulary for the Kree marketplace.
//!
//! Everything in this crate is storage- and transport-agnostic: status
//! enumerations, the caller identity, negotiation guards, the delivery
//! follow-up state machine and notification wording.

pub mod delivery;
pub mod error;
pub mod negotiation;
pub mod notification;
pub mod roles;
pub mod status;
pub mod types;
