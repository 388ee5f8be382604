//! The proposal / offer / reservation workflow.
//!
//! [`NegotiationService`] owns every state transition. HTTP handlers only
//! extract the [`Caller`](kree_core::roles::Caller) and request body and
//! delegate here.

mod reservations;
mod service;
pub mod views;

pub use reservations::UpdateReservationRequest;
pub use service::{AnswerOfferRequest, NegotiationService, OfferAnswerOutcome};
