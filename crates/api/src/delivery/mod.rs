//! Post-reservation delivery follow-up between agency and client.

mod coordinator;
mod tracker;

pub use coordinator::DeliveryCoordinator;
pub use tracker::{DeliveryTracker, Transition};
