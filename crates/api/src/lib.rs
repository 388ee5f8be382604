//! Kree marketplace API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! negotiation workflow, WebSocket infrastructure) so integration tests and
//! the binary entrypoint can both access them.

pub mod auth;
pub mod config;
pub mod delivery;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod negotiation;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
