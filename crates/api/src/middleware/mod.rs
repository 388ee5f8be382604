//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireClient`] -- Requires the `client` role.
//! - [`rbac::RequireAgency`] -- Requires the `agency` role.

pub mod auth;
pub mod rbac;
