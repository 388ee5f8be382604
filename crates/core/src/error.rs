use crate::types::DbId;

/// Domain error taxonomy shared by every layer of the marketplace.
///
/// The API layer maps each variant to an HTTP status; the WebSocket layer
/// reports the same variants back to the originating connection.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing or invalid caller identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller role or ownership does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Missing required field or invalid enumerated value.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The entity is no longer in the state the operation requires, e.g. a
    /// proposal that another request already settled.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable machine-readable code, shared by HTTP and WebSocket error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
