//! Request body extraction that reports failures through [`AppError`].

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejection renders as an [`AppError`].
///
/// A body that parses but does not fit the target type (missing or ill-typed
/// field) becomes a `VALIDATION_ERROR`; malformed JSON or a wrong content
/// type becomes a `BAD_REQUEST`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
