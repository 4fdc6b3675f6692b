//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use reel_core::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// The request breaks a domain rule and will fail again if repeated.
  #[error("rejected: {0}")]
  Rejected(String),

  /// A concurrent write won; the caller may retry.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, json!({ "error": m })),
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "validation failed", "fields": errors }),
      ),
      ApiError::Rejected(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, json!({ "error": m, "retryable": true }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}

impl From<reel_core::Error> for ApiError {
  fn from(err: reel_core::Error) -> Self {
    use reel_core::Error;
    match err {
      Error::MovieNotFound(_) => ApiError::NotFound(err.to_string()),
      Error::DuplicateRating { .. } => ApiError::Rejected(err.to_string()),
      Error::Validation(errors) => ApiError::Validation(errors),
      Error::ConcurrencyConflict(_) => ApiError::Conflict(err.to_string()),
    }
  }
}

impl<E> From<ServiceError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(err: ServiceError<E>) -> Self {
    match err {
      ServiceError::Domain(e) => e.into(),
      ServiceError::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}
