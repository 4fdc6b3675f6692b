//! Author extractor.
//!
//! Authentication happens in front of this service: the gateway verifies the
//! caller and forwards their id in the `x-user-id` header. Handlers that
//! record something on a user's behalf take an [`Author`] and never read the
//! id from the request body.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Author(pub Uuid);

impl<S> FromRequestParts<S> for Author
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

    let id = Uuid::parse_str(raw.trim())
      .map_err(|_| ApiError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;
    if id.is_nil() {
      return Err(ApiError::Unauthorized(format!("empty {USER_ID_HEADER} header")));
    }
    Ok(Author(id))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::Request;

  use super::*;

  async fn extract(req: Request<axum::body::Body>) -> Result<Author, ApiError> {
    let (mut parts, _) = req.into_parts();
    Author::from_request_parts(&mut parts, &()).await
  }

  #[tokio::test]
  async fn valid_header() {
    let id = Uuid::new_v4();
    let req = Request::builder()
      .header(USER_ID_HEADER, id.to_string())
      .body(axum::body::Body::empty()).unwrap();
    assert_eq!(extract(req).await.unwrap(), Author(id));
  }

  #[tokio::test]
  async fn missing_header() {
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
  }

  #[tokio::test]
  async fn malformed_header() {
    let req = Request::builder()
      .header(USER_ID_HEADER, "not-a-uuid")
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
  }

  #[tokio::test]
  async fn nil_id_is_rejected() {
    let req = Request::builder()
      .header(USER_ID_HEADER, Uuid::nil().to_string())
      .body(axum::body::Body::empty()).unwrap();
    assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
  }
}
