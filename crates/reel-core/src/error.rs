//! Error types for `reel-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("movie not found: {0}")]
  MovieNotFound(Uuid),

  #[error("user {user_id} has already rated movie {movie_id}")]
  DuplicateRating { movie_id: Uuid, user_id: Uuid },

  #[error("validation failed: {0}")]
  Validation(#[from] ValidationErrors),

  /// The stored row changed since it was read. Re-read and retry.
  #[error("movie {0} was modified concurrently")]
  ConcurrencyConflict(Uuid),
}

impl Error {
  /// Whether repeating the operation after a fresh read may succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::ConcurrencyConflict(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
