//! A single user's score for a movie.
//!
//! Ratings are immutable once created. A user never edits a rating; the
//! owning [`Movie`](crate::movie::Movie) rejects a second one instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  validation::{FieldError, ValidationErrors},
};

/// Lowest accepted rating value.
pub const MIN_RATING: i32 = 1;
/// Highest accepted rating value.
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
  rating_id:  Uuid,
  value:      i32,
  movie_id:   Uuid,
  user_id:    Uuid,
  created_at: DateTime<Utc>,
}

/// The persisted columns of a rating, used to rebuild one from storage.
#[derive(Debug, Clone)]
pub struct RatingRecord {
  pub rating_id:  Uuid,
  pub value:      i32,
  pub movie_id:   Uuid,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
}

impl Rating {
  /// Create a new rating, stamping a fresh id and the current time.
  ///
  /// Fails with [`Error::Validation`] if `value` is outside
  /// `MIN_RATING..=MAX_RATING` or if either id is nil.
  pub fn new(value: i32, movie_id: Uuid, user_id: Uuid) -> Result<Self> {
    let mut errors = Vec::new();
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
      errors.push(FieldError::new(
        "rating",
        format!("rating must be between {MIN_RATING} and {MAX_RATING}"),
      ));
    }
    if movie_id.is_nil() {
      errors.push(FieldError::new("movieId", "movie id must not be empty"));
    }
    if user_id.is_nil() {
      errors.push(FieldError::new("userId", "user id must not be empty"));
    }
    if !errors.is_empty() {
      return Err(Error::Validation(ValidationErrors::from(errors)));
    }

    Ok(Self {
      rating_id: Uuid::new_v4(),
      value,
      movie_id,
      user_id,
      created_at: crate::now(),
    })
  }

  /// Rebuild a rating read back from storage.
  pub fn hydrate(record: RatingRecord) -> Self {
    Self {
      rating_id:  record.rating_id,
      value:      record.value,
      movie_id:   record.movie_id,
      user_id:    record.user_id,
      created_at: record.created_at,
    }
  }

  pub fn rating_id(&self) -> Uuid { self.rating_id }

  pub fn value(&self) -> i32 { self.value }

  pub fn movie_id(&self) -> Uuid { self.movie_id }

  /// The author of the rating.
  pub fn user_id(&self) -> Uuid { self.user_id }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_every_value_in_range() {
    for value in MIN_RATING..=MAX_RATING {
      let rating = Rating::new(value, Uuid::new_v4(), Uuid::new_v4()).unwrap();
      assert_eq!(rating.value(), value);
    }
  }

  #[test]
  fn rejects_out_of_range_values() {
    for value in [i32::MIN, -1, 0, 6, 100] {
      let err = Rating::new(value, Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
      match err {
        Error::Validation(errors) => assert_eq!(errors.fields(), vec!["rating"]),
        other => panic!("expected validation error, got {other:?}"),
      }
    }
  }

  #[test]
  fn rejects_nil_identifiers() {
    let err = Rating::new(3, Uuid::nil(), Uuid::nil()).unwrap_err();
    match err {
      Error::Validation(errors) => {
        assert_eq!(errors.fields(), vec!["movieId", "userId"]);
      }
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn hydrate_keeps_stored_identity() {
    let record = RatingRecord {
      rating_id:  Uuid::new_v4(),
      value:      4,
      movie_id:   Uuid::new_v4(),
      user_id:    Uuid::new_v4(),
      created_at: crate::now(),
    };
    let rating = Rating::hydrate(record.clone());
    assert_eq!(rating.rating_id(), record.rating_id);
    assert_eq!(rating.created_at(), record.created_at);
  }
}
