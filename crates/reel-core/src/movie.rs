//! The movie aggregate root, owning a movie's attributes and its ratings.
//!
//! All mutation goes through [`Movie::add_rating`] and [`Movie::soft_delete`],
//! which take `&mut self`; exclusive access makes each check-then-append
//! atomic for a given instance. Across processes the storage backend guards
//! the same rules (see [`crate::store`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  rating::Rating,
  validation::{FieldError, ValidationErrors},
};

// ─── Aggregate ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
  movie_id:     Uuid,
  title:        String,
  release_year: i32,
  genre:        String,
  director:     String,
  is_deleted:   bool,
  created_at:   DateTime<Utc>,
  updated_at:   Option<DateTime<Utc>>,
  /// Insertion-ordered; at most one entry per author.
  ratings:      Vec<Rating>,
  /// Row token for optimistic concurrency; 0 until first persisted.
  version:      i64,
}

/// The persisted columns of a movie, used to rebuild one from storage.
#[derive(Debug, Clone)]
pub struct MovieRecord {
  pub movie_id:     Uuid,
  pub title:        String,
  pub release_year: i32,
  pub genre:        String,
  pub director:     String,
  pub is_deleted:   bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   Option<DateTime<Utc>>,
  pub version:      i64,
}

impl Movie {
  /// Create a movie with a fresh id and no ratings.
  ///
  /// Performs no validation; run
  /// [`NewMovie::validate`](crate::validation::NewMovie::validate) first.
  pub fn new(
    title: impl Into<String>,
    release_year: i32,
    genre: impl Into<String>,
    director: impl Into<String>,
  ) -> Self {
    Self {
      movie_id: Uuid::new_v4(),
      title: title.into(),
      release_year,
      genre: genre.into(),
      director: director.into(),
      is_deleted: false,
      created_at: crate::now(),
      updated_at: None,
      ratings: Vec::new(),
      version: 0,
    }
  }

  /// Rebuild a persisted movie. `ratings` must already be in insertion order.
  pub fn hydrate(record: MovieRecord, ratings: Vec<Rating>) -> Self {
    Self {
      movie_id:     record.movie_id,
      title:        record.title,
      release_year: record.release_year,
      genre:        record.genre,
      director:     record.director,
      is_deleted:   record.is_deleted,
      created_at:   record.created_at,
      updated_at:   record.updated_at,
      ratings,
      version:      record.version,
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Append `rating`, rejecting a second rating from the same author.
  ///
  /// On failure the rating collection and `updated_at` are left untouched.
  pub fn add_rating(&mut self, rating: Rating) -> Result<()> {
    if rating.movie_id() != self.movie_id {
      return Err(Error::Validation(ValidationErrors::from(vec![
        FieldError::new("movieId", "rating belongs to a different movie"),
      ])));
    }
    if self.has_rating_from(rating.user_id()) {
      return Err(Error::DuplicateRating {
        movie_id: self.movie_id,
        user_id:  rating.user_id(),
      });
    }

    self.ratings.push(rating);
    self.touch();
    Ok(())
  }

  /// Mark the movie deleted. Only the first call stamps `updated_at`;
  /// repeated calls leave the movie unchanged.
  pub fn soft_delete(&mut self) {
    if self.is_deleted {
      return;
    }
    self.is_deleted = true;
    self.touch();
  }

  fn touch(&mut self) { self.updated_at = Some(crate::now()); }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Arithmetic mean of all rating values; `0.0` when there are none.
  pub fn average_rating(&self) -> f64 {
    if self.ratings.is_empty() {
      return 0.0;
    }
    let sum: i64 = self.ratings.iter().map(|r| i64::from(r.value())).sum();
    sum as f64 / self.ratings.len() as f64
  }

  pub fn rating_count(&self) -> usize { self.ratings.len() }

  pub fn has_rating_from(&self, user_id: Uuid) -> bool {
    self.ratings.iter().any(|r| r.user_id() == user_id)
  }

  pub fn movie_id(&self) -> Uuid { self.movie_id }

  pub fn title(&self) -> &str { &self.title }

  pub fn release_year(&self) -> i32 { self.release_year }

  pub fn genre(&self) -> &str { &self.genre }

  pub fn director(&self) -> &str { &self.director }

  pub fn is_deleted(&self) -> bool { self.is_deleted }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

  pub fn updated_at(&self) -> Option<DateTime<Utc>> { self.updated_at }

  pub fn ratings(&self) -> &[Rating] { &self.ratings }

  pub fn version(&self) -> i64 { self.version }
}

// ─── External view ───────────────────────────────────────────────────────────

/// The read model handed to callers. Computed from the aggregate, never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
  pub id:             Uuid,
  pub title:          String,
  pub release_year:   i32,
  pub genre:          String,
  pub director:       String,
  pub average_rating: f64,
  pub total_ratings:  usize,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     Option<DateTime<Utc>>,
}

impl From<&Movie> for MovieView {
  fn from(movie: &Movie) -> Self {
    Self {
      id:             movie.movie_id,
      title:          movie.title.clone(),
      release_year:   movie.release_year,
      genre:          movie.genre.clone(),
      director:       movie.director.clone(),
      average_rating: movie.average_rating(),
      total_ratings:  movie.rating_count(),
      created_at:     movie.created_at,
      updated_at:     movie.updated_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn movie() -> Movie { Movie::new("Action Movie", 2024, "Action", "John Doe") }

  fn rate(movie: &mut Movie, value: i32, user_id: Uuid) -> Result<()> {
    let rating = Rating::new(value, movie.movie_id(), user_id)?;
    movie.add_rating(rating)
  }

  #[test]
  fn new_movie_defaults() {
    let m = movie();
    assert!(!m.is_deleted());
    assert!(m.updated_at().is_none());
    assert_eq!(m.rating_count(), 0);
    assert_eq!(m.version(), 0);
  }

  #[test]
  fn constructor_does_not_validate() {
    let m = Movie::new("", -5, "", "");
    assert_eq!(m.title(), "");
    assert_eq!(m.release_year(), -5);
  }

  #[test]
  fn average_of_no_ratings_is_zero() {
    assert_eq!(movie().average_rating(), 0.0);
  }

  #[test]
  fn single_rating_average_is_its_value() {
    for value in 1..=5 {
      let mut m = movie();
      rate(&mut m, value, Uuid::new_v4()).unwrap();
      assert_eq!(m.average_rating(), f64::from(value));
    }
  }

  #[test]
  fn average_is_arithmetic_mean() {
    let mut m = movie();
    for value in [5, 4, 4, 1] {
      rate(&mut m, value, Uuid::new_v4()).unwrap();
    }
    assert_eq!(m.rating_count(), 4);
    assert_eq!(m.average_rating(), 3.5);
  }

  #[test]
  fn add_rating_stamps_updated_at() {
    let mut m = movie();
    rate(&mut m, 3, Uuid::new_v4()).unwrap();
    let updated = m.updated_at().expect("updated_at set");
    assert!(updated >= m.created_at());
  }

  #[test]
  fn duplicate_author_is_rejected_and_state_unchanged() {
    let mut m = movie();
    let user = Uuid::new_v4();
    rate(&mut m, 5, user).unwrap();
    let updated_at = m.updated_at();

    let err = rate(&mut m, 3, user).unwrap_err();
    assert!(matches!(
      err,
      Error::DuplicateRating { movie_id, user_id }
        if movie_id == m.movie_id() && user_id == user
    ));
    assert_eq!(m.rating_count(), 1);
    assert_eq!(m.average_rating(), 5.0);
    assert_eq!(m.updated_at(), updated_at);
  }

  #[test]
  fn ratings_keep_insertion_order() {
    let mut m = movie();
    let users: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    for (value, user) in [2, 5, 1].into_iter().zip(&users) {
      rate(&mut m, value, *user).unwrap();
    }
    let authors: Vec<Uuid> = m.ratings().iter().map(Rating::user_id).collect();
    assert_eq!(authors, users);
  }

  #[test]
  fn rating_for_another_movie_is_rejected() {
    let mut m = movie();
    let stray = Rating::new(4, Uuid::new_v4(), Uuid::new_v4()).unwrap();
    assert!(matches!(m.add_rating(stray), Err(Error::Validation(_))));
    assert_eq!(m.rating_count(), 0);
  }

  #[test]
  fn soft_delete_is_idempotent() {
    let mut m = movie();
    m.soft_delete();
    assert!(m.is_deleted());
    let first = m.updated_at();
    assert!(first.is_some());

    m.soft_delete();
    assert!(m.is_deleted());
    assert_eq!(m.updated_at(), first);
  }

  #[test]
  fn view_projects_computed_fields() {
    let mut m = movie();
    rate(&mut m, 5, Uuid::new_v4()).unwrap();
    rate(&mut m, 2, Uuid::new_v4()).unwrap();

    let view = MovieView::from(&m);
    assert_eq!(view.id, m.movie_id());
    assert_eq!(view.average_rating, 3.5);
    assert_eq!(view.total_ratings, 2);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["releaseYear"], 2024);
    assert_eq!(json["totalRatings"], 2);
    assert!(json.get("averageRating").is_some());
  }
}
