//! [`MovieService`]: the create, read, rate and delete workflows.
//!
//! Each workflow opens one session from the [`Catalog`], validates before
//! anything is staged, and commits exactly once. Rating submissions that lose
//! an optimistic-concurrency race are re-read and retried a bounded number of
//! times; every other failure is returned to the caller as-is.

use chrono::{Datelike as _, Utc};
use reel_core::{
  filter::MovieFilter,
  movie::MovieView,
  rating::Rating,
  store::{Catalog, CommitError, MovieStore, UnitOfWork},
  validation::NewMovie,
};
use thiserror::Error;
use uuid::Uuid;

/// How many times a rating submission is attempted before a concurrency
/// conflict is reported.
pub const DEFAULT_RATING_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ServiceError<E> {
  /// A domain outcome: not found, rejected, invalid, or conflicting.
  #[error(transparent)]
  Domain(#[from] reel_core::Error),

  #[error("store error: {0}")]
  Store(#[source] E),
}

impl<E> From<CommitError<E>> for ServiceError<E> {
  fn from(err: CommitError<E>) -> Self {
    match err {
      CommitError::Rejected(e) => Self::Domain(e),
      CommitError::Store(e) => Self::Store(e),
    }
  }
}

pub type ServiceResult<T, C> = Result<T, ServiceError<<C as Catalog>::Error>>;

pub struct MovieService<C> {
  catalog:         C,
  rating_attempts: u32,
}

impl<C: Catalog> MovieService<C> {
  pub fn new(catalog: C) -> Self {
    Self { catalog, rating_attempts: DEFAULT_RATING_ATTEMPTS }
  }

  /// Override the rating attempt budget; values below 1 mean 1.
  pub fn with_rating_attempts(mut self, attempts: u32) -> Self {
    self.rating_attempts = attempts.max(1);
    self
  }

  pub async fn create(&self, input: NewMovie) -> ServiceResult<MovieView, C> {
    let movie = input
      .into_movie(Utc::now().year())
      .map_err(reel_core::Error::from)?;

    let mut session = self.catalog.session();
    session.add(&movie);
    session.commit().await?;

    tracing::info!(movie_id = %movie.movie_id(), title = movie.title(), "movie created");
    Ok(MovieView::from(&movie))
  }

  pub async fn get(&self, id: Uuid) -> ServiceResult<MovieView, C> {
    let movie = self
      .catalog
      .session()
      .get_by_id(id, false)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(reel_core::Error::MovieNotFound(id))?;
    Ok(MovieView::from(&movie))
  }

  pub async fn list(&self, filter: &MovieFilter) -> ServiceResult<Vec<MovieView>, C> {
    let movies = self
      .catalog
      .session()
      .find_all(filter)
      .await
      .map_err(ServiceError::Store)?;
    Ok(movies.iter().map(MovieView::from).collect())
  }

  /// Record `author`'s rating of movie `id`.
  pub async fn rate(&self, id: Uuid, value: i32, author: Uuid) -> ServiceResult<MovieView, C> {
    let mut attempt = 1;
    loop {
      match self.try_rate(id, value, author).await {
        Err(ServiceError::Domain(e)) if e.is_retryable() && attempt < self.rating_attempts => {
          tracing::warn!(movie_id = %id, attempt, "rating lost a concurrent update, retrying");
          attempt += 1;
        }
        outcome => return outcome,
      }
    }
  }

  async fn try_rate(&self, id: Uuid, value: i32, author: Uuid) -> ServiceResult<MovieView, C> {
    let rating = Rating::new(value, id, author)?;

    let mut session = self.catalog.session();
    let mut movie = session
      .get_by_id(id, false)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(reel_core::Error::MovieNotFound(id))?;

    movie.add_rating(rating)?;
    session.update(&movie);
    session.commit().await?;

    tracing::info!(movie_id = %id, user_id = %author, value, "movie rated");
    Ok(MovieView::from(&movie))
  }

  /// Soft-delete movie `id`. Deleted movies read as not found, so a second
  /// delete reports [`reel_core::Error::MovieNotFound`].
  pub async fn delete(&self, id: Uuid) -> ServiceResult<(), C> {
    let mut session = self.catalog.session();
    let mut movie = session
      .get_by_id(id, false)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(reel_core::Error::MovieNotFound(id))?;

    movie.soft_delete();
    session.update(&movie);
    session.commit().await?;

    tracing::info!(movie_id = %id, "movie deleted");
    Ok(())
  }
}
