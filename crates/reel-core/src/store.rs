//! Persistence traits: [`MovieStore`], [`UnitOfWork`] and [`Catalog`].
//!
//! A [`Catalog`] is the long-lived, shared handle (e.g. a database
//! connection). Each logical operation opens a session from it; the session
//! answers reads directly and stages writes until [`UnitOfWork::commit`].
//!
//! Backends must re-check the aggregate's rules at commit time. An in-memory
//! [`Movie::add_rating`](crate::movie::Movie::add_rating) check alone is not
//! enough when two sessions load the same movie concurrently, so commit
//! reports a stale read as [`Error::ConcurrencyConflict`] and a second rating
//! by the same author as [`Error::DuplicateRating`], never as data loss.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::{Error, filter::MovieFilter, movie::Movie};

// ─── Commit outcome ──────────────────────────────────────────────────────────

/// Why a unit of work failed to commit. Nothing staged is persisted.
#[derive(Debug, Error)]
pub enum CommitError<E> {
  /// A domain rule rejected the change set.
  #[error(transparent)]
  Rejected(Error),

  /// The backend itself failed.
  #[error("store error: {0}")]
  Store(#[source] E),
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Reads and staged writes over movie aggregates, scoped to one session.
///
/// Every read hides soft-deleted movies unless `include_deleted` is passed.
pub trait MovieStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load a movie with all of its ratings. Returns `None` if the id is
  /// unknown, or deleted and `include_deleted` is `false`.
  fn get_by_id(
    &self,
    id: Uuid,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  /// Filter, sort and paginate non-deleted movies. Rating sorts use the
  /// average over committed ratings at query time.
  fn find_all<'a>(
    &'a self,
    filter: &'a MovieFilter,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + 'a;

  /// Whether a non-deleted movie with this id exists.
  fn exists(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Stage a newly constructed movie for insertion.
  fn add(&mut self, movie: &Movie);

  /// Stage a loaded movie, including any ratings not yet persisted.
  fn update(&mut self, movie: &Movie);
}

/// The commit boundary of a session. Consumed by `commit`, so a session
/// commits at most once.
pub trait UnitOfWork: Send {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist every staged change atomically, or none of them.
  fn commit(
    self,
  ) -> impl Future<Output = Result<(), CommitError<Self::Error>>> + Send;
}

/// A shared backend handle that opens per-operation sessions.
pub trait Catalog: Clone + Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;
  type Session: MovieStore<Error = Self::Error>
    + UnitOfWork<Error = Self::Error>
    + 'static;

  fn session(&self) -> Self::Session;
}
