//! [`SqliteStore`] and [`SqliteSession`], the SQLite implementations of
//! [`Catalog`], [`MovieStore`] and [`UnitOfWork`].

use std::{collections::HashMap, path::Path};

use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use reel_core::{
  filter::{MovieFilter, SortBy},
  movie::Movie,
  store::{Catalog, CommitError, MovieStore, UnitOfWork},
};

use crate::{
  Error, Result,
  encode::{MOVIE_COLUMNS, RawMovie, RawRating, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A movie catalogue backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Start a session. Nothing it stages is written until it commits.
  pub fn begin(&self) -> SqliteSession {
    SqliteSession { conn: self.conn.clone(), staged: Vec::new() }
  }
}

impl Catalog for SqliteStore {
  type Error = Error;
  type Session = SqliteSession;

  fn session(&self) -> SqliteSession { self.begin() }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One logical operation's view of the store: reads go straight to the
/// database, writes are staged until [`UnitOfWork::commit`].
pub struct SqliteSession {
  conn:   tokio_rusqlite::Connection,
  staged: Vec<Staged>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageKind {
  Insert,
  Update,
}

/// A movie captured at staging time, already encoded for SQLite.
struct Staged {
  kind:     StageKind,
  movie_id: Uuid,
  row:      RawMovie,
  ratings:  Vec<(Uuid, RawRating)>,
}

impl Staged {
  fn capture(kind: StageKind, movie: &Movie) -> Self {
    Self {
      kind,
      movie_id: movie.movie_id(),
      row: RawMovie::from_movie(movie),
      ratings: movie
        .ratings()
        .iter()
        .map(|r| (r.user_id(), RawRating::from_rating(r)))
        .collect(),
    }
  }
}

/// What the commit transaction concluded. Rejections roll back.
enum Outcome {
  Committed,
  Conflict(Uuid),
  DuplicateRating { movie_id: Uuid, user_id: Uuid },
}

impl SqliteSession {
  /// Stage `movie`, replacing an earlier capture of the same movie so the
  /// latest state wins and the version is checked only once.
  fn stage(&mut self, kind: StageKind, movie: &Movie) {
    if let Some(existing) =
      self.staged.iter_mut().find(|s| s.movie_id == movie.movie_id())
    {
      let kind = existing.kind;
      *existing = Staged::capture(kind, movie);
      return;
    }
    self.staged.push(Staged::capture(kind, movie));
  }
}

// ─── MovieStore impl ─────────────────────────────────────────────────────────

impl MovieStore for SqliteSession {
  type Error = Error;

  async fn get_by_id(&self, id: Uuid, include_deleted: bool) -> Result<Option<Movie>> {
    let id_str = encode_uuid(id);

    let raw: Option<(RawMovie, Vec<RawRating>)> = self
      .conn
      .call(move |conn| {
        let movie = conn
          .query_row(
            &format!(
              "{MOVIE_COLUMNS} WHERE m.movie_id = ?1 AND (?2 OR m.is_deleted = 0)"
            ),
            rusqlite::params![id_str, include_deleted],
            RawMovie::from_row,
          )
          .optional()?;

        let Some(movie) = movie else {
          return Ok(None);
        };
        let mut ratings = select_ratings(conn, std::slice::from_ref(&movie.movie_id))?;
        let ratings = ratings.remove(&movie.movie_id).unwrap_or_default();
        Ok(Some((movie, ratings)))
      })
      .await?;

    raw.map(|(movie, ratings)| movie.into_movie(ratings)).transpose()
  }

  async fn find_all(&self, filter: &MovieFilter) -> Result<Vec<Movie>> {
    let (sql, args) = build_find_all(filter);

    let (rows, mut ratings) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawMovie::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let ids: Vec<String> = rows.iter().map(|m| m.movie_id.clone()).collect();
        let ratings = select_ratings(conn, &ids)?;
        Ok((rows, ratings))
      })
      .await?;

    rows
      .into_iter()
      .map(|row| {
        let own = ratings.remove(&row.movie_id).unwrap_or_default();
        row.into_movie(own)
      })
      .collect()
  }

  async fn exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM movies WHERE movie_id = ?1 AND is_deleted = 0)",
          rusqlite::params![id_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;

    Ok(exists)
  }

  fn add(&mut self, movie: &Movie) { self.stage(StageKind::Insert, movie); }

  fn update(&mut self, movie: &Movie) { self.stage(StageKind::Update, movie); }
}

// ─── UnitOfWork impl ─────────────────────────────────────────────────────────

impl UnitOfWork for SqliteSession {
  type Error = Error;

  async fn commit(self) -> Result<(), CommitError<Error>> {
    if self.staged.is_empty() {
      return Ok(());
    }

    let changes = self.staged.len();
    let staged = self.staged;

    let outcome = self
      .conn
      .call(move |conn| Ok(apply(conn, &staged)?))
      .await
      .map_err(|e| CommitError::Store(Error::Database(e)))?;

    match outcome {
      Outcome::Committed => {
        tracing::debug!(changes, "committed unit of work");
        Ok(())
      }
      Outcome::Conflict(movie_id) => {
        tracing::debug!(%movie_id, "stale version, rolled back");
        Err(CommitError::Rejected(reel_core::Error::ConcurrencyConflict(movie_id)))
      }
      Outcome::DuplicateRating { movie_id, user_id } => {
        tracing::debug!(%movie_id, %user_id, "duplicate rating, rolled back");
        Err(CommitError::Rejected(reel_core::Error::DuplicateRating {
          movie_id,
          user_id,
        }))
      }
    }
  }
}

/// Write every staged movie inside one transaction. Returning before
/// `commit` drops the transaction, which rolls it back.
fn apply(conn: &mut rusqlite::Connection, staged: &[Staged]) -> rusqlite::Result<Outcome> {
  let tx = conn.transaction()?;

  for change in staged {
    let row = &change.row;
    match change.kind {
      StageKind::Insert => {
        tx.execute(
          "INSERT INTO movies (
             movie_id, title, release_year, genre, director,
             is_deleted, created_at, updated_at, version
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.movie_id,
            row.title,
            row.release_year,
            row.genre,
            row.director,
            row.is_deleted,
            row.created_at,
            row.updated_at,
            row.version,
          ],
        )?;
      }
      StageKind::Update => {
        // The row must still carry the version this session read.
        let touched = tx.execute(
          "UPDATE movies
              SET is_deleted = ?1, updated_at = ?2, version = version + 1
            WHERE movie_id = ?3 AND version = ?4",
          rusqlite::params![row.is_deleted, row.updated_at, row.movie_id, row.version],
        )?;
        if touched == 0 {
          return Ok(Outcome::Conflict(change.movie_id));
        }
      }
    }

    for (user_id, rating) in &change.ratings {
      // Ratings already stored share their rating_id and are skipped; a new
      // row for an author who already rated trips UNIQUE (movie_id, user_id).
      let inserted = tx.execute(
        "INSERT INTO ratings (rating_id, movie_id, user_id, value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (rating_id) DO NOTHING",
        rusqlite::params![
          rating.rating_id,
          rating.movie_id,
          rating.user_id,
          rating.value,
          rating.created_at,
        ],
      );
      match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
          return Ok(Outcome::DuplicateRating {
            movie_id: change.movie_id,
            user_id:  *user_id,
          });
        }
        Err(e) => return Err(e),
      }
    }
  }

  tx.commit()?;
  Ok(Outcome::Committed)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Query helpers ───────────────────────────────────────────────────────────

/// Build the listing query and its positional arguments.
fn build_find_all(filter: &MovieFilter) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec!["m.is_deleted = 0"];
  let mut args: Vec<Value> = Vec::new();

  if let Some(term) = filter.title_search() {
    // lower() folds ASCII only, matching SQLite's own LIKE semantics.
    conds.push("instr(lower(m.title), lower(?)) > 0");
    args.push(Value::Text(term.to_owned()));
  }
  if let Some(genre) = filter.genre() {
    conds.push("m.genre = ?");
    args.push(Value::Text(genre.to_owned()));
  }
  if let Some(year) = filter.year {
    conds.push("m.release_year = ?");
    args.push(Value::Integer(i64::from(year)));
  }

  let key = match filter.sort_by {
    SortBy::Title => "m.title COLLATE NOCASE",
    SortBy::Year => "m.release_year",
    SortBy::Rating => {
      "(SELECT COALESCE(AVG(r.value), 0.0) FROM ratings r WHERE r.movie_id = m.movie_id)"
    }
    SortBy::Created => "m.created_at",
  };
  let direction = if filter.descending() { "DESC" } else { "ASC" };

  args.push(Value::Integer(i64::from(filter.page_size())));
  args.push(Value::Integer(i64::try_from(filter.offset()).unwrap_or(i64::MAX)));

  let sql = format!(
    "{MOVIE_COLUMNS}
     WHERE {}
     ORDER BY {key} {direction}, m.movie_id ASC
     LIMIT ? OFFSET ?",
    conds.join(" AND "),
  );
  (sql, args)
}

/// Load the ratings of `movie_ids`, grouped by movie, each group in
/// insertion order.
fn select_ratings(
  conn: &rusqlite::Connection,
  movie_ids: &[String],
) -> rusqlite::Result<HashMap<String, Vec<RawRating>>> {
  let mut grouped: HashMap<String, Vec<RawRating>> = HashMap::new();
  if movie_ids.is_empty() {
    return Ok(grouped);
  }

  let placeholders = vec!["?"; movie_ids.len()].join(", ");
  let sql = format!(
    "SELECT rating_id, movie_id, user_id, value, created_at
       FROM ratings
      WHERE movie_id IN ({placeholders})
      ORDER BY seq"
  );

  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt.query_map(rusqlite::params_from_iter(movie_ids), RawRating::from_row)?;
  for row in rows {
    let row = row?;
    grouped.entry(row.movie_id.clone()).or_default().push(row);
  }
  Ok(grouped)
}
