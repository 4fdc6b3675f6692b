//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order is chronological order and
//! `ORDER BY created_at` needs no conversion. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use reel_core::{
  movie::{Movie, MovieRecord},
  rating::{Rating, RatingRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawMovie::from_row`]; callers append the rest of
/// the statement.
pub const MOVIE_COLUMNS: &str = "SELECT m.movie_id, m.title, m.release_year, \
   m.genre, m.director, m.is_deleted, m.created_at, m.updated_at, m.version \
   FROM movies m";

/// Raw values of a `movies` row.
#[derive(Debug, Clone)]
pub struct RawMovie {
  pub movie_id:     String,
  pub title:        String,
  pub release_year: i32,
  pub genre:        String,
  pub director:     String,
  pub is_deleted:   bool,
  pub created_at:   String,
  pub updated_at:   Option<String>,
  pub version:      i64,
}

impl RawMovie {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movie_id:     row.get(0)?,
      title:        row.get(1)?,
      release_year: row.get(2)?,
      genre:        row.get(3)?,
      director:     row.get(4)?,
      is_deleted:   row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
      version:      row.get(8)?,
    })
  }

  pub fn from_movie(movie: &Movie) -> Self {
    Self {
      movie_id:     encode_uuid(movie.movie_id()),
      title:        movie.title().to_owned(),
      release_year: movie.release_year(),
      genre:        movie.genre().to_owned(),
      director:     movie.director().to_owned(),
      is_deleted:   movie.is_deleted(),
      created_at:   encode_dt(movie.created_at()),
      updated_at:   movie.updated_at().map(encode_dt),
      version:      movie.version(),
    }
  }

  pub fn into_movie(self, ratings: Vec<RawRating>) -> Result<Movie> {
    let record = MovieRecord {
      movie_id:     decode_uuid(&self.movie_id)?,
      title:        self.title,
      release_year: self.release_year,
      genre:        self.genre,
      director:     self.director,
      is_deleted:   self.is_deleted,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   self.updated_at.as_deref().map(decode_dt).transpose()?,
      version:      self.version,
    };
    let ratings = ratings
      .into_iter()
      .map(RawRating::into_rating)
      .collect::<Result<Vec<_>>>()?;
    Ok(Movie::hydrate(record, ratings))
  }
}

/// Raw values of a `ratings` row.
#[derive(Debug, Clone)]
pub struct RawRating {
  pub rating_id:  String,
  pub movie_id:   String,
  pub user_id:    String,
  pub value:      i32,
  pub created_at: String,
}

impl RawRating {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rating_id:  row.get(0)?,
      movie_id:   row.get(1)?,
      user_id:    row.get(2)?,
      value:      row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn from_rating(rating: &Rating) -> Self {
    Self {
      rating_id:  encode_uuid(rating.rating_id()),
      movie_id:   encode_uuid(rating.movie_id()),
      user_id:    encode_uuid(rating.user_id()),
      value:      rating.value(),
      created_at: encode_dt(rating.created_at()),
    }
  }

  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating::hydrate(RatingRecord {
      rating_id:  decode_uuid(&self.rating_id)?,
      value:      self.value,
      movie_id:   decode_uuid(&self.movie_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
    }))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sortable() {
    let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let fractional = whole + chrono::Duration::microseconds(1);

    let a = encode_dt(whole);
    let b = encode_dt(fractional);
    assert_eq!(a, "2024-01-02T03:04:05.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), fractional);
  }

  #[test]
  fn bad_timestamp_is_a_decode_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::Decode(_))));
  }

  #[test]
  fn movie_row_roundtrip_keeps_version_and_ratings() {
    let mut movie = Movie::new("Heat", 1995, "Crime", "Michael Mann");
    let rating = Rating::new(4, movie.movie_id(), Uuid::new_v4()).unwrap();
    movie.add_rating(rating.clone()).unwrap();

    let raw = RawMovie::from_movie(&movie);
    let rebuilt = raw
      .into_movie(vec![RawRating::from_rating(&rating)])
      .unwrap();
    assert_eq!(rebuilt, movie);
  }
}
