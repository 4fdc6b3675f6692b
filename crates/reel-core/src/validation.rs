//! Field-level validation, run before an aggregate is constructed.
//!
//! [`Movie::new`](crate::movie::Movie::new) accepts whatever it is given, so
//! every caller path goes through [`NewMovie::validate`] first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::movie::Movie;

pub const TITLE_MAX_CHARS: usize = 200;
pub const GENRE_MAX_CHARS: usize = 50;
pub const DIRECTOR_MAX_CHARS: usize = 100;
/// Year of the earliest surviving motion picture.
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;
/// How far past the current year an announced release may be dated.
pub const MAX_YEARS_AHEAD: i32 = 5;

// ─── Error set ───────────────────────────────────────────────────────────────

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

/// Every field that failed validation, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn errors(&self) -> &[FieldError] { &self.0 }

  /// Names of the rejected fields.
  pub fn fields(&self) -> Vec<&'static str> {
    self.0.iter().map(|e| e.field).collect()
  }
}

impl From<Vec<FieldError>> for ValidationErrors {
  fn from(errors: Vec<FieldError>) -> Self { Self(errors) }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let joined = self
      .0
      .iter()
      .map(FieldError::to_string)
      .collect::<Vec<_>>()
      .join("; ");
    f.write_str(&joined)
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Movie input ─────────────────────────────────────────────────────────────

/// Caller-supplied attributes of a movie that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
  pub title:        String,
  pub release_year: i32,
  pub genre:        String,
  pub director:     String,
}

impl NewMovie {
  /// Check every field, collecting all failures rather than the first.
  ///
  /// `current_year` bounds the release year; it is a parameter so the check
  /// stays a pure function of its inputs.
  pub fn validate(&self, current_year: i32) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    check_text(&mut errors, "title", &self.title, TITLE_MAX_CHARS);

    let latest = current_year + MAX_YEARS_AHEAD;
    if !(EARLIEST_RELEASE_YEAR..=latest).contains(&self.release_year) {
      errors.push(FieldError::new(
        "releaseYear",
        format!("release year must be between {EARLIEST_RELEASE_YEAR} and {latest}"),
      ));
    }

    check_text(&mut errors, "genre", &self.genre, GENRE_MAX_CHARS);
    check_text(&mut errors, "director", &self.director, DIRECTOR_MAX_CHARS);

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ValidationErrors(errors))
    }
  }

  /// Validate, then build the aggregate.
  pub fn into_movie(self, current_year: i32) -> Result<Movie, ValidationErrors> {
    self.validate(current_year)?;
    Ok(Movie::new(self.title, self.release_year, self.genre, self.director))
  }
}

fn check_text(
  errors: &mut Vec<FieldError>,
  field: &'static str,
  value: &str,
  max_chars: usize,
) {
  if value.trim().is_empty() {
    errors.push(FieldError::new(field, format!("{field} must not be empty")));
  } else if value.chars().count() > max_chars {
    errors.push(FieldError::new(
      field,
      format!("{field} must be at most {max_chars} characters"),
    ));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> NewMovie {
    NewMovie {
      title:        "Action Movie".into(),
      release_year: 2024,
      genre:        "Action".into(),
      director:     "John Doe".into(),
    }
  }

  #[test]
  fn valid_input_passes() {
    assert!(input().validate(2024).is_ok());
  }

  #[test]
  fn blank_strings_are_rejected() {
    let movie = NewMovie {
      title:    "   ".into(),
      genre:    String::new(),
      director: "\t".into(),
      ..input()
    };
    let errors = movie.validate(2024).unwrap_err();
    assert_eq!(errors.fields(), vec!["title", "genre", "director"]);
  }

  #[test]
  fn length_limits_count_characters() {
    let mut movie = input();
    movie.title = "é".repeat(TITLE_MAX_CHARS);
    assert!(movie.validate(2024).is_ok());

    movie.title.push('é');
    let errors = movie.validate(2024).unwrap_err();
    assert_eq!(errors.fields(), vec!["title"]);
  }

  #[test]
  fn genre_and_director_limits() {
    let movie = NewMovie {
      genre: "g".repeat(GENRE_MAX_CHARS + 1),
      director: "d".repeat(DIRECTOR_MAX_CHARS + 1),
      ..input()
    };
    let errors = movie.validate(2024).unwrap_err();
    assert_eq!(errors.fields(), vec!["genre", "director"]);
  }

  #[test]
  fn release_year_bounds() {
    let mut movie = input();
    movie.release_year = EARLIEST_RELEASE_YEAR;
    assert!(movie.validate(2024).is_ok());
    movie.release_year = 2024 + MAX_YEARS_AHEAD;
    assert!(movie.validate(2024).is_ok());

    for year in [EARLIEST_RELEASE_YEAR - 1, 2024 + MAX_YEARS_AHEAD + 1] {
      movie.release_year = year;
      let errors = movie.validate(2024).unwrap_err();
      assert_eq!(errors.fields(), vec!["releaseYear"]);
    }
  }

  #[test]
  fn into_movie_refuses_invalid_input() {
    let movie = NewMovie { title: String::new(), ..input() };
    assert!(movie.into_movie(2024).is_err());

    let movie = input().into_movie(2024).unwrap();
    assert_eq!(movie.title(), "Action Movie");
  }

  #[test]
  fn errors_display_every_field() {
    let movie = NewMovie { title: String::new(), genre: String::new(), ..input() };
    let message = movie.validate(2024).unwrap_err().to_string();
    assert!(message.contains("title"), "{message}");
    assert!(message.contains("genre"), "{message}");
  }
}
