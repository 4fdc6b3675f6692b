//! Query parameters for [`MovieStore::find_all`](crate::store::MovieStore::find_all).
//!
//! Fields are public and may hold anything a caller passes in; the accessor
//! methods apply the paging coercions and blank-string handling, so backends
//! should read through them rather than the raw fields.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Primary sort key. Every key is followed by the movie id ascending, which
/// keeps pages disjoint when keys tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
  /// Case-insensitive title order.
  Title,
  Year,
  /// Average of the committed ratings; unrated movies count as 0.
  Rating,
  /// Creation time. Used when no recognised key is given; newest first
  /// regardless of [`MovieFilter::sort_descending`].
  #[default]
  Created,
}

impl SortBy {
  /// Parse a caller-supplied key case-insensitively. Unknown or missing keys
  /// fall back to [`SortBy::Created`].
  pub fn parse(key: Option<&str>) -> Self {
    match key.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
      Some("title") => Self::Title,
      Some("year") => Self::Year,
      Some("rating") => Self::Rating,
      _ => Self::Created,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFilter {
  /// Case-insensitive substring match on the title.
  pub title_search:    Option<String>,
  /// Exact match on the genre.
  pub genre:           Option<String>,
  /// Exact match on the release year.
  pub year:            Option<i32>,
  pub sort_by:         SortBy,
  pub sort_descending: bool,
  /// 1-based; values below 1 read as [`DEFAULT_PAGE`].
  pub page:            i64,
  /// Values below 1 read as [`DEFAULT_PAGE_SIZE`].
  pub page_size:       i64,
}

impl Default for MovieFilter {
  fn default() -> Self {
    Self {
      title_search:    None,
      genre:           None,
      year:            None,
      sort_by:         SortBy::default(),
      sort_descending: false,
      page:            i64::from(DEFAULT_PAGE),
      page_size:       i64::from(DEFAULT_PAGE_SIZE),
    }
  }
}

impl MovieFilter {
  pub fn title_search(&self) -> Option<&str> { non_blank(self.title_search.as_deref()) }

  pub fn genre(&self) -> Option<&str> { non_blank(self.genre.as_deref()) }

  pub fn page(&self) -> u32 {
    if self.page < 1 {
      DEFAULT_PAGE
    } else {
      u32::try_from(self.page).unwrap_or(u32::MAX)
    }
  }

  pub fn page_size(&self) -> u32 {
    if self.page_size < 1 {
      DEFAULT_PAGE_SIZE
    } else {
      u32::try_from(self.page_size).unwrap_or(u32::MAX)
    }
  }

  /// Number of matching rows preceding the requested page.
  pub fn offset(&self) -> u64 {
    u64::from(self.page() - 1) * u64::from(self.page_size())
  }

  /// Whether the primary key sorts descending. The default key always does.
  pub fn descending(&self) -> bool {
    match self.sort_by {
      SortBy::Created => true,
      _ => self.sort_descending,
    }
  }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_key_parsing() {
    assert_eq!(SortBy::parse(Some("title")), SortBy::Title);
    assert_eq!(SortBy::parse(Some("YEAR")), SortBy::Year);
    assert_eq!(SortBy::parse(Some(" Rating ")), SortBy::Rating);
    assert_eq!(SortBy::parse(Some("director")), SortBy::Created);
    assert_eq!(SortBy::parse(None), SortBy::Created);
  }

  #[test]
  fn paging_defaults() {
    let f = MovieFilter::default();
    assert_eq!(f.page(), 1);
    assert_eq!(f.page_size(), 10);
    assert_eq!(f.offset(), 0);
  }

  #[test]
  fn paging_coercion() {
    let f = MovieFilter { page: 0, page_size: -3, ..Default::default() };
    assert_eq!(f.page(), 1);
    assert_eq!(f.page_size(), 10);

    let f = MovieFilter { page: -7, page_size: 0, ..Default::default() };
    assert_eq!(f.page(), 1);
    assert_eq!(f.page_size(), 10);

    let f = MovieFilter { page: 3, page_size: 25, ..Default::default() };
    assert_eq!(f.offset(), 50);
  }

  #[test]
  fn blank_terms_are_ignored() {
    let f = MovieFilter {
      title_search: Some("  ".into()),
      genre: Some(String::new()),
      ..Default::default()
    };
    assert_eq!(f.title_search(), None);
    assert_eq!(f.genre(), None);

    let f = MovieFilter { title_search: Some("act".into()), ..Default::default() };
    assert_eq!(f.title_search(), Some("act"));
  }

  #[test]
  fn default_sort_is_newest_first() {
    let f = MovieFilter { sort_descending: false, ..Default::default() };
    assert!(f.descending());

    let f = MovieFilter { sort_by: SortBy::Year, ..Default::default() };
    assert!(!f.descending());
  }
}
