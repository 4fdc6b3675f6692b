//! Handlers for `/movies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/movies` | Optional `titleSearch`, `genre`, `year`, `sortBy`, `sortDescending`, `page`, `pageSize` |
//! | `POST`   | `/movies` | Body: [`NewMovie`]; returns 201 + view |
//! | `GET`    | `/movies/{id}` | 404 if missing or deleted |
//! | `DELETE` | `/movies/{id}` | Soft delete; 204 |
//! | `POST`   | `/movies/{id}/ratings` | Body: `{"rating":4}`; author from [`Author`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use reel_core::{
  filter::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MovieFilter, SortBy},
  movie::MovieView,
  store::Catalog,
  validation::NewMovie,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Author, error::ApiError, service::MovieService};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub title_search:    Option<String>,
  pub genre:           Option<String>,
  pub year:            Option<i32>,
  /// `title`, `year` or `rating`; anything else sorts newest first.
  pub sort_by:         Option<String>,
  #[serde(default)]
  pub sort_descending: bool,
  pub page:            Option<i64>,
  pub page_size:       Option<i64>,
}

impl From<ListParams> for MovieFilter {
  fn from(params: ListParams) -> Self {
    MovieFilter {
      title_search:    params.title_search,
      genre:           params.genre,
      year:            params.year,
      sort_by:         SortBy::parse(params.sort_by.as_deref()),
      sort_descending: params.sort_descending,
      page:            params.page.unwrap_or(i64::from(DEFAULT_PAGE)),
      page_size:       params.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
    }
  }
}

/// `GET /movies[?titleSearch=...][&genre=...][&year=...][&sortBy=...]...`
pub async fn list<C: Catalog>(
  State(service): State<Arc<MovieService<C>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<MovieView>>, ApiError> {
  let filter = MovieFilter::from(params);
  Ok(Json(service.list(&filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /movies` with body `{"title":..,"releaseYear":..,"genre":..,"director":..}`
pub async fn create<C: Catalog>(
  State(service): State<Arc<MovieService<C>>>,
  Json(body): Json<NewMovie>,
) -> Result<impl IntoResponse, ApiError> {
  let view = service.create(body).await?;
  let location = format!("/movies/{}", view.id);
  Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(view)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /movies/{id}`
pub async fn get_one<C: Catalog>(
  State(service): State<Arc<MovieService<C>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MovieView>, ApiError> {
  Ok(Json(service.get(id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /movies/{id}`
pub async fn delete_one<C: Catalog>(
  State(service): State<Arc<MovieService<C>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  service.delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Rate ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RateBody {
  pub rating: i32,
}

/// `POST /movies/{id}/ratings` with body `{"rating":4}`
pub async fn rate_one<C: Catalog>(
  State(service): State<Arc<MovieService<C>>>,
  Path(id): Path<Uuid>,
  Author(user_id): Author,
  Json(body): Json<RateBody>,
) -> Result<Json<MovieView>, ApiError> {
  Ok(Json(service.rate(id, body.rating, user_id).await?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_params_use_defaults() {
    let filter = MovieFilter::from(ListParams::default());
    assert_eq!(filter, MovieFilter::default());
  }

  #[test]
  fn params_map_onto_filter() {
    let filter = MovieFilter::from(ListParams {
      genre: Some("Action".into()),
      sort_by: Some("Rating".into()),
      sort_descending: true,
      page: Some(0),
      page_size: Some(-1),
      ..Default::default()
    });
    assert_eq!(filter.sort_by, SortBy::Rating);
    assert!(filter.descending());
    assert_eq!(filter.page(), 1);
    assert_eq!(filter.page_size(), 10);
    assert_eq!(filter.genre(), Some("Action"));
  }
}
