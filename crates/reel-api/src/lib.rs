//! JSON REST API for Reel.
//!
//! Exposes an axum [`Router`] backed by any [`reel_core::store::Catalog`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility; the gateway supplies the caller's id (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", reel_api::api_router(Arc::new(MovieService::new(store))))
//! ```

pub mod auth;
pub mod error;
pub mod movies;
pub mod service;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use reel_core::store::Catalog;

pub use error::ApiError;
pub use service::{MovieService, ServiceError};

/// Build the API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<C: Catalog>(service: Arc<MovieService<C>>) -> Router<()> {
  Router::new()
    .route("/movies", get(movies::list::<C>).post(movies::create::<C>))
    .route(
      "/movies/{id}",
      get(movies::get_one::<C>).delete(movies::delete_one::<C>),
    )
    .route("/movies/{id}/ratings", post(movies::rate_one::<C>))
    .with_state(service)
}
