//! HTTP host for the Reel API: configuration and router assembly.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use reel_api::{MovieService, service::DEFAULT_RATING_ATTEMPTS};
use reel_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REEL_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Attempts per rating submission before a concurrency conflict is
  /// reported to the client.
  pub rating_attempts: u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("reel.db"),
      rating_attempts: DEFAULT_RATING_ATTEMPTS,
    }
  }
}

impl ServerConfig {
  /// Layer `REEL_*` environment variables over `source` and deserialise.
  pub fn load<S>(source: S) -> Result<Self, config::ConfigError>
  where
    S: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(source)
      .add_source(config::Environment::with_prefix("REEL"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the API nested under `/api`, with a
/// tracing span around every request.
pub fn router(store: SqliteStore, config: &ServerConfig) -> Router {
  let service = MovieService::new(store).with_rating_attempts(config.rating_attempts);
  Router::new()
    .nest("/api", reel_api::api_router(Arc::new(service)))
    .layer(TraceLayer::new_for_http())
}
