//! SQLite backend for the Reel movie catalogue.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] is the shared handle;
//! [`SqliteSession`] is the per-operation store and unit of work.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteSession, SqliteStore};
