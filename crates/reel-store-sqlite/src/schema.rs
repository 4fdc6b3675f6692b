//! SQL schema for the Reel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are never removed; deletion flips is_deleted.
CREATE TABLE IF NOT EXISTS movies (
    movie_id      TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    release_year  INTEGER NOT NULL,
    genre         TEXT NOT NULL,
    director      TEXT NOT NULL,
    is_deleted    INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,   -- RFC 3339, microseconds, UTC 'Z'
    updated_at    TEXT,
    version       INTEGER NOT NULL DEFAULT 0  -- bumped on every update
);

-- seq preserves insertion order.
CREATE TABLE IF NOT EXISTS ratings (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    rating_id   TEXT NOT NULL UNIQUE,
    movie_id    TEXT NOT NULL REFERENCES movies(movie_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL,
    value       INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
    created_at  TEXT NOT NULL,
    UNIQUE (movie_id, user_id)
);

CREATE INDEX IF NOT EXISTS movies_listing_idx ON movies(is_deleted, created_at);
CREATE INDEX IF NOT EXISTS movies_genre_idx   ON movies(genre, release_year);
CREATE INDEX IF NOT EXISTS ratings_movie_idx  ON ratings(movie_id, seq);

PRAGMA user_version = 1;
";
