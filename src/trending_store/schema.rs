//! SQLite schema for the trending database.

/// Current schema version, written to `PRAGMA user_version`.
pub const TRENDING_SCHEMA_VERSION: i64 = 1;

/// Tracks counted by search volume. The (track_name, artist) primary key is
/// what makes the increment-or-create upsert atomic.
pub const TRENDING_SCHEMA: &str = "
CREATE TABLE trending_song (
    track_name       TEXT    NOT NULL,
    artist           TEXT    NOT NULL,
    album            TEXT    NOT NULL,
    spotify_url      TEXT    NOT NULL,
    album_art        TEXT,
    search_count     INTEGER NOT NULL DEFAULT 1,
    last_searched_at INTEGER NOT NULL,
    created_at       INTEGER NOT NULL,
    PRIMARY KEY (track_name, artist)
);
CREATE INDEX idx_trending_last_searched ON trending_song (last_searched_at);
";
