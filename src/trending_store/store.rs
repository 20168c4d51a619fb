//! SQLite-backed trending store implementation.

use super::models::TrendingRecord;
use super::schema::{TRENDING_SCHEMA, TRENDING_SCHEMA_VERSION};
use super::trait_def::TrendingStore;
use crate::spotify::TrackIdentity;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// SQLite-backed trending store with separate read and write connections.
#[derive(Clone)]
pub struct SqliteTrendingStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

fn migrate_if_needed(conn: &Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version >= TRENDING_SCHEMA_VERSION {
        return Ok(());
    }

    info!(
        "Creating trending db schema at version {}",
        TRENDING_SCHEMA_VERSION
    );
    conn.execute_batch(TRENDING_SCHEMA)
        .context("Failed to create trending schema")?;
    conn.pragma_update(None, "user_version", TRENDING_SCHEMA_VERSION)?;
    Ok(())
}

impl SqliteTrendingStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open trending database")?;

        migrate_if_needed(&write_conn)?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on trending write connection")?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open trending database for reading")?;

        read_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on trending read connection")?;

        let tracked: usize = read_conn.query_row("SELECT COUNT(*) FROM trending_song", [], |r| {
            r.get(0)
        })?;
        info!("Trending store ready: {} tracks tracked", tracked);

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    /// Like [`TrendingStore::record_search`] with an explicit timestamp.
    pub fn record_search_at(&self, track: &TrackIdentity, now: i64) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO trending_song
                 (track_name, artist, album, spotify_url, album_art,
                  search_count, last_searched_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
             ON CONFLICT(track_name, artist) DO UPDATE SET
                 search_count = search_count + 1,
                 last_searched_at = excluded.last_searched_at",
            params![
                track.name,
                track.artist,
                track.album,
                track.spotify_url,
                track.album_art,
                now,
            ],
        )?;
        Ok(())
    }

    /// Like [`TrendingStore::top_trending`] with an explicit reference time.
    pub fn top_trending_at(
        &self,
        window_days: u32,
        limit: usize,
        now: i64,
    ) -> Result<Vec<TrendingRecord>> {
        let cutoff = now - window_days as i64 * SECONDS_PER_DAY;
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT track_name, artist, album, spotify_url, album_art,
                    search_count, last_searched_at, created_at
             FROM trending_song
             WHERE last_searched_at >= ?1
             ORDER BY search_count DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![cutoff, limit as i64], |row| {
            Ok(TrendingRecord {
                track_name: row.get(0)?,
                artist: row.get(1)?,
                album: row.get(2)?,
                spotify_url: row.get(3)?,
                album_art: row.get(4)?,
                search_count: row.get(5)?,
                last_searched_at: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        let records = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl TrendingStore for SqliteTrendingStore {
    fn record_search(&self, track: &TrackIdentity) -> Result<()> {
        self.record_search_at(track, Utc::now().timestamp())
    }

    fn top_trending(&self, window_days: u32, limit: usize) -> Result<Vec<TrendingRecord>> {
        self.top_trending_at(window_days, limit, Utc::now().timestamp())
    }
}
