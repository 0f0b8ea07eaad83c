use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{required_text, CatalogError};
use crate::models::Track;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Track";
const DUPLICATE: &str = "This track code already exists in the specified album.";
const CODE_MAX: usize = 16;

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        album_id: row.get(1)?,
        code: row.get(2)?,
        song_id: row.get(3)?,
    })
}

fn query_tracks<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Track>> {
    let mut stmt = conn.prepare(sql).context("failed to prepare track query")?;

    let tracks = stmt
        .query_map(params, track_from_row)
        .context("failed to iterate tracks")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect tracks")?;

    Ok(tracks)
}

pub fn fetch_tracks(conn: &Connection) -> Result<Vec<Track>> {
    query_tracks(
        conn,
        "SELECT id, album_id, code, song_id FROM tracks ORDER BY code, id",
        [],
    )
}

/// Tracks of one album in code order, the second hop of a songbook traversal.
pub fn fetch_tracks_for_album(conn: &Connection, album_id: i64) -> Result<Vec<Track>> {
    query_tracks(
        conn,
        "SELECT id, album_id, code, song_id FROM tracks WHERE album_id = ?1 ORDER BY code",
        [album_id],
    )
}

pub fn fetch_tracks_for_song(conn: &Connection, song_id: i64) -> Result<Vec<Track>> {
    query_tracks(
        conn,
        "SELECT id, album_id, code, song_id FROM tracks WHERE song_id = ?1 ORDER BY code, id",
        [song_id],
    )
}

pub fn fetch_track(conn: &Connection, id: i64) -> Result<Track> {
    conn.query_row(
        "SELECT id, album_id, code, song_id FROM tracks WHERE id = ?1",
        [id],
        track_from_row,
    )
    .optional()
    .context("failed to load track")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

pub fn create_track(conn: &Connection, album_id: i64, code: &str, song_id: i64) -> Result<Track> {
    let code = required_text("Track code", code, CODE_MAX)?;

    conn.execute(
        "INSERT INTO tracks (album_id, code, song_id) VALUES (?1, ?2, ?3)",
        params![album_id, code, song_id],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert track")?;

    let id = conn.last_insert_rowid();
    debug!(id, album_id, code, "created track");
    Ok(Track {
        id,
        album_id,
        code: code.to_string(),
        song_id,
    })
}

pub fn update_track(
    conn: &Connection,
    id: i64,
    album_id: i64,
    code: &str,
    song_id: i64,
) -> Result<()> {
    let code = required_text("Track code", code, CODE_MAX)?;

    let updated = conn
        .execute(
            "UPDATE tracks SET album_id = ?1, code = ?2, song_id = ?3 WHERE id = ?4",
            params![album_id, code, song_id, id],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update track")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated track");
    Ok(())
}

pub fn delete_track(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM tracks WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete track")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted track");
    Ok(())
}
