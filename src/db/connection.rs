use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::debug;

/// Open (creating if needed) the catalog database at `path`, run the lazy
/// migrations, and return a live connection.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    debug!(path = %path.display(), "opened catalog database");
    register_functions(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

/// Fresh catalog that lives only as long as the connection. Used by tests and
/// one-off tooling.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    register_functions(&conn)?;
    migrate(&conn)?;
    Ok(conn)
}

/// Install `fold(text)`, a Unicode lowercase used by the searches. SQLite's
/// own `LIKE` and `lower()` only fold ASCII letters.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
    .context("failed to register fold function")
}

/// Create every table if it is missing. `PRAGMA foreign_keys = ON` is issued on
/// each connection because SQLite does not persist it.
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS publishers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT
        )",
        [],
    )
    .context("failed to create publishers table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songbooks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )",
        [],
    )
    .context("failed to create songbooks table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            songbook_id INTEGER NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            publisher_id INTEGER NOT NULL,
            description TEXT,
            UNIQUE (songbook_id, code),
            FOREIGN KEY(songbook_id) REFERENCES songbooks(id),
            FOREIGN KEY(publisher_id) REFERENCES publishers(id)
        )",
        [],
    )
    .context("failed to create albums table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            first_name TEXT,
            UNIQUE (last_name, first_name)
        )",
        [],
    )
    .context("failed to create artists table")?;

    // NULLs never collide in a plain UNIQUE constraint, so single-name
    // artists need the first name folded to '' to stay unique.
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_artists_full_name
         ON artists(last_name, COALESCE(first_name, ''))",
        [],
    )
    .context("failed to create artist name index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist_id INTEGER NOT NULL,
            UNIQUE (title, artist_id),
            FOREIGN KEY(artist_id) REFERENCES artists(id)
        )",
        [],
    )
    .context("failed to create songs table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            album_id INTEGER NOT NULL,
            code TEXT NOT NULL,
            song_id INTEGER NOT NULL,
            UNIQUE (album_id, code),
            FOREIGN KEY(album_id) REFERENCES albums(id),
            FOREIGN KEY(song_id) REFERENCES songs(id)
        )",
        [],
    )
    .context("failed to create tracks table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_albums_songbook ON albums(songbook_id)",
        [],
    )
    .context("failed to create album index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tracks_album ON tracks(album_id)",
        [],
    )
    .context("failed to create track index")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('publishers', 'songbooks', 'albums', 'artists', 'songs', 'tracks')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 6);
    }

    #[test]
    fn fold_lowercases_beyond_ascii() {
        let conn = open_in_memory().unwrap();
        let folded: String = conn
            .query_row("SELECT fold('ÉLAN Ärger')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "élan ärger");
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = open_in_memory().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
