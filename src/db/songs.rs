use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{required_text, CatalogError};
use crate::models::Song;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Song";
const DUPLICATE: &str = "This song by this artist already exists in the system.";
const TITLE_MAX: usize = 64;

pub(super) fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
    })
}

/// Every song ordered by title.
pub fn fetch_songs(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare("SELECT id, title, artist_id FROM songs ORDER BY title, id")
        .context("failed to prepare song query")?;

    let songs = stmt
        .query_map([], song_from_row)
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    Ok(songs)
}

/// Songs credited to one artist, ordered by title.
pub fn fetch_songs_for_artist(conn: &Connection, artist_id: i64) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, artist_id FROM songs
             WHERE artist_id = ?1
             ORDER BY title",
        )
        .context("failed to prepare artist songs query")?;

    let songs = stmt
        .query_map([artist_id], song_from_row)
        .context("failed to iterate artist songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect artist songs")?;

    Ok(songs)
}

pub fn fetch_song(conn: &Connection, id: i64) -> Result<Song> {
    conn.query_row(
        "SELECT id, title, artist_id FROM songs WHERE id = ?1",
        [id],
        song_from_row,
    )
    .optional()
    .context("failed to load song")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

pub fn create_song(conn: &Connection, title: &str, artist_id: i64) -> Result<Song> {
    let title = required_text("Song title", title, TITLE_MAX)?;

    conn.execute(
        "INSERT INTO songs (title, artist_id) VALUES (?1, ?2)",
        params![title, artist_id],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert song")?;

    let id = conn.last_insert_rowid();
    debug!(id, artist_id, title, "created song");
    Ok(Song {
        id,
        title: title.to_string(),
        artist_id,
    })
}

pub fn update_song(conn: &Connection, id: i64, title: &str, artist_id: i64) -> Result<()> {
    let title = required_text("Song title", title, TITLE_MAX)?;

    let updated = conn
        .execute(
            "UPDATE songs SET title = ?1, artist_id = ?2 WHERE id = ?3",
            params![title, artist_id, id],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update song")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated song");
    Ok(())
}

/// Remove a song. Refused while any album still carries a track of it.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete song")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted song");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_artist, open_in_memory};

    #[test]
    fn same_title_is_allowed_for_different_artists() {
        let conn = open_in_memory().unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();
        let roe = create_artist(&conn, "Roe", Some("Jane")).unwrap();

        create_song(&conn, "Tonight", doe.id).unwrap();
        create_song(&conn, "Tonight", roe.id).unwrap();
        let err = create_song(&conn, "Tonight", doe.id).unwrap_err();

        assert_eq!(
            err.downcast_ref::<CatalogError>().unwrap().to_string(),
            "This song by this artist already exists in the system."
        );
        assert_eq!(fetch_songs_for_artist(&conn, doe.id).unwrap().len(), 1);
    }

    #[test]
    fn artist_with_songs_cannot_be_deleted() {
        let conn = open_in_memory().unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();
        let song = create_song(&conn, "Tonight", doe.id).unwrap();

        assert!(crate::db::delete_artist(&conn, doe.id).is_err());
        delete_song(&conn, song.id).unwrap();
        crate::db::delete_artist(&conn, doe.id).unwrap();
    }

    #[test]
    fn songs_list_by_title_and_update_in_place() {
        let conn = open_in_memory().unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();
        let zulu = create_song(&conn, "Zulu", doe.id).unwrap();
        create_song(&conn, "Alpha", doe.id).unwrap();

        update_song(&conn, zulu.id, "Beta", doe.id).unwrap();
        let titles: Vec<_> = fetch_songs(&conn)
            .unwrap()
            .into_iter()
            .map(|song| song.title)
            .collect();
        assert_eq!(titles, ["Alpha", "Beta"]);
        assert_eq!(fetch_song(&conn, zulu.id).unwrap().title, "Beta");
    }

    #[test]
    fn retitling_onto_an_existing_song_is_a_duplicate() {
        let conn = open_in_memory().unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();
        create_song(&conn, "Tonight", doe.id).unwrap();
        let other = create_song(&conn, "Morning", doe.id).unwrap();

        let err = update_song(&conn, other.id, "Tonight", doe.id).unwrap_err();
        assert_eq!(err.downcast_ref::<CatalogError>().unwrap().to_string(), DUPLICATE);
    }

    #[test]
    fn missing_song_is_not_found() {
        let conn = open_in_memory().unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();
        for err in [
            fetch_song(&conn, 999).unwrap_err(),
            update_song(&conn, 999, "Ghost", doe.id).unwrap_err(),
            delete_song(&conn, 999).unwrap_err(),
        ] {
            assert!(matches!(
                err.downcast_ref::<CatalogError>(),
                Some(CatalogError::NotFound { entity: "Song", id: 999 })
            ));
        }
    }
}
