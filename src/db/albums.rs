use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{optional_text, required_text, CatalogError};
use crate::models::Album;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Album";
const DUPLICATE: &str = "This album code already exists in the specified songbook.";
const CODE_MAX: usize = 16;
const NAME_MAX: usize = 64;

const SELECT_ALBUM: &str =
    "SELECT id, songbook_id, code, name, publisher_id, description FROM albums";

/// Input for creating or updating an album. Borrowed so form and CLI values
/// can be passed straight through.
#[derive(Debug, Clone, Copy)]
pub struct NewAlbum<'a> {
    pub songbook_id: i64,
    pub code: &'a str,
    pub name: &'a str,
    pub publisher_id: i64,
    pub description: Option<&'a str>,
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        songbook_id: row.get(1)?,
        code: row.get(2)?,
        name: row.get(3)?,
        publisher_id: row.get(4)?,
        description: row.get(5)?,
    })
}

fn query_albums<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Album>> {
    let mut stmt = conn.prepare(sql).context("failed to prepare album query")?;

    let albums = stmt
        .query_map(params, album_from_row)
        .context("failed to load albums")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect albums")?;

    Ok(albums)
}

/// Every album grouped by songbook, then by code.
pub fn fetch_albums(conn: &Connection) -> Result<Vec<Album>> {
    query_albums(
        conn,
        &format!("{SELECT_ALBUM} ORDER BY songbook_id, code"),
        [],
    )
}

/// Albums of one songbook in code order. This is the first hop of every
/// songbook traversal.
pub fn fetch_albums_for_songbook(conn: &Connection, songbook_id: i64) -> Result<Vec<Album>> {
    query_albums(
        conn,
        &format!("{SELECT_ALBUM} WHERE songbook_id = ?1 ORDER BY code"),
        [songbook_id],
    )
}

pub fn fetch_albums_for_publisher(conn: &Connection, publisher_id: i64) -> Result<Vec<Album>> {
    query_albums(
        conn,
        &format!("{SELECT_ALBUM} WHERE publisher_id = ?1 ORDER BY songbook_id, code"),
        [publisher_id],
    )
}

pub fn fetch_album(conn: &Connection, id: i64) -> Result<Album> {
    conn.query_row(
        &format!("{SELECT_ALBUM} WHERE id = ?1"),
        [id],
        album_from_row,
    )
    .optional()
    .context("failed to load album")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

pub fn create_album(conn: &Connection, album: &NewAlbum<'_>) -> Result<Album> {
    let code = required_text("Album code", album.code, CODE_MAX)?;
    let name = required_text("Album name", album.name, NAME_MAX)?;
    let description = optional_text(album.description);

    conn.execute(
        "INSERT INTO albums (songbook_id, code, name, publisher_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![album.songbook_id, code, name, album.publisher_id, description],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert album")?;

    let id = conn.last_insert_rowid();
    debug!(id, songbook_id = album.songbook_id, code, "created album");
    Ok(Album {
        id,
        songbook_id: album.songbook_id,
        code: code.to_string(),
        name: name.to_string(),
        publisher_id: album.publisher_id,
        description,
    })
}

pub fn update_album(conn: &Connection, id: i64, album: &NewAlbum<'_>) -> Result<()> {
    let code = required_text("Album code", album.code, CODE_MAX)?;
    let name = required_text("Album name", album.name, NAME_MAX)?;

    let updated = conn
        .execute(
            "UPDATE albums
             SET songbook_id = ?1, code = ?2, name = ?3, publisher_id = ?4, description = ?5
             WHERE id = ?6",
            params![
                album.songbook_id,
                code,
                name,
                album.publisher_id,
                optional_text(album.description),
                id
            ],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update album")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated album");
    Ok(())
}

/// Remove an album. Refused while tracks still belong to it.
pub fn delete_album(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM albums WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete album")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted album");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        create_artist, create_publisher, create_song, create_songbook, create_track,
        delete_track, open_in_memory,
    };

    fn album<'a>(songbook_id: i64, publisher_id: i64, code: &'a str) -> NewAlbum<'a> {
        NewAlbum {
            songbook_id,
            code,
            name: "Album",
            publisher_id,
            description: None,
        }
    }

    #[test]
    fn code_is_unique_per_songbook_only() {
        let conn = open_in_memory().unwrap();
        let first = create_songbook(&conn, "First", None).unwrap();
        let second = create_songbook(&conn, "Second", None).unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();

        create_album(&conn, &album(first.id, publisher.id, "A1")).unwrap();
        create_album(&conn, &album(second.id, publisher.id, "A1")).unwrap();
        let err = create_album(&conn, &album(first.id, publisher.id, "A1")).unwrap_err();

        assert_eq!(
            err.downcast_ref::<CatalogError>().unwrap().to_string(),
            "This album code already exists in the specified songbook."
        );
    }

    #[test]
    fn unknown_publisher_is_a_missing_reference() {
        let conn = open_in_memory().unwrap();
        let book = create_songbook(&conn, "Book", None).unwrap();
        let err = create_album(&conn, &album(book.id, 999, "A1")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::MissingReference { .. })
        ));
    }

    #[test]
    fn songbook_albums_come_back_in_code_order() {
        let conn = open_in_memory().unwrap();
        let book = create_songbook(&conn, "Book", None).unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();
        create_album(&conn, &album(book.id, publisher.id, "B2")).unwrap();
        create_album(&conn, &album(book.id, publisher.id, "A1")).unwrap();

        let codes: Vec<_> = fetch_albums_for_songbook(&conn, book.id)
            .unwrap()
            .into_iter()
            .map(|a| a.code)
            .collect();
        assert_eq!(codes, ["A1", "B2"]);
        assert_eq!(fetch_albums_for_publisher(&conn, publisher.id).unwrap().len(), 2);
    }

    #[test]
    fn recoding_onto_an_existing_album_is_a_duplicate() {
        let conn = open_in_memory().unwrap();
        let book = create_songbook(&conn, "Book", None).unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();
        create_album(&conn, &album(book.id, publisher.id, "A1")).unwrap();
        let second = create_album(&conn, &album(book.id, publisher.id, "A2")).unwrap();

        let err = update_album(&conn, second.id, &album(book.id, publisher.id, "A1")).unwrap_err();
        assert_eq!(err.downcast_ref::<CatalogError>().unwrap().to_string(), DUPLICATE);

        update_album(&conn, second.id, &album(book.id, publisher.id, "B1")).unwrap();
        assert_eq!(fetch_album(&conn, second.id).unwrap().code, "B1");
    }

    #[test]
    fn missing_album_is_not_found() {
        let conn = open_in_memory().unwrap();
        let book = create_songbook(&conn, "Book", None).unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();

        for err in [
            fetch_album(&conn, 999).unwrap_err(),
            update_album(&conn, 999, &album(book.id, publisher.id, "A1")).unwrap_err(),
            delete_album(&conn, 999).unwrap_err(),
        ] {
            assert!(matches!(
                err.downcast_ref::<CatalogError>(),
                Some(CatalogError::NotFound { entity: "Album", id: 999 })
            ));
        }
    }

    #[test]
    fn album_with_tracks_cannot_be_deleted() {
        let conn = open_in_memory().unwrap();
        let book = create_songbook(&conn, "Book", None).unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();
        let a1 = create_album(&conn, &album(book.id, publisher.id, "A1")).unwrap();
        let artist = create_artist(&conn, "Doe", Some("John")).unwrap();
        let song = create_song(&conn, "Tonight", artist.id).unwrap();
        let track = create_track(&conn, a1.id, "001", song.id).unwrap();

        let err = delete_album(&conn, a1.id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::InUse { entity: "Album", .. })
        ));

        delete_track(&conn, track.id).unwrap();
        delete_album(&conn, a1.id).unwrap();
        assert!(fetch_albums(&conn).unwrap().is_empty());
    }
}
