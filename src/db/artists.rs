use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{optional_text, required_text, CatalogError};
use crate::models::Artist;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Artist";
const DUPLICATE: &str = "An artist with that name already exists.";
const NAME_MAX: usize = 128;

pub(super) fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        last_name: row.get(1)?,
        first_name: row.get(2)?,
    })
}

/// Every artist ordered by last name, then first name.
pub fn fetch_artists(conn: &Connection) -> Result<Vec<Artist>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, last_name, first_name FROM artists
             ORDER BY last_name, first_name",
        )
        .context("failed to prepare artist query")?;

    let artists = stmt
        .query_map([], artist_from_row)
        .context("failed to load artists")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect artists")?;

    Ok(artists)
}

pub fn fetch_artist(conn: &Connection, id: i64) -> Result<Artist> {
    conn.query_row(
        "SELECT id, last_name, first_name FROM artists WHERE id = ?1",
        [id],
        artist_from_row,
    )
    .optional()
    .context("failed to load artist")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

/// Insert an artist. A blank first name is stored as NULL so single-name
/// performers sort and display without stray separators.
pub fn create_artist(conn: &Connection, last_name: &str, first_name: Option<&str>) -> Result<Artist> {
    let last_name = required_text("Last name", last_name, NAME_MAX)?;
    let first_name = optional_text(first_name);

    conn.execute(
        "INSERT INTO artists (last_name, first_name) VALUES (?1, ?2)",
        params![last_name, first_name],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert artist")?;

    let id = conn.last_insert_rowid();
    debug!(id, last_name, "created artist");
    Ok(Artist {
        id,
        last_name: last_name.to_string(),
        first_name,
    })
}

pub fn update_artist(
    conn: &Connection,
    id: i64,
    last_name: &str,
    first_name: Option<&str>,
) -> Result<()> {
    let last_name = required_text("Last name", last_name, NAME_MAX)?;

    let updated = conn
        .execute(
            "UPDATE artists SET last_name = ?1, first_name = ?2 WHERE id = ?3",
            params![last_name, optional_text(first_name), id],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update artist")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated artist");
    Ok(())
}

/// Remove an artist. Refused while any song is still credited to them.
pub fn delete_artist(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM artists WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete artist")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted artist");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn blank_first_name_is_stored_as_null() {
        let conn = open_in_memory().unwrap();
        let artist = create_artist(&conn, "Madonna", Some("   ")).unwrap();
        assert_eq!(artist.first_name, None);

        let fetched = fetch_artist(&conn, artist.id).unwrap();
        assert_eq!(fetched.first_name, None);
        assert_eq!(fetched.full_name(), "Madonna");
    }

    #[test]
    fn full_name_pair_is_unique() {
        let conn = open_in_memory().unwrap();
        create_artist(&conn, "Doe", Some("John")).unwrap();
        create_artist(&conn, "Doe", Some("Jane")).unwrap();
        let err = create_artist(&conn, "Doe", Some("John")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>().unwrap().to_string(),
            "An artist with that name already exists."
        );
    }

    #[test]
    fn single_name_artist_cannot_be_added_twice() {
        let conn = open_in_memory().unwrap();
        create_artist(&conn, "Cher", None).unwrap();

        for first_name in [None, Some(""), Some("  ")] {
            let err = create_artist(&conn, "Cher", first_name).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CatalogError>(),
                Some(CatalogError::Duplicate(DUPLICATE))
            ));
        }
        assert_eq!(fetch_artists(&conn).unwrap().len(), 1);
    }

    #[test]
    fn renaming_onto_an_existing_artist_is_a_duplicate() {
        let conn = open_in_memory().unwrap();
        create_artist(&conn, "Cher", None).unwrap();
        let doe = create_artist(&conn, "Doe", Some("John")).unwrap();

        let err = update_artist(&conn, doe.id, "Cher", None).unwrap_err();
        assert_eq!(err.downcast_ref::<CatalogError>().unwrap().to_string(), DUPLICATE);

        update_artist(&conn, doe.id, "Doe", Some("Jane")).unwrap();
        assert_eq!(fetch_artist(&conn, doe.id).unwrap().full_name(), "Jane Doe");
    }

    #[test]
    fn missing_artist_is_not_found() {
        let conn = open_in_memory().unwrap();
        for err in [
            update_artist(&conn, 999, "Ghost", None).unwrap_err(),
            delete_artist(&conn, 999).unwrap_err(),
        ] {
            assert!(matches!(
                err.downcast_ref::<CatalogError>(),
                Some(CatalogError::NotFound { id: 999, .. })
            ));
        }
    }

    #[test]
    fn artists_order_by_last_then_first_name() {
        let conn = open_in_memory().unwrap();
        create_artist(&conn, "Smith", Some("Adam")).unwrap();
        create_artist(&conn, "Doe", Some("John")).unwrap();
        create_artist(&conn, "Doe", Some("Jane")).unwrap();

        let names: Vec<_> = fetch_artists(&conn)
            .unwrap()
            .iter()
            .map(Artist::rev_name)
            .collect();
        assert_eq!(names, ["Doe, Jane", "Doe, John", "Smith, Adam"]);
    }
}
