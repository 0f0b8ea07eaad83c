use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{optional_text, required_text, CatalogError};
use crate::models::Songbook;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Songbook";
const DUPLICATE: &str = "A songbook with that name already exists.";
const NAME_MAX: usize = 64;

pub(super) fn songbook_from_row(row: &Row<'_>) -> rusqlite::Result<Songbook> {
    Ok(Songbook {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

/// Every songbook, ordered by name. This ordering drives the songbook list in
/// the terminal UI as well as the CLI output.
pub fn fetch_songbooks(conn: &Connection) -> Result<Vec<Songbook>> {
    let mut stmt = conn
        .prepare("SELECT id, name, description FROM songbooks ORDER BY name")
        .context("failed to prepare songbook query")?;

    let songbooks = stmt
        .query_map([], songbook_from_row)
        .context("failed to load songbooks")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songbooks")?;

    Ok(songbooks)
}

pub fn fetch_songbook(conn: &Connection, id: i64) -> Result<Songbook> {
    conn.query_row(
        "SELECT id, name, description FROM songbooks WHERE id = ?1",
        [id],
        songbook_from_row,
    )
    .optional()
    .context("failed to load songbook")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

pub fn create_songbook(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<Songbook> {
    let name = required_text("Songbook name", name, NAME_MAX)?;
    let description = optional_text(description);

    conn.execute(
        "INSERT INTO songbooks (name, description) VALUES (?1, ?2)",
        params![name, description],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert songbook")?;

    let id = conn.last_insert_rowid();
    debug!(id, name, "created songbook");
    Ok(Songbook {
        id,
        name: name.to_string(),
        description,
    })
}

pub fn update_songbook(
    conn: &Connection,
    id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let name = required_text("Songbook name", name, NAME_MAX)?;

    let updated = conn
        .execute(
            "UPDATE songbooks SET name = ?1, description = ?2 WHERE id = ?3",
            params![name, optional_text(description), id],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update songbook")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated songbook");
    Ok(())
}

/// Remove an empty songbook. Songbooks that still own albums are refused.
pub fn delete_songbook(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songbooks WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete songbook")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted songbook");
    Ok(())
}
