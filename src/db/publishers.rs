use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{optional_text, required_text, CatalogError};
use crate::models::Publisher;

use super::{expect_one, map_delete_error, map_write_error};

const ENTITY: &str = "Publisher";
const DUPLICATE: &str = "This publisher code already exists.";
const CODE_MAX: usize = 4;
const NAME_MAX: usize = 64;

fn publisher_from_row(row: &Row<'_>) -> rusqlite::Result<Publisher> {
    Ok(Publisher {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
    })
}

/// Every publisher, ordered by name.
pub fn fetch_publishers(conn: &Connection) -> Result<Vec<Publisher>> {
    let mut stmt = conn
        .prepare("SELECT id, code, name, description FROM publishers ORDER BY name, id")
        .context("failed to prepare publisher query")?;

    let publishers = stmt
        .query_map([], publisher_from_row)
        .context("failed to load publishers")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect publishers")?;

    Ok(publishers)
}

pub fn fetch_publisher(conn: &Connection, id: i64) -> Result<Publisher> {
    conn.query_row(
        "SELECT id, code, name, description FROM publishers WHERE id = ?1",
        [id],
        publisher_from_row,
    )
    .optional()
    .context("failed to load publisher")?
    .ok_or_else(|| CatalogError::NotFound { entity: ENTITY, id }.into())
}

/// Insert a publisher and echo the stored record.
pub fn create_publisher(
    conn: &Connection,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<Publisher> {
    let code = required_text("Publisher code", code, CODE_MAX)?;
    let name = required_text("Publisher name", name, NAME_MAX)?;
    let description = optional_text(description);

    conn.execute(
        "INSERT INTO publishers (code, name, description) VALUES (?1, ?2, ?3)",
        params![code, name, description],
    )
    .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
    .context("failed to insert publisher")?;

    let id = conn.last_insert_rowid();
    debug!(id, code, "created publisher");
    Ok(Publisher {
        id,
        code: code.to_string(),
        name: name.to_string(),
        description,
    })
}

pub fn update_publisher(
    conn: &Connection,
    id: i64,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let code = required_text("Publisher code", code, CODE_MAX)?;
    let name = required_text("Publisher name", name, NAME_MAX)?;

    let updated = conn
        .execute(
            "UPDATE publishers SET code = ?1, name = ?2, description = ?3 WHERE id = ?4",
            params![code, name, optional_text(description), id],
        )
        .map_err(|err| map_write_error(err, ENTITY, DUPLICATE))
        .context("failed to update publisher")?;

    expect_one(updated, ENTITY, id)?;
    debug!(id, "updated publisher");
    Ok(())
}

/// Remove a publisher. Albums keep a required link to their publisher, so the
/// delete is refused while any album still uses it.
pub fn delete_publisher(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM publishers WHERE id = ?1", [id])
        .map_err(|err| map_delete_error(err, ENTITY, id))
        .context("failed to delete publisher")?;

    expect_one(deleted, ENTITY, id)?;
    debug!(id, "deleted publisher");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn publishers_sort_by_name() {
        let conn = open_in_memory().unwrap();
        create_publisher(&conn, "ZZ", "Zebra Tracks", None).unwrap();
        create_publisher(&conn, "AA", "Alpha Sound", Some("  ")).unwrap();

        let names: Vec<_> = fetch_publishers(&conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Alpha Sound", "Zebra Tracks"]);
    }

    #[test]
    fn duplicate_code_is_rejected_with_message() {
        let conn = open_in_memory().unwrap();
        create_publisher(&conn, "PUB", "First", None).unwrap();
        let err = create_publisher(&conn, "PUB", "Second", None).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::Duplicate(_))
        ));
        assert_eq!(
            err.downcast_ref::<CatalogError>().unwrap().to_string(),
            "This publisher code already exists."
        );
    }

    #[test]
    fn code_longer_than_four_characters_is_rejected() {
        let conn = open_in_memory().unwrap();
        let err = create_publisher(&conn, "ABCDE", "Too Long", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::TooLong { max: 4, .. })
        ));
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = open_in_memory().unwrap();
        let err = update_publisher(&conn, 42, "X", "Nobody", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::NotFound { id: 42, .. })
        ));
        assert!(delete_publisher(&conn, 42).is_err());
    }

    #[test]
    fn updated_publisher_reads_back() {
        let conn = open_in_memory().unwrap();
        let publisher = create_publisher(&conn, "PUB", "Publisher", None).unwrap();
        create_publisher(&conn, "ALT", "Other", None).unwrap();

        update_publisher(&conn, publisher.id, "NEW", "Renamed", Some("House label")).unwrap();
        let fetched = fetch_publisher(&conn, publisher.id).unwrap();
        assert_eq!(fetched.code, "NEW");
        assert_eq!(fetched.description.as_deref(), Some("House label"));

        let err = update_publisher(&conn, publisher.id, "ALT", "Renamed", None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>().unwrap().to_string(),
            "This publisher code already exists."
        );
        assert!(matches!(
            fetch_publisher(&conn, 999).unwrap_err().downcast_ref::<CatalogError>(),
            Some(CatalogError::NotFound { id: 999, .. })
        ));
    }
}
