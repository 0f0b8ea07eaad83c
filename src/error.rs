//! Store-level failures. The persistence helpers wrap these in `anyhow` with a
//! short context line, so callers that care about the kind can still
//! `downcast_ref::<CatalogError>()` through the chain.

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A uniqueness constraint rejected the write. The message is the one
    /// shown to users.
    #[error("{0}")]
    Duplicate(&'static str),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A delete hit a foreign key that still points at the row.
    #[error("{entity} {id} is still referenced by other records")]
    InUse { entity: &'static str, id: i64 },

    /// A write referenced a parent row that does not exist.
    #[error("{entity} refers to a record that does not exist")]
    MissingReference { entity: &'static str },

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Which constraint family a SQLite failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Unique,
    ForeignKey,
}

/// Classify a SQLite error by its extended result code.
pub(crate) fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(ConstraintKind::Unique)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(ConstraintKind::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}

/// Validate a required text field: it must not be blank and must fit within
/// `max` characters. The value is stored exactly as given, surrounding
/// whitespace included, since exports write it out verbatim.
pub(crate) fn required_text<'a>(
    field: &'static str,
    value: &'a str,
    max: usize,
) -> Result<&'a str, CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Required { field });
    }
    if value.chars().count() > max {
        return Err(CatalogError::TooLong { field, max });
    }
    Ok(value)
}

/// Optional text fields collapse blank input to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_keeps_value_and_checks_length() {
        assert_eq!(required_text("Code", " PUB", 4).unwrap(), " PUB");
        assert!(matches!(
            required_text("Code", "  PUB ", 4),
            Err(CatalogError::TooLong { field: "Code", max: 4 })
        ));
        assert!(matches!(
            required_text("Code", "   ", 4),
            Err(CatalogError::Required { field: "Code" })
        ));
        assert!(matches!(
            required_text("Code", "TOOLONG", 4),
            Err(CatalogError::TooLong { field: "Code", max: 4 })
        ));
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" hi ")), Some("hi".to_string()));
    }
}
