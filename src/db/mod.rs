//! Persistence helpers around the embedded SQLite catalog, split into one
//! submodule per record type. Uniqueness and referential integrity are left to
//! the database; the helpers here only translate its verdicts into
//! [`CatalogError`] values with readable messages.

mod albums;
mod artists;
mod catalog;
mod connection;
mod publishers;
mod search;
mod songbooks;
mod songs;
mod tracks;

use tracing::warn;

use crate::error::{constraint_kind, CatalogError, ConstraintKind};

pub use albums::{
    create_album, delete_album, fetch_album, fetch_albums, fetch_albums_for_publisher,
    fetch_albums_for_songbook, update_album, NewAlbum,
};
pub use artists::{
    create_artist, delete_artist, fetch_artist, fetch_artists, update_artist,
};
pub use catalog::Catalog;
pub use connection::{ensure_schema, open_in_memory};
pub use publishers::{
    create_publisher, delete_publisher, fetch_publisher, fetch_publishers, update_publisher,
};
pub use search::{
    find_artists_by_name_contains, find_songbooks_by_name_contains, find_songs,
    paginate_artists, paginate_songbooks, paginate_songs, Page, SongFilter, DEFAULT_SEARCH_LIMIT,
    PAGE_SIZE,
};
pub use songbooks::{
    create_songbook, delete_songbook, fetch_songbook, fetch_songbooks, update_songbook,
};
pub use songs::{
    create_song, delete_song, fetch_song, fetch_songs, fetch_songs_for_artist, update_song,
};
pub use tracks::{
    create_track, delete_track, fetch_track, fetch_tracks, fetch_tracks_for_album,
    fetch_tracks_for_song, update_track,
};

/// Translate a failed INSERT/UPDATE into the matching catalog error.
fn map_write_error(
    err: rusqlite::Error,
    entity: &'static str,
    duplicate: &'static str,
) -> CatalogError {
    match constraint_kind(&err) {
        Some(ConstraintKind::Unique) => {
            warn!(entity, "rejected duplicate record");
            CatalogError::Duplicate(duplicate)
        }
        Some(ConstraintKind::ForeignKey) => {
            warn!(entity, "rejected dangling reference");
            CatalogError::MissingReference { entity }
        }
        None => CatalogError::Sqlite(err),
    }
}

/// Translate a failed DELETE. Foreign keys restrict deletion, so a constraint
/// failure here means something still points at the row.
fn map_delete_error(err: rusqlite::Error, entity: &'static str, id: i64) -> CatalogError {
    match constraint_kind(&err) {
        Some(ConstraintKind::ForeignKey) => {
            warn!(entity, id, "refused to delete referenced record");
            CatalogError::InUse { entity, id }
        }
        _ => CatalogError::Sqlite(err),
    }
}

/// Zero affected rows means the id did not exist.
fn expect_one(changed: usize, entity: &'static str, id: i64) -> Result<(), CatalogError> {
    if changed == 0 {
        Err(CatalogError::NotFound { entity, id })
    } else {
        Ok(())
    }
}
