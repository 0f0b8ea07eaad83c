use anyhow::Result;
use rusqlite::Connection;

use crate::models::{Album, Artist, Song, Songbook, Track};

/// Read-only relationship traversal over the catalog graph.
///
/// The rollups and the report only ever walk songbook -> albums -> tracks ->
/// song -> artist, so this is all they depend on. The SQLite connection is the
/// production implementation; tests can plug in a plain in-memory graph.
pub trait Catalog {
    fn songbook(&self, id: i64) -> Result<Songbook>;

    /// Albums of a songbook in traversal order.
    fn albums_of_songbook(&self, songbook_id: i64) -> Result<Vec<Album>>;

    /// Tracks of an album in traversal order.
    fn tracks_of_album(&self, album_id: i64) -> Result<Vec<Track>>;

    fn song(&self, id: i64) -> Result<Song>;

    fn artist(&self, id: i64) -> Result<Artist>;
}

impl Catalog for Connection {
    fn songbook(&self, id: i64) -> Result<Songbook> {
        super::fetch_songbook(self, id)
    }

    fn albums_of_songbook(&self, songbook_id: i64) -> Result<Vec<Album>> {
        super::fetch_albums_for_songbook(self, songbook_id)
    }

    fn tracks_of_album(&self, album_id: i64) -> Result<Vec<Track>> {
        super::fetch_tracks_for_album(self, album_id)
    }

    fn song(&self, id: i64) -> Result<Song> {
        super::fetch_song(self, id)
    }

    fn artist(&self, id: i64) -> Result<Artist> {
        super::fetch_artist(self, id)
    }
}
