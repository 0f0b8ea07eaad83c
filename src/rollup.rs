//! Derived song listings for a songbook. Both rollups walk the live graph on
//! every call (songbook -> albums -> tracks -> song -> artist), collapse
//! duplicates on a string key keeping the first song seen, and return song ids
//! ordered by that key. Nothing is cached, so the result always reflects the
//! current catalog.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::db::Catalog;
use crate::models::SongEntry;
use crate::names::LABEL_SEPARATOR;

/// Every song reachable from the songbook, once per track, in album code then
/// track code order.
pub fn walk_songbook<C: Catalog + ?Sized>(catalog: &C, songbook_id: i64) -> Result<Vec<SongEntry>> {
    let mut entries = Vec::new();
    for album in catalog.albums_of_songbook(songbook_id)? {
        for track in catalog.tracks_of_album(album.id)? {
            let song = catalog.song(track.song_id)?;
            let artist = catalog.artist(song.artist_id)?;
            entries.push(SongEntry { song, artist });
        }
    }
    Ok(entries)
}

/// Collapse entries on `key`, first occurrence wins, and return ids in key
/// order. `BTreeMap<String, _>` orders by code point, independent of locale.
fn distinct_sorted_ids<F>(entries: &[SongEntry], key: F) -> Vec<i64>
where
    F: Fn(&SongEntry) -> String,
{
    let mut by_key: BTreeMap<String, i64> = BTreeMap::new();
    for entry in entries {
        by_key.entry(key(entry)).or_insert(entry.song.id);
    }
    by_key.into_values().collect()
}

/// Song ids ordered by their `"Title | Artist"` label.
pub fn songs_by_title<C: Catalog + ?Sized>(catalog: &C, songbook_id: i64) -> Result<Vec<i64>> {
    let entries = walk_songbook(catalog, songbook_id)?;
    Ok(distinct_sorted_ids(&entries, SongEntry::label))
}

/// Song ids ordered by `"Last, First | Title"`, grouping each artist's songs
/// together.
pub fn songs_by_artist<C: Catalog + ?Sized>(catalog: &C, songbook_id: i64) -> Result<Vec<i64>> {
    let entries = walk_songbook(catalog, songbook_id)?;
    Ok(distinct_sorted_ids(&entries, artist_key))
}

/// Resolve song ids back to songs and their artists, keeping the given order.
pub fn resolve_songs<C: Catalog + ?Sized>(catalog: &C, song_ids: &[i64]) -> Result<Vec<SongEntry>> {
    song_ids
        .iter()
        .map(|&id| -> Result<SongEntry> {
            let song = catalog.song(id)?;
            let artist = catalog.artist(song.artist_id)?;
            Ok(SongEntry { song, artist })
        })
        .collect()
}

/// `"Last, First | Title"`.
pub(crate) fn artist_key(entry: &SongEntry) -> String {
    format!(
        "{}{}{}",
        entry.artist.rev_name(),
        LABEL_SEPARATOR,
        entry.song.title
    )
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use anyhow::{anyhow, Result};

    use crate::db::Catalog;
    use crate::models::{Album, Artist, Song, Songbook, Track};

    /// Plain in-memory graph for exercising the derivations without SQLite.
    /// Albums and tracks are returned in insertion order.
    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub(crate) songbooks: Vec<Songbook>,
        pub(crate) albums: Vec<Album>,
        pub(crate) tracks: Vec<Track>,
        pub(crate) songs: HashMap<i64, Song>,
        pub(crate) artists: HashMap<i64, Artist>,
    }

    impl FakeCatalog {
        pub(crate) fn add_songbook(&mut self, id: i64, name: &str) {
            self.songbooks.push(Songbook {
                id,
                name: name.to_string(),
                description: None,
            });
        }

        pub(crate) fn add_album(&mut self, id: i64, songbook_id: i64, code: &str) {
            self.albums.push(Album {
                id,
                songbook_id,
                code: code.to_string(),
                name: format!("Album {code}"),
                publisher_id: 1,
                description: None,
            });
        }

        pub(crate) fn add_artist(&mut self, id: i64, first: Option<&str>, last: &str) {
            self.artists.insert(
                id,
                Artist {
                    id,
                    last_name: last.to_string(),
                    first_name: first.map(str::to_string),
                },
            );
        }

        pub(crate) fn add_song(&mut self, id: i64, title: &str, artist_id: i64) {
            self.songs.insert(
                id,
                Song {
                    id,
                    title: title.to_string(),
                    artist_id,
                },
            );
        }

        pub(crate) fn add_track(&mut self, id: i64, album_id: i64, code: &str, song_id: i64) {
            self.tracks.push(Track {
                id,
                album_id,
                code: code.to_string(),
                song_id,
            });
        }
    }

    impl Catalog for FakeCatalog {
        fn songbook(&self, id: i64) -> Result<Songbook> {
            self.songbooks
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("songbook {id} missing"))
        }

        fn albums_of_songbook(&self, songbook_id: i64) -> Result<Vec<Album>> {
            Ok(self
                .albums
                .iter()
                .filter(|a| a.songbook_id == songbook_id)
                .cloned()
                .collect())
        }

        fn tracks_of_album(&self, album_id: i64) -> Result<Vec<Track>> {
            Ok(self
                .tracks
                .iter()
                .filter(|t| t.album_id == album_id)
                .cloned()
                .collect())
        }

        fn song(&self, id: i64) -> Result<Song> {
            self.songs
                .get(&id)
                .cloned()
                .ok_or_else(|| anyhow!("song {id} missing"))
        }

        fn artist(&self, id: i64) -> Result<Artist> {
            self.artists
                .get(&id)
                .cloned()
                .ok_or_else(|| anyhow!("artist {id} missing"))
        }
    }
}
