//! Domain records that mirror the SQLite catalog schema. They stay plain data
//! holders: derived names come from [`crate::names`] and are recomputed on
//! every call instead of being stored alongside the row.

use std::fmt;

use crate::names;

/// A record label. The short `code` is what ends up in exported track titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    /// Unique, at most four characters.
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Top-level collection of albums, for example one venue's karaoke catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Songbook {
    pub id: i64,
    /// Unique across all songbooks.
    pub name: String,
    pub description: Option<String>,
}

impl fmt::Display for Songbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A set of tracks published under one publisher inside one songbook. The
/// `(songbook_id, code)` pair is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub songbook_id: i64,
    pub code: String,
    pub name: String,
    pub publisher_id: i64,
    pub description: Option<String>,
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.name)
    }
}

/// A performer. Only the last name is required; `(last_name, first_name)` is
/// unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub last_name: String,
    pub first_name: Option<String>,
}

impl Artist {
    /// `"First Last"` for listings.
    pub fn full_name(&self) -> String {
        names::full_name(self.first_name.as_deref(), &self.last_name)
    }

    /// `"Last, First"` for sorting and grouping.
    pub fn rev_name(&self) -> String {
        names::rev_name(self.first_name.as_deref(), &self.last_name)
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A song title as performed by one artist. `(title, artist_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
}

impl Song {
    /// `"Title | Artist Name"`. The caller supplies the artist because songs
    /// only carry the foreign key.
    pub fn label(&self, artist: &Artist) -> String {
        names::song_label(&self.title, &artist.full_name())
    }
}

/// A song loaded together with its artist, the shape most listings need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEntry {
    pub song: Song,
    pub artist: Artist,
}

impl SongEntry {
    pub fn label(&self) -> String {
        self.song.label(&self.artist)
    }
}

/// Placement of a song on an album under a slot code (for example a jukebox
/// number). `(album_id, code)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: i64,
    pub album_id: i64,
    pub code: String,
    pub song_id: i64,
}
