//! JSON bodies for third-party integration (jukebox front-ends,
//! search-as-you-type widgets). The shapes are stable: field names are
//! camelCase and every object carries its type and a detail URL.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{find_artists_by_name_contains, find_songs, SongFilter};
use crate::models::{Artist, SongEntry};

const ARTIST_OBJECT_TYPE: &str = "songbook.artist";
const SONG_OBJECT_TYPE: &str = "songbook.song";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistPayload {
    pub url: String,
    pub object_type: &'static str,
    pub id: i64,
    pub last_name: String,
    pub first_name: Option<String>,
    pub full_name: String,
}

impl From<&Artist> for ArtistPayload {
    fn from(artist: &Artist) -> Self {
        Self {
            url: format!("/songbook/artists/{}", artist.id),
            object_type: ARTIST_OBJECT_TYPE,
            id: artist.id,
            last_name: artist.last_name.clone(),
            first_name: artist.first_name.clone(),
            full_name: artist.full_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    pub url: String,
    pub object_type: &'static str,
    pub id: i64,
    pub title: String,
    /// The artist's full name.
    pub artist: String,
}

impl From<&SongEntry> for SongPayload {
    fn from(entry: &SongEntry) -> Self {
        Self {
            url: format!("/songbook/songs/{}", entry.song.id),
            object_type: SONG_OBJECT_TYPE,
            id: entry.song.id,
            title: entry.song.title.clone(),
            artist: entry.artist.full_name(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArtistList {
    artists: Vec<ArtistPayload>,
}

#[derive(Debug, Serialize)]
struct SongList {
    songs: Vec<SongPayload>,
}

/// `{"artists": [...]}` for artists whose full name contains `name_contains`.
pub fn artists_json(conn: &Connection, name_contains: &str, limit: usize) -> Result<String> {
    let artists = find_artists_by_name_contains(conn, name_contains, limit)?;
    let body = ArtistList {
        artists: artists.iter().map(ArtistPayload::from).collect(),
    };
    serde_json::to_string(&body).context("failed to serialize artists")
}

/// `{"songs": [...]}` for songs matching `filter`.
pub fn songs_json(conn: &Connection, filter: &SongFilter, limit: usize) -> Result<String> {
    let songs = find_songs(conn, filter, limit)?;
    let body = SongList {
        songs: songs.iter().map(SongPayload::from).collect(),
    };
    serde_json::to_string(&body).context("failed to serialize songs")
}
