//! Typed search queries behind the browse and lookup flows. Both sides of every
//! `LIKE` go through the `fold` function, so matching ignores case for any
//! script; the caller's text is dropped into the pattern as-is, so `%` and `_`
//! keep their wildcard meaning.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::models::{Artist, Song, SongEntry, Songbook};

use super::artists::artist_from_row;
use super::songbooks::songbook_from_row;

/// Result cap for the quick lookups used by search-as-you-type.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
/// Rows per page for the paginated listings.
pub const PAGE_SIZE: usize = 25;

/// Artist full name exactly as searched: no trimming, so a missing first name
/// leaves a leading space.
const ARTIST_FULL_NAME: &str = "(COALESCE(a.first_name, '') || ' ' || COALESCE(a.last_name, ''))";

/// One page of a larger result set. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Number of pages, never less than one so an empty listing still renders
    /// as "page 1 of 1".
    pub fn pages(&self) -> usize {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }
}

/// Filters for song lookups. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub title_starts_with: String,
    pub title_contains: String,
    pub artist_contains: String,
}

impl SongFilter {
    fn title_pattern(&self) -> String {
        format!("{}%{}%", self.title_starts_with, self.title_contains)
    }

    fn artist_pattern(&self) -> String {
        contains_pattern(&self.artist_contains)
    }
}

fn contains_pattern(value: &str) -> String {
    format!("%{value}%")
}

fn sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Clamp the requested page to at least 1 and compute its row offset.
fn page_window(page: usize) -> (usize, i64) {
    let page = page.max(1);
    (page, sql_count((page - 1) * PAGE_SIZE))
}

fn song_entry_from_row(row: &Row<'_>) -> rusqlite::Result<SongEntry> {
    Ok(SongEntry {
        song: Song {
            id: row.get(0)?,
            title: row.get(1)?,
            artist_id: row.get(2)?,
        },
        artist: Artist {
            id: row.get(2)?,
            last_name: row.get(3)?,
            first_name: row.get(4)?,
        },
    })
}

/// Artists whose full name contains `pattern`, at most `limit` of them.
pub fn find_artists_by_name_contains(
    conn: &Connection,
    pattern: &str,
    limit: usize,
) -> Result<Vec<Artist>> {
    let sql = format!(
        "SELECT a.id, a.last_name, a.first_name FROM artists a
         WHERE fold({ARTIST_FULL_NAME}) LIKE fold(?1)
         ORDER BY a.last_name, a.first_name
         LIMIT ?2"
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare artist search")?;

    let artists = stmt
        .query_map(
            params![contains_pattern(pattern), sql_count(limit)],
            artist_from_row,
        )
        .context("failed to run artist search")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect artist search results")?;

    Ok(artists)
}

pub fn paginate_artists(conn: &Connection, pattern: &str, page: usize) -> Result<Page<Artist>> {
    let (page, offset) = page_window(page);
    let pattern = contains_pattern(pattern);

    let total: i64 = conn
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM artists a WHERE fold({ARTIST_FULL_NAME}) LIKE fold(?1)"
            ),
            [&pattern],
            |row| row.get(0),
        )
        .context("failed to count artists")?;

    let sql = format!(
        "SELECT a.id, a.last_name, a.first_name FROM artists a
         WHERE fold({ARTIST_FULL_NAME}) LIKE fold(?1)
         ORDER BY a.last_name, a.first_name
         LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare artist page")?;
    let items = stmt
        .query_map(params![pattern, sql_count(PAGE_SIZE), offset], artist_from_row)
        .context("failed to load artist page")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect artist page")?;

    Ok(Page {
        items,
        page,
        per_page: PAGE_SIZE,
        total: usize::try_from(total).unwrap_or_default(),
    })
}

/// Songs matching `filter` with their artists, ordered by title.
pub fn find_songs(conn: &Connection, filter: &SongFilter, limit: usize) -> Result<Vec<SongEntry>> {
    let sql = format!(
        "SELECT s.id, s.title, s.artist_id, a.last_name, a.first_name
         FROM songs s
         INNER JOIN artists a ON a.id = s.artist_id
         WHERE fold(s.title) LIKE fold(?1) AND fold({ARTIST_FULL_NAME}) LIKE fold(?2)
         ORDER BY s.title, s.id
         LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql).context("failed to prepare song search")?;

    let songs = stmt
        .query_map(
            params![filter.title_pattern(), filter.artist_pattern(), sql_count(limit)],
            song_entry_from_row,
        )
        .context("failed to run song search")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect song search results")?;

    Ok(songs)
}

pub fn paginate_songs(conn: &Connection, filter: &SongFilter, page: usize) -> Result<Page<SongEntry>> {
    let (page, offset) = page_window(page);
    let title_pattern = filter.title_pattern();
    let artist_pattern = filter.artist_pattern();

    let total: i64 = conn
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM songs s
                 INNER JOIN artists a ON a.id = s.artist_id
                 WHERE fold(s.title) LIKE fold(?1) AND fold({ARTIST_FULL_NAME}) LIKE fold(?2)"
            ),
            params![title_pattern, artist_pattern],
            |row| row.get(0),
        )
        .context("failed to count songs")?;

    let sql = format!(
        "SELECT s.id, s.title, s.artist_id, a.last_name, a.first_name
         FROM songs s
         INNER JOIN artists a ON a.id = s.artist_id
         WHERE fold(s.title) LIKE fold(?1) AND fold({ARTIST_FULL_NAME}) LIKE fold(?2)
         ORDER BY s.title, s.id
         LIMIT ?3 OFFSET ?4"
    );
    let mut stmt = conn.prepare(&sql).context("failed to prepare song page")?;
    let items = stmt
        .query_map(
            params![title_pattern, artist_pattern, sql_count(PAGE_SIZE), offset],
            song_entry_from_row,
        )
        .context("failed to load song page")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect song page")?;

    Ok(Page {
        items,
        page,
        per_page: PAGE_SIZE,
        total: usize::try_from(total).unwrap_or_default(),
    })
}

pub fn find_songbooks_by_name_contains(conn: &Connection, pattern: &str) -> Result<Vec<Songbook>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description FROM songbooks
             WHERE fold(name) LIKE fold(?1)
             ORDER BY name",
        )
        .context("failed to prepare songbook search")?;

    let songbooks = stmt
        .query_map([contains_pattern(pattern)], songbook_from_row)
        .context("failed to run songbook search")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songbook search results")?;

    Ok(songbooks)
}

pub fn paginate_songbooks(conn: &Connection, pattern: &str, page: usize) -> Result<Page<Songbook>> {
    let (page, offset) = page_window(page);
    let pattern = contains_pattern(pattern);

    let total: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM songbooks WHERE fold(name) LIKE fold(?1)",
            [&pattern],
            |row| row.get(0),
        )
        .context("failed to count songbooks")?;

    let mut stmt = conn
        .prepare(
            "SELECT id, name, description FROM songbooks
             WHERE fold(name) LIKE fold(?1)
             ORDER BY name
             LIMIT ?2 OFFSET ?3",
        )
        .context("failed to prepare songbook page")?;
    let items = stmt
        .query_map(params![pattern, sql_count(PAGE_SIZE), offset], songbook_from_row)
        .context("failed to load songbook page")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songbook page")?;

    Ok(Page {
        items,
        page,
        per_page: PAGE_SIZE,
        total: usize::try_from(total).unwrap_or_default(),
    })
}
