use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{paginate_artists, paginate_songs, Page, SongFilter, PAGE_SIZE};
use crate::models::{Artist, SongEntry, Songbook};
use crate::report::{group_by_artist, ArtistSongs};
use crate::rollup::{artist_key, resolve_songs, songs_by_artist, songs_by_title};

use super::helpers::{move_index, pointer};

/// Which derived listing the songbook detail shows.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum SongbookView {
    ByTitle,
    ByArtist,
    Report,
}

impl SongbookView {
    pub(crate) fn next(self) -> Self {
        match self {
            SongbookView::ByTitle => SongbookView::ByArtist,
            SongbookView::ByArtist => SongbookView::Report,
            SongbookView::Report => SongbookView::ByTitle,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            SongbookView::ByTitle => "Songs by Title",
            SongbookView::ByArtist => "Songs by Artist",
            SongbookView::Report => "Report by Artist",
        }
    }
}

/// Detail view of one songbook. The rollups are recomputed whenever the
/// screen is (re)loaded.
pub(crate) struct SongbookScreen {
    pub(crate) songbook: Songbook,
    pub(crate) view: SongbookView,
    pub(crate) by_title: Vec<SongEntry>,
    pub(crate) by_artist: Vec<SongEntry>,
    pub(crate) report: Vec<ArtistSongs>,
    pub(crate) selected: usize,
}

impl SongbookScreen {
    pub(crate) fn load(conn: &Connection, songbook: Songbook) -> Result<Self> {
        let by_title = resolve_songs(conn, &songs_by_title(conn, songbook.id)?)
            .context("failed to load songs by title")?;
        let by_artist = resolve_songs(conn, &songs_by_artist(conn, songbook.id)?)
            .context("failed to load songs by artist")?;
        let report = group_by_artist(conn, songbook.id)?;

        Ok(Self {
            songbook,
            view: SongbookView::ByTitle,
            by_title,
            by_artist,
            report,
            selected: 0,
        })
    }

    pub(crate) fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.selected = 0;
    }

    pub(crate) fn song_count(&self) -> usize {
        self.by_title.len()
    }

    /// Rows of the current view, without selection markers.
    pub(crate) fn rows(&self) -> Vec<String> {
        match self.view {
            SongbookView::ByTitle => self.by_title.iter().map(SongEntry::label).collect(),
            SongbookView::ByArtist => self.by_artist.iter().map(artist_key).collect(),
            SongbookView::Report => {
                let mut rows = Vec::new();
                for artist in &self.report {
                    rows.push(artist.rev_name.clone());
                    rows.extend(artist.songs.iter().map(|title| format!("    {title}")));
                }
                rows
            }
        }
    }

    pub(crate) fn display_lines(&self) -> Vec<String> {
        self.rows()
            .into_iter()
            .enumerate()
            .map(|(idx, row)| format!("{}{row}", pointer(idx == self.selected)))
            .collect()
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, self.rows().len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows().len().saturating_sub(1);
    }

    /// First row to draw so the selection stays visible in `height` rows.
    pub(crate) fn scroll_offset(&self, height: usize) -> usize {
        if height == 0 || self.selected < height {
            0
        } else {
            self.selected + 1 - height
        }
    }
}

/// Paginated song lookup with title and artist filters.
pub(crate) struct SongSearchScreen {
    pub(crate) filter: SongFilter,
    pub(crate) page: Page<SongEntry>,
    pub(crate) selected: usize,
}

impl SongSearchScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let filter = SongFilter::default();
        let page = paginate_songs(conn, &filter, 1)?;
        Ok(Self {
            filter,
            page,
            selected: 0,
        })
    }

    pub(crate) fn reload(&mut self, conn: &Connection, page: usize) -> Result<()> {
        self.page = paginate_songs(conn, &self.filter, page)?;
        self.selected = move_index(self.selected, self.page.items.len(), 0);
        Ok(())
    }

    pub(crate) fn set_title_filter(&mut self, conn: &Connection, query: &str) -> Result<()> {
        self.filter.title_contains = query.to_string();
        self.selected = 0;
        self.reload(conn, 1)
    }

    pub(crate) fn set_artist_filter(&mut self, conn: &Connection, query: &str) -> Result<()> {
        self.filter.artist_contains = query.to_string();
        self.selected = 0;
        self.reload(conn, 1)
    }

    pub(crate) fn next_page(&mut self, conn: &Connection) -> Result<bool> {
        if !self.page.has_next() {
            return Ok(false);
        }
        self.selected = 0;
        self.reload(conn, self.page.page + 1)?;
        Ok(true)
    }

    pub(crate) fn prev_page(&mut self, conn: &Connection) -> Result<bool> {
        if !self.page.has_prev() {
            return Ok(false);
        }
        self.selected = 0;
        self.reload(conn, self.page.page - 1)?;
        Ok(true)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, self.page.items.len(), offset);
    }

    pub(crate) fn current(&self) -> Option<&SongEntry> {
        self.page.items.get(self.selected)
    }
}

/// Paginated artist lookup by name fragment.
pub(crate) struct ArtistSearchScreen {
    pub(crate) query: String,
    pub(crate) page: Page<Artist>,
    pub(crate) selected: usize,
}

impl ArtistSearchScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            query: String::new(),
            page: paginate_artists(conn, "", 1)?,
            selected: 0,
        })
    }

    pub(crate) fn reload(&mut self, conn: &Connection, page: usize) -> Result<()> {
        self.page = paginate_artists(conn, &self.query, page)?;
        self.selected = move_index(self.selected, self.page.items.len(), 0);
        Ok(())
    }

    pub(crate) fn set_query(&mut self, conn: &Connection, query: &str) -> Result<()> {
        self.query = query.to_string();
        self.selected = 0;
        self.reload(conn, 1)
    }

    pub(crate) fn next_page(&mut self, conn: &Connection) -> Result<bool> {
        if !self.page.has_next() {
            return Ok(false);
        }
        self.selected = 0;
        self.reload(conn, self.page.page + 1)?;
        Ok(true)
    }

    pub(crate) fn prev_page(&mut self, conn: &Connection) -> Result<bool> {
        if !self.page.has_prev() {
            return Ok(false);
        }
        self.selected = 0;
        self.reload(conn, self.page.page - 1)?;
        Ok(true)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = move_index(self.selected, self.page.items.len(), offset);
    }
}

/// "page X of Y • N results" caption shared by the search screens.
pub(crate) fn page_caption<T>(page: &Page<T>) -> String {
    format!(
        "page {} of {}  •  {} results  •  {} per page",
        page.page,
        page.pages(),
        page.total,
        PAGE_SIZE
    )
}
