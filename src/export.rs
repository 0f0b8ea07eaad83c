//! Pipe-delimited track export for jukebox import.
//!
//! One line per track of the selected songbooks, ordered by track code:
//!
//! ```text
//! 001|Tonight .PUB.|John Doe
//! ```
//!
//! Lines are joined with CRLF, there is no header and no trailing separator,
//! and fields are never quoted, so a `|` inside a title passes through
//! unescaped. The artist column is `first + " " + last` without trimming: a
//! missing first name leaves a leading space, which the importing system
//! relies on for column alignment.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

/// MIME type announced for the downloadable file.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const FIELD_SEPARATOR: char = '|';
const LINE_SEPARATOR: &str = "\r\n";

/// One exported track, already formatted column by column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub code: String,
    pub title_and_publisher: String,
    pub artist_fullname: String,
}

impl ExportRow {
    pub fn line(&self) -> String {
        format!(
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            self.code, self.title_and_publisher, self.artist_fullname
        )
    }
}

/// `"Title .CODE."`
fn title_and_publisher(title: &str, publisher_code: &str) -> String {
    format!("{title} .{publisher_code}.")
}

/// `"First Last"` with missing parts replaced by empty strings, untrimmed.
fn artist_fullname(first_name: Option<&str>, last_name: Option<&str>) -> String {
    format!("{} {}", first_name.unwrap_or(""), last_name.unwrap_or(""))
}

/// Join tracks with their album, publisher, song and artist for the given
/// songbooks and format each row. Rows come back in ascending code order; ties
/// between albums fall back to insertion order.
pub fn fetch_export_rows(conn: &Connection, songbook_ids: &[i64]) -> Result<Vec<ExportRow>> {
    if songbook_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; songbook_ids.len()].join(", ");
    let sql = format!(
        "SELECT t.code, s.title, p.code, a.first_name, a.last_name
         FROM tracks t
         INNER JOIN albums al ON al.id = t.album_id
         INNER JOIN publishers p ON p.id = al.publisher_id
         INNER JOIN songs s ON s.id = t.song_id
         INNER JOIN artists a ON a.id = s.artist_id
         WHERE al.songbook_id IN ({placeholders})
         ORDER BY t.code, t.id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare track export query")?;

    let rows = stmt
        .query_map(params_from_iter(songbook_ids.iter()), |row| {
            let code: String = row.get(0)?;
            let title: String = row.get(1)?;
            let publisher_code: String = row.get(2)?;
            let first_name: Option<String> = row.get(3)?;
            let last_name: Option<String> = row.get(4)?;
            Ok(ExportRow {
                code,
                title_and_publisher: title_and_publisher(&title, &publisher_code),
                artist_fullname: artist_fullname(first_name.as_deref(), last_name.as_deref()),
            })
        })
        .context("failed to run track export query")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect exported tracks")?;

    debug!(songbooks = ?songbook_ids, rows = rows.len(), "fetched export rows");
    Ok(rows)
}

/// Serialize rows into the UTF-8 file body.
pub fn render(rows: &[ExportRow]) -> Vec<u8> {
    rows.iter()
        .map(ExportRow::line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
        .into_bytes()
}

/// Selections larger than this are named by count instead of by id.
const FILENAME_MAX_IDS: usize = 4;

/// File name offered for an export of the given songbooks. Large selections
/// get `tracks-<n>-songbooks.txt` so the name stays within filesystem limits.
pub fn export_filename(songbook_ids: &[i64]) -> String {
    if songbook_ids.is_empty() {
        return "tracks.txt".to_string();
    }
    if songbook_ids.len() > FILENAME_MAX_IDS {
        return format!("tracks-{}-songbooks.txt", songbook_ids.len());
    }
    let ids = songbook_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("-");
    format!("tracks-{ids}.txt")
}

/// A finished export waiting to be delivered. The body is handed out once:
/// after [`TrackExport::take_file`] the export no longer holds the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackExport {
    file: Option<Vec<u8>>,
    filename: String,
    rows: usize,
}

impl TrackExport {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Hand the body over to the caller and clear it from the export.
    pub fn take_file(&mut self) -> Option<Vec<u8>> {
        self.file.take()
    }

    /// Deliver the body by writing it to `path`.
    pub fn write_to(&mut self, path: &Path) -> Result<PathBuf> {
        let body = self
            .take_file()
            .ok_or_else(|| anyhow!("export file was already delivered"))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create export directory")?;
            }
        }
        fs::write(path, &body)
            .with_context(|| format!("failed to write export to {}", path.display()))?;
        info!(path = %path.display(), bytes = body.len(), "wrote track export");
        Ok(path.to_path_buf())
    }

    /// Deliver the body into `dir` under the export's own file name.
    pub fn write_into(&mut self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        self.write_to(&path)
    }
}

/// Export every track of the selected songbooks. An empty selection produces
/// an empty file rather than an error.
pub fn export_tracks(conn: &Connection, songbook_ids: &[i64]) -> Result<TrackExport> {
    let rows = fetch_export_rows(conn, songbook_ids)?;
    info!(songbooks = ?songbook_ids, rows = rows.len(), "exported tracks");
    Ok(TrackExport {
        file: Some(render(&rows)),
        filename: export_filename(songbook_ids),
        rows: rows.len(),
    })
}
