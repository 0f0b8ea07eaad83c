//! Core library surface for the songbook manager: the SQLite-backed catalog,
//! the derived song listings and report, the track exporter, and the terminal
//! UI. The `songbook` binary and the integration tests build on the same
//! pieces.
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod names;
pub mod report;
pub mod rollup;
pub mod ui;

/// Persistence entry points used by `main.rs` to open the catalog and preload
/// the songbook list.
pub use db::{ensure_schema, fetch_songbooks, Catalog};

pub use config::AppConfig;
pub use error::CatalogError;
pub use export::{export_tracks, TrackExport};
pub use models::{Album, Artist, Publisher, Song, SongEntry, Songbook, Track};
pub use report::{render_text, songs_by_artist_report};
pub use rollup::{resolve_songs, songs_by_artist, songs_by_title};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
