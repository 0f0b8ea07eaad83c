//! Binary entry point. Without a subcommand the terminal UI starts; the
//! subcommands cover exporting, reporting, searching and data entry from
//! scripts.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;
use tracing::info;

use songbook_manager::api::{artists_json, songs_json};
use songbook_manager::db::{
    create_album, create_artist, create_publisher, create_song, create_songbook, create_track,
    NewAlbum, SongFilter, DEFAULT_SEARCH_LIMIT,
};
use songbook_manager::{
    ensure_schema, export_tracks, fetch_songbooks, logging, render_text, resolve_songs,
    run_app, songs_by_artist, songs_by_artist_report, songs_by_title, App, AppConfig,
};

#[derive(Parser)]
#[command(name = "songbook")]
#[command(about = "Keep a songbook catalog and export its tracks")]
struct Cli {
    /// Use this database file instead of the one in the data directory
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the tracks of one or more songbooks as a pipe-delimited file
    Export {
        /// Songbook ids to include
        #[arg(short, long = "songbook", required = true)]
        songbooks: Vec<i64>,

        /// Write here instead of the export directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the songs-by-artist report for one or more songbooks
    Report {
        /// Songbook ids to include
        #[arg(short, long = "songbook", required = true)]
        songbooks: Vec<i64>,
    },
    /// List a songbook's distinct songs
    Songs {
        /// Songbook id
        #[arg(short, long)]
        songbook: i64,

        /// Order by "Last, First | Title" instead of "Title | Artist"
        #[arg(long)]
        by_artist: bool,
    },
    /// Look up artists by name fragment and print them as JSON
    SearchArtists {
        #[arg(long, default_value = "")]
        name_contains: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Look up songs by title and artist fragments and print them as JSON
    SearchSongs {
        #[arg(long, default_value = "")]
        title_starts_with: String,

        #[arg(long, default_value = "")]
        title_contains: String,

        #[arg(long, default_value = "")]
        artist_contains: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Add a record to the catalog
    #[command(subcommand)]
    Add(AddCommand),
}

#[derive(Subcommand)]
enum AddCommand {
    Publisher {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Songbook {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Album(AlbumArgs),
    Artist {
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        first_name: Option<String>,
    },
    Song {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: i64,
    },
    Track {
        #[arg(long)]
        album: i64,
        #[arg(long)]
        code: String,
        #[arg(long)]
        song: i64,
    },
}

#[derive(Args)]
struct AlbumArgs {
    #[arg(long)]
    songbook: i64,
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    publisher: i64,
    #[arg(long)]
    description: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::resolve()?;
    if let Some(db) = &cli.db {
        config = config.with_db_path(db);
    }
    config.ensure_dirs()?;

    let Some(command) = cli.command else {
        logging::init_file(&config.log_path)?;
        let conn = ensure_schema(&config.db_path)?;
        let songbooks = fetch_songbooks(&conn)?;
        let mut app = App::new(conn, &config, songbooks);
        return run_app(&mut app);
    };

    logging::init_stderr();
    let conn = ensure_schema(&config.db_path)?;
    info!(db = %config.db_path.display(), "opened catalog");
    run_command(&conn, &config, command)
}

fn run_command(conn: &Connection, config: &AppConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Export { songbooks, output } => {
            let mut export = export_tracks(conn, &songbooks)?;
            let path = match output {
                Some(path) => export.write_to(&path)?,
                None => export.write_into(&config.export_dir)?,
            };
            println!("{}", path.display());
        }
        Commands::Report { songbooks } => {
            let reports = songs_by_artist_report(conn, &songbooks)?;
            print!("{}", render_text(&reports));
        }
        Commands::Songs {
            songbook,
            by_artist,
        } => {
            let ids = if by_artist {
                songs_by_artist(conn, songbook)?
            } else {
                songs_by_title(conn, songbook)?
            };
            for entry in resolve_songs(conn, &ids)? {
                println!("{}", entry.label());
            }
        }
        Commands::SearchArtists {
            name_contains,
            limit,
        } => println!("{}", artists_json(conn, &name_contains, limit)?),
        Commands::SearchSongs {
            title_starts_with,
            title_contains,
            artist_contains,
            limit,
        } => {
            let filter = SongFilter {
                title_starts_with,
                title_contains,
                artist_contains,
            };
            println!("{}", songs_json(conn, &filter, limit)?);
        }
        Commands::Add(add) => run_add(conn, add)?,
    }
    Ok(())
}

/// Insert one record and print its new id.
fn run_add(conn: &Connection, add: AddCommand) -> Result<()> {
    let id = match add {
        AddCommand::Publisher {
            code,
            name,
            description,
        } => create_publisher(conn, &code, &name, description.as_deref())?.id,
        AddCommand::Songbook { name, description } => {
            create_songbook(conn, &name, description.as_deref())?.id
        }
        AddCommand::Album(album) => {
            create_album(
                conn,
                &NewAlbum {
                    songbook_id: album.songbook,
                    code: &album.code,
                    name: &album.name,
                    publisher_id: album.publisher,
                    description: album.description.as_deref(),
                },
            )?
            .id
        }
        AddCommand::Artist {
            last_name,
            first_name,
        } => create_artist(conn, &last_name, first_name.as_deref())?.id,
        AddCommand::Song { title, artist } => create_song(conn, &title, artist)?.id,
        AddCommand::Track { album, code, song } => create_track(conn, album, &code, song)?.id,
    };
    println!("{id}");
    Ok(())
}
