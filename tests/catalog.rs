use std::fs;

use rusqlite::Connection;
use serde_json::Value;
use tempfile::tempdir;

use songbook_manager::db::{
    create_album, create_artist, create_publisher, create_song, create_songbook, create_track,
    delete_publisher, fetch_songbook, NewAlbum,
};
use songbook_manager::{
    ensure_schema, export_tracks, render_text, resolve_songs, songs_by_artist,
    songs_by_artist_report, songs_by_title, AppConfig, CatalogError,
};

struct Seeded {
    friday: i64,
    saturday: i64,
}

/// Two songbooks sharing one publisher. Friday carries three tracks across two
/// albums, Saturday a single one.
fn seed(conn: &Connection) -> Seeded {
    let publisher = create_publisher(conn, "PUB", "Publisher", None).unwrap();
    let friday = create_songbook(conn, "Friday", None).unwrap();
    let saturday = create_songbook(conn, "Saturday", Some("Late set")).unwrap();

    let album = |songbook_id, code| {
        create_album(
            conn,
            &NewAlbum {
                songbook_id,
                code,
                name: "Album",
                publisher_id: publisher.id,
                description: None,
            },
        )
        .unwrap()
    };
    let a1 = album(friday.id, "A1");
    let a2 = album(friday.id, "A2");
    let s1 = album(saturday.id, "S1");

    let doe = create_artist(conn, "Doe", Some("John")).unwrap();
    let band = create_artist(conn, "Band", None).unwrap();
    let tonight = create_song(conn, "Tonight", doe.id).unwrap();
    let anthem = create_song(conn, "Anthem", band.id).unwrap();

    create_track(conn, a2.id, "010", anthem.id).unwrap();
    create_track(conn, a1.id, "002", anthem.id).unwrap();
    create_track(conn, a1.id, "001", tonight.id).unwrap();
    create_track(conn, s1.id, "005", tonight.id).unwrap();

    Seeded {
        friday: friday.id,
        saturday: saturday.id,
    }
}

#[test]
fn catalog_survives_reopening_the_database_file() {
    let dir = tempdir().unwrap();
    let config = AppConfig::with_data_dir(dir.path().join("data"));
    config.ensure_dirs().unwrap();

    let friday = {
        let conn = ensure_schema(&config.db_path).unwrap();
        seed(&conn).friday
    };

    let conn = ensure_schema(&config.db_path).unwrap();
    assert_eq!(fetch_songbook(&conn, friday).unwrap().name, "Friday");
    assert_eq!(songs_by_title(&conn, friday).unwrap().len(), 2);
}

#[test]
fn export_file_lands_in_the_export_directory() {
    let dir = tempdir().unwrap();
    let config = AppConfig::with_data_dir(dir.path());
    config.ensure_dirs().unwrap();
    let conn = ensure_schema(&config.db_path).unwrap();
    let seeded = seed(&conn);

    let mut export = export_tracks(&conn, &[seeded.friday, seeded.saturday]).unwrap();
    assert_eq!(export.row_count(), 4);
    let path = export.write_into(&config.export_dir).unwrap();

    assert_eq!(path.file_name().unwrap(), export.filename());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "001|Tonight .PUB.|John Doe\r\n\
         002|Anthem .PUB.| Band\r\n\
         005|Tonight .PUB.|John Doe\r\n\
         010|Anthem .PUB.| Band"
    );
    assert!(export.take_file().is_none());
}

#[test]
fn rollups_and_report_agree_on_the_same_catalog() {
    let dir = tempdir().unwrap();
    let conn = ensure_schema(&dir.path().join("songbook.sqlite")).unwrap();
    let seeded = seed(&conn);

    let by_title: Vec<String> = resolve_songs(&conn, &songs_by_title(&conn, seeded.friday).unwrap())
        .unwrap()
        .iter()
        .map(|entry| entry.label())
        .collect();
    assert_eq!(by_title, ["Anthem | Band", "Tonight | John Doe"]);

    let by_artist = songs_by_artist(&conn, seeded.friday).unwrap();
    assert_eq!(by_artist.len(), 2);

    let reports = songs_by_artist_report(&conn, &[seeded.friday]).unwrap();
    assert_eq!(
        render_text(&reports),
        "Friday\n======\nBand\n    Anthem\nDoe, John\n    Tonight\n"
    );
}

#[test]
fn referenced_publisher_cannot_be_deleted() {
    let dir = tempdir().unwrap();
    let conn = ensure_schema(&dir.path().join("songbook.sqlite")).unwrap();
    seed(&conn);

    let err = delete_publisher(&conn, 1).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CatalogError>(),
        Some(CatalogError::InUse { .. })
    ));
}

#[test]
fn search_json_is_limited_and_camel_cased() {
    let dir = tempdir().unwrap();
    let conn = ensure_schema(&dir.path().join("songbook.sqlite")).unwrap();
    seed(&conn);

    let body = songbook_manager::api::artists_json(&conn, "doe", 5).unwrap();
    let value: Value = serde_json::from_str(&body).unwrap();
    let artists = value["artists"].as_array().unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0]["fullName"], "John Doe");
    assert_eq!(artists[0]["objectType"], "songbook.artist");

    let body = songbook_manager::api::artists_json(&conn, "", 1).unwrap();
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["artists"].as_array().unwrap().len(), 1);
}
