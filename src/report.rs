//! "Songs by artist" report: for each songbook, artists in reversed-name order
//! with their distinct song titles underneath. The grouping is rebuilt from
//! the live graph every time the report is requested.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::db::Catalog;
use crate::models::Songbook;
use crate::rollup::walk_songbook;

/// One artist heading and the titles listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSongs {
    pub rev_name: String,
    pub songs: Vec<String>,
}

/// The report section for a single songbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongbookReport {
    pub songbook: Songbook,
    pub artists: Vec<ArtistSongs>,
}

/// Group one songbook's songs by artist. Titles are deduplicated per artist
/// (the first song seen stands in for the title) and both levels are sorted by
/// code point.
pub fn group_by_artist<C: Catalog + ?Sized>(catalog: &C, songbook_id: i64) -> Result<Vec<ArtistSongs>> {
    let mut grouped: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();

    for entry in walk_songbook(catalog, songbook_id)? {
        grouped
            .entry(entry.artist.rev_name())
            .or_default()
            .entry(entry.song.title)
            .or_insert(entry.song.id);
    }

    Ok(grouped
        .into_iter()
        .map(|(rev_name, titles)| ArtistSongs {
            rev_name,
            songs: titles.into_keys().collect(),
        })
        .collect())
}

/// Build the report for each requested songbook, in the order given.
pub fn songs_by_artist_report<C: Catalog + ?Sized>(
    catalog: &C,
    songbook_ids: &[i64],
) -> Result<Vec<SongbookReport>> {
    songbook_ids
        .iter()
        .map(|&id| -> Result<SongbookReport> {
            Ok(SongbookReport {
                songbook: catalog.songbook(id)?,
                artists: group_by_artist(catalog, id)?,
            })
        })
        .collect()
}

/// Plain-text rendering for printing: the songbook name, then each artist
/// followed by their titles indented beneath.
pub fn render_text(reports: &[SongbookReport]) -> String {
    let mut out = String::new();
    for (idx, report) in reports.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let name = &report.songbook.name;
        out.push_str(name);
        out.push('\n');
        out.push_str(&"=".repeat(name.chars().count()));
        out.push('\n');
        if report.artists.is_empty() {
            out.push_str("(no songs)\n");
            continue;
        }
        for artist in &report.artists {
            out.push_str(&artist.rev_name);
            out.push('\n');
            for title in &artist.songs {
                out.push_str(&format!("    {title}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::fake::FakeCatalog;

    fn catalog() -> FakeCatalog {
        let mut catalog = FakeCatalog::default();
        catalog.add_songbook(1, "Friday");
        catalog.add_songbook(2, "Empty");
        catalog.add_album(10, 1, "A1");
        catalog.add_album(11, 1, "A2");
        catalog.add_artist(100, Some("Zoe"), "Zed");
        catalog.add_artist(101, Some("Amy"), "Adams");
        catalog.add_song(1000, "Zulu", 101);
        catalog.add_song(1001, "Alpha", 101);
        catalog.add_song(1002, "Mid", 100);
        catalog.add_track(1, 10, "001", 1000);
        catalog.add_track(2, 10, "002", 1002);
        catalog.add_track(3, 11, "001", 1001);
        catalog.add_track(4, 11, "002", 1000);
        catalog
    }

    #[test]
    fn artists_and_titles_are_sorted_and_deduplicated() {
        let catalog = catalog();
        let grouped = group_by_artist(&catalog, 1).unwrap();

        assert_eq!(
            grouped,
            vec![
                ArtistSongs {
                    rev_name: "Adams, Amy".to_string(),
                    songs: vec!["Alpha".to_string(), "Zulu".to_string()],
                },
                ArtistSongs {
                    rev_name: "Zed, Zoe".to_string(),
                    songs: vec!["Mid".to_string()],
                },
            ]
        );
    }

    #[test]
    fn same_title_under_one_artist_is_listed_once() {
        let mut catalog = FakeCatalog::default();
        catalog.add_songbook(1, "Book");
        catalog.add_album(10, 1, "A1");
        // Two artist records that share a reversed name collapse into one
        // heading, and their identical titles into one line.
        catalog.add_artist(100, None, "Band");
        catalog.add_artist(101, Some(""), "Band");
        catalog.add_song(1000, "Hit", 100);
        catalog.add_song(1001, "Hit", 101);
        catalog.add_track(1, 10, "001", 1000);
        catalog.add_track(2, 10, "002", 1001);

        let grouped = group_by_artist(&catalog, 1).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].songs, ["Hit"]);
    }

    #[test]
    fn report_keeps_requested_songbook_order() {
        let catalog = catalog();
        let reports = songs_by_artist_report(&catalog, &[2, 1]).unwrap();

        assert_eq!(reports[0].songbook.name, "Empty");
        assert!(reports[0].artists.is_empty());
        assert_eq!(reports[1].songbook.name, "Friday");
        assert_eq!(reports[1].artists.len(), 2);
    }

    #[test]
    fn text_rendering_indents_titles_under_artists() {
        let catalog = catalog();
        let reports = songs_by_artist_report(&catalog, &[1, 2]).unwrap();

        assert_eq!(
            render_text(&reports),
            "Friday\n======\nAdams, Amy\n    Alpha\n    Zulu\nZed, Zoe\n    Mid\n\
             \nEmpty\n=====\n(no songs)\n"
        );
    }
}
