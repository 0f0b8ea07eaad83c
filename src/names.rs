//! Display-name derivations shared by every view of the catalog. These are
//! pure functions over already-loaded values so the same rules apply to
//! listings, sort keys and reports alike. Nothing here is ever persisted: the
//! names are recomputed from the current first/last name on every call.

/// Separator placed between a song title and its artist in labels and sort
/// keys.
pub const LABEL_SEPARATOR: &str = " | ";

/// `"First Last"`, or just the last name when there is no first name.
///
/// Stray spaces left behind by an empty part are stripped from both ends.
pub fn full_name(first_name: Option<&str>, last_name: &str) -> String {
    match first_name {
        None => last_name.to_string(),
        Some(first) => format!("{first} {last_name}").trim_matches(' ').to_string(),
    }
}

/// `"Last, First"`, the form used as a sort and grouping key.
///
/// An empty part never leaves a dangling comma: commas and spaces are stripped
/// from both ends of the joined string.
pub fn rev_name(first_name: Option<&str>, last_name: &str) -> String {
    match first_name {
        None => last_name.to_string(),
        Some(first) => format!("{last_name}, {first}")
            .trim_matches(|c| c == ',' || c == ' ')
            .to_string(),
    }
}

/// `"Title | Artist Name"`, skipping whichever part is empty.
pub fn song_label(title: &str, artist_full_name: &str) -> String {
    [title, artist_full_name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}
