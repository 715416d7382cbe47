//! Filename derivation from media titles.

/// Characters that are not allowed in file names on common platforms.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Separator between artist and song in conventional upload titles.
const ARTIST_SEPARATOR: &str = " - ";

/// Replaces every character that is invalid in a file name with `_`.
///
/// Sanitizing is idempotent: `sanitize_filename(&sanitize_filename(s)) == sanitize_filename(s)`.
///
/// ```
/// use ytgrab_types::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "AC_DC_ Live_");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Builds the sanitized file name `<title>.<extension>`.
#[must_use]
pub fn output_file_name(title: &str, extension: &str) -> String {
    sanitize_filename(&format!("{title}.{extension}"))
}

/// Splits a title of the form `"Artist - Song"` into its parts.
///
/// Only the first `" - "` is used as the separator. Titles without one yield
/// no artist and the title unchanged.
///
/// ```
/// use ytgrab_types::split_title;
///
/// assert_eq!(split_title("A - B - C"), (Some("A".to_string()), "B - C".to_string()));
/// assert_eq!(split_title("JustATitle"), (None, "JustATitle".to_string()));
/// ```
#[must_use]
pub fn split_title(title: &str) -> (Option<String>, String) {
    match title.split_once(ARTIST_SEPARATOR) {
        Some((artist, song)) => (Some(artist.trim().to_string()), song.trim().to_string()),
        None => (None, title.to_string()),
    }
}
