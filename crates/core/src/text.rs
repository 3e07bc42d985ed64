//! Small text helpers shared by the extractors.
//!
//! Covers file-name titles, entry-name numbering, fragment joining, and
//! A1-style cell references.

use regex::Regex;
use std::sync::LazyLock;

/// Matches embedded raster image file names, case-insensitively.
static IMAGE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^image[^/]*\.(png|jpe?g|gif)$").unwrap());

/// Matches a column-letter key of a row mapping.
static COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]+$").unwrap());

/// Document title derived from an uploaded file name: base name without
/// directories or extension.
pub fn title_from_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// Parse the number of an entry like `ppt/slides/slide12.xml` given its
/// directory and file-name prefix. Returns `None` for anything else,
/// including relationship parts such as `ppt/slides/_rels/slide1.xml.rels`.
pub fn numbered_entry(entry: &str, dir: &str, prefix: &str) -> Option<usize> {
    let name = entry.strip_prefix(dir)?.strip_prefix('/')?;
    let digits = name.strip_prefix(prefix)?.strip_suffix(".xml")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether a container entry is an embedded raster image
/// (`image*.png`, `.jpg`, `.jpeg`, `.gif`, any case) under `media_dir`.
pub fn is_image_entry(entry: &str, media_dir: &str) -> bool {
    entry
        .strip_prefix(media_dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| IMAGE_NAME_REGEX.is_match(name))
}

/// Join non-empty text fragments with single spaces.
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for fragment in fragments {
        let fragment = fragment.as_ref();
        if fragment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(fragment);
    }
    joined
}

/// Column letters of an A1-style cell reference (`"AB12"` -> `"AB"`).
///
/// Returns `None` when what remains after stripping digits is not a run of
/// upper-case letters.
pub fn column_of(reference: &str) -> Option<String> {
    let letters: String = reference.chars().filter(|c| !c.is_ascii_digit()).collect();
    if COLUMN_REGEX.is_match(&letters) {
        Some(letters)
    } else {
        None
    }
}

/// Whether `key` is a valid column-letter key.
pub fn is_column(key: &str) -> bool {
    COLUMN_REGEX.is_match(key)
}
