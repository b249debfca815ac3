//! Spoken Number Resolution
//!
//! Turns a single spoken token ("three", "3", "third", "3rd") into an
//! integer and expands spoken page ranges into clamped page sets.

use std::collections::BTreeSet;

/// Cardinal number words
const CARDINALS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    // "pages one to a hundred" is how people say "to the end"
    ("hundred", 100),
];

/// Ordinal number words
const ORDINALS: &[(&str, u32)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
    ("twentieth", 20),
];

/// Resolve a spoken token to a number.
///
/// Accepts digits ("12"), digit ordinals ("12th"), and cardinal or ordinal
/// words from one through twenty.
pub fn resolve_number(token: &str) -> Option<u32> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    if let Ok(num) = token.parse::<u32>() {
        return Some(num);
    }

    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = token.strip_suffix(suffix) {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits.parse().ok();
            }
        }
    }

    CARDINALS
        .iter()
        .chain(ORDINALS)
        .find(|(word, _)| *word == token)
        .map(|(_, num)| *num)
}

/// Expand an inclusive spoken range into page numbers.
///
/// Returns `None` when `start > end` as spoken. Otherwise the endpoints are
/// clamped to `[1, page_count]`, which may leave an empty set (e.g. a
/// range that begins past the last page).
pub fn expand_range(start: u32, end: u32, page_count: u32) -> Option<BTreeSet<u32>> {
    if start > end {
        return None;
    }

    let low = start.max(1);
    let high = end.min(page_count);
    Some((low..=high).collect())
}

/// Every page of the document
pub fn all_pages(page_count: u32) -> BTreeSet<u32> {
    (1..=page_count).collect()
}

/// Odd page numbers (1-indexed)
pub fn odd_pages(page_count: u32) -> BTreeSet<u32> {
    (1..=page_count).filter(|p| p % 2 == 1).collect()
}

/// Even page numbers (1-indexed)
pub fn even_pages(page_count: u32) -> BTreeSet<u32> {
    (1..=page_count).filter(|p| p % 2 == 0).collect()
}

/// Whether `page` exists in a document of `page_count` pages
pub fn in_bounds(page: u32, page_count: u32) -> bool {
    (1..=page_count).contains(&page)
}
