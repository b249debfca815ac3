//! Fuzzy matching utilities for recent files
//!
//! Resolves a spoken file reference ("open quarterly report") against the
//! recent files list using tiered scores rather than edit distance, so a
//! spoken name that exactly names a file always wins.

use crate::recents::RecentFileEntry;
use std::cmp::Ordering;

/// Exact name, with or without extension
pub const SCORE_EXACT: u32 = 100;
/// Name starts with the query
pub const SCORE_PREFIX: u32 = 80;
/// Query starts at a word boundary inside the name
pub const SCORE_WORD: u32 = 60;
/// Query appears anywhere in the name
pub const SCORE_SUBSTRING: u32 = 40;
/// Every query word appears somewhere in the name
pub const SCORE_ALL_WORDS: u32 = 20;

/// A recent file matched against a query
#[derive(Debug, Clone, PartialEq)]
pub struct FileMatch {
    pub entry: RecentFileEntry,
    pub score: u32,
}

/// Normalize text for matching: lowercase, collapse whitespace
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip a trailing file extension ("report.pdf" -> "report")
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() && !name[idx + 1..].contains(' ') => {
            &name[..idx]
        }
        _ => name,
    }
}

/// Split a file name into words on any non-alphanumeric delimiter
fn name_words(name: &str) -> Vec<&str> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Score a file name against a query; `None` means no match
pub fn score(query: &str, file_name: &str) -> Option<u32> {
    let query = normalize_text(query);
    if query.is_empty() {
        return None;
    }

    let full = normalize_text(file_name);
    let stem = strip_extension(&full);

    if query == full || query == stem {
        return Some(SCORE_EXACT);
    }

    if stem.starts_with(&query) {
        return Some(SCORE_PREFIX);
    }

    let words = name_words(stem);
    let query_words = name_words(&query);
    let spoken = query_words.join(" ");
    if !spoken.is_empty()
        && (0..words.len()).any(|i| words[i..].join(" ").starts_with(&spoken))
    {
        return Some(SCORE_WORD);
    }

    if stem.contains(&query) {
        return Some(SCORE_SUBSTRING);
    }

    if query.split_whitespace().all(|w| stem.contains(w)) {
        return Some(SCORE_ALL_WORDS);
    }

    None
}

/// Rank entries against a query.
///
/// Higher scores first; equal scores put the most recently opened first.
/// Entries that don't match at all are left out.
pub fn search(query: &str, entries: &[RecentFileEntry]) -> Vec<FileMatch> {
    let mut matches: Vec<FileMatch> = entries
        .iter()
        .filter_map(|entry| {
            score(query, &entry.name).map(|score| FileMatch {
                entry: entry.clone(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => b.entry.opened_at.cmp(&a.entry.opened_at),
        other => other,
    });

    matches
}

/// Find the best match for a query, if any entry matches
pub fn best_match(query: &str, entries: &[RecentFileEntry]) -> Option<RecentFileEntry> {
    search(query, entries).into_iter().next().map(|m| m.entry)
}
