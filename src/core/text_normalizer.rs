//! Text Normalization
//!
//! Cleans up raw transcripts before command matching: case, punctuation,
//! whitespace, conversational filler and common mishearings.

use std::collections::HashMap;

/// Fillers dropped from the front of an utterance, repeatedly
const LEADING_FILLERS: &[&str] = &["um", "uh", "ok", "okay", "hey", "please", "so", "and"];

/// Words dropped wherever they appear
const ARTICLES: &[&str] = &["the", "a", "an"];

/// Normalizes spoken text to fix common recognition errors
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    /// Whole-phrase corrections from config, keyed lowercase
    corrections: Vec<(Vec<String>, Vec<String>)>,
}

impl TextNormalizer {
    /// Create a new text normalizer
    pub fn new(corrections: &HashMap<String, String>) -> Self {
        let mut corrections: Vec<(Vec<String>, Vec<String>)> = corrections
            .iter()
            .map(|(from, to)| (words_of(from), words_of(to)))
            .filter(|(from, _)| !from.is_empty())
            .collect();

        // Longest phrase first so "safe as" wins over "safe"
        corrections.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { corrections }
    }

    /// Normalize text with corrections and common fixes
    pub fn normalize(&self, text: &str) -> String {
        let mut words = words_of(text);

        words.retain(|w| !ARTICLES.contains(&w.as_str()));

        let leading = words
            .iter()
            .take_while(|w| LEADING_FILLERS.contains(&w.as_str()))
            .count();
        words.drain(..leading);

        if words.last().map(String::as_str) == Some("please") {
            words.pop();
        }

        self.apply_corrections(words).join(" ")
    }

    /// Replace whole-word phrase matches, left to right
    fn apply_corrections(&self, words: Vec<String>) -> Vec<String> {
        if self.corrections.is_empty() {
            return words;
        }

        let mut result = Vec::with_capacity(words.len());
        let mut i = 0;
        'outer: while i < words.len() {
            for (from, to) in &self.corrections {
                if words[i..].starts_with(from) {
                    result.extend(to.iter().cloned());
                    i += from.len();
                    continue 'outer;
                }
            }
            result.push(words[i].clone());
            i += 1;
        }
        result
    }
}

/// Lowercase, strip sentence punctuation and split on whitespace
fn words_of(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            '.' | ',' | '!' | '?' | ';' | ':' | '"' => ' ',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
