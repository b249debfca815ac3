//! Command parsing module
//!
//! Turns a free-form transcript into a typed [`Command`]. Parsing is pure:
//! the same `(text, page_count, context)` always yields the same command.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. flow keywords (cancel, settings, help, upgrade), legal everywhere
//! 2. `Home`: file picker phrases, then `open <name>`
//! 3. `PageGrid`: selection keywords (all/odd/even/first/last)
//! 4. page ranges, clamped into the document
//! 5. page lists, single pages and bare numbers, rejected when out of range
//! 6. add/remove a single page
//! 7. go to page, not clamped
//! 8. clear, invert, close
//! 9. extract, save as
//!
//! Anything else is [`Command::Unrecognized`].

use crate::core::numbers::{
    all_pages, even_pages, expand_range, in_bounds, odd_pages, resolve_number,
};
use crate::core::text_normalizer::TextNormalizer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::debug;

/// Which screen the user is talking to. Fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceContext {
    /// Document picker / start screen
    Home,
    /// Page thumbnails of an open document
    PageGrid,
}

/// A structured voice command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Flow / navigation, legal in every context
    Cancel,
    OpenSettings,
    ShowHelp,
    ShowPaywall,
    CloseDocument,

    // Home only
    OpenFilePicker,
    OpenRecentByName { query: String },

    // Page grid only
    SelectPages { pages: BTreeSet<u32> },
    AddPages { pages: BTreeSet<u32> },
    RemovePages { pages: BTreeSet<u32> },
    ClearSelection,
    InvertSelection,
    GoToPage { page: u32 },
    Extract,
    ExtractWithName { name: String },

    Unrecognized,
}

impl Command {
    /// Short stable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Cancel => "cancel",
            Command::OpenSettings => "open_settings",
            Command::ShowHelp => "show_help",
            Command::ShowPaywall => "show_paywall",
            Command::CloseDocument => "close_document",
            Command::OpenFilePicker => "open_file_picker",
            Command::OpenRecentByName { .. } => "open_recent_by_name",
            Command::SelectPages { .. } => "select_pages",
            Command::AddPages { .. } => "add_pages",
            Command::RemovePages { .. } => "remove_pages",
            Command::ClearSelection => "clear_selection",
            Command::InvertSelection => "invert_selection",
            Command::GoToPage { .. } => "go_to_page",
            Command::Extract => "extract",
            Command::ExtractWithName { .. } => "extract_with_name",
            Command::Unrecognized => "unrecognized",
        }
    }

    /// Whether this command may be produced under `context`
    pub fn is_allowed_in(&self, context: VoiceContext) -> bool {
        match self {
            Command::OpenFilePicker | Command::OpenRecentByName { .. } => {
                context == VoiceContext::Home
            }
            Command::SelectPages { .. }
            | Command::AddPages { .. }
            | Command::RemovePages { .. }
            | Command::ClearSelection
            | Command::InvertSelection
            | Command::GoToPage { .. }
            | Command::Extract
            | Command::ExtractWithName { .. } => context == VoiceContext::PageGrid,
            _ => true,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::OpenRecentByName { query } => write!(f, "open recent \"{}\"", query),
            Command::SelectPages { pages } => write!(f, "select pages {:?}", pages),
            Command::AddPages { pages } => write!(f, "add pages {:?}", pages),
            Command::RemovePages { pages } => write!(f, "remove pages {:?}", pages),
            Command::GoToPage { page } => write!(f, "go to page {}", page),
            Command::ExtractWithName { name } => write!(f, "extract as \"{}\"", name),
            other => f.write_str(other.name()),
        }
    }
}

const CANCEL_PHRASES: &[&str] = &[
    "cancel",
    "stop",
    "cancel that",
    "never mind",
    "nevermind",
    "stop listening",
];
const SETTINGS_PHRASES: &[&str] = &["settings", "open settings", "show settings"];
const HELP_PHRASES: &[&str] = &["help", "show help", "what can i say"];
const PAYWALL_PHRASES: &[&str] = &["upgrade", "premium", "go premium", "unlock"];

const FILE_PICKER_PHRASES: &[&str] = &[
    "find document",
    "find documents",
    "open file",
    "open files",
    "open document",
    "browse",
    "browse files",
];

const CLEAR_PHRASES: &[&str] = &["clear", "clear selection", "deselect all", "select none"];
const INVERT_PHRASES: &[&str] = &["invert", "invert selection"];
const CLOSE_PHRASES: &[&str] = &["close", "close document", "close file"];
const EXTRACT_PHRASES: &[&str] = &["extract", "extract pages", "extract selection", "export"];

lazy_static! {
    static ref RANGE: Regex =
        Regex::new(r"^(?:select )?pages? (?:from )?(\S+) (?:through|thru|to|until|till) (\S+)$")
            .expect("valid range pattern");
    static ref HYPHEN_RANGE: Regex =
        Regex::new(r"^(?:select )?pages? (\d+) ?- ?(\d+)$").expect("valid hyphen range pattern");
    static ref PAGE_LIST: Regex =
        Regex::new(r"^(?:select )?pages? (.+)$").expect("valid page list pattern");
    static ref SINGLE_PAGE: Regex = Regex::new(r"^(?:select )?(?:pages? )?(?:number )?(\S+)$")
        .expect("valid single page pattern");
    static ref ADD_REMOVE: Regex =
        Regex::new(r"^(add|remove|deselect) page (?:number )?(\S+)$").expect("valid add pattern");
    static ref GO_TO: Regex = Regex::new(r"^(?:go to|jump to|go) (?:page )?(?:number )?(\S+)$")
        .expect("valid go to pattern");
    static ref SAVE_AS: Regex =
        Regex::new(r"^(?:save|extract|export)(?: it| pages| selection)? as (.+)$")
            .expect("valid save as pattern");
    static ref OPEN_NAMED: Regex =
        Regex::new(r"^open (?:recent )?(.+)$").expect("valid open pattern");
}

/// Context-aware transcript parser
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    normalizer: TextNormalizer,
}

impl CommandParser {
    /// Create a parser that applies the given voice corrections
    pub fn new(corrections: &HashMap<String, String>) -> Self {
        Self {
            normalizer: TextNormalizer::new(corrections),
        }
    }

    /// Parse a transcript into a command for the given context
    pub fn parse(&self, transcript: &str, page_count: u32, context: VoiceContext) -> Command {
        let text = self.normalizer.normalize(transcript);
        if text.is_empty() {
            return Command::Unrecognized;
        }

        let command = match_flow(&text)
            .or_else(|| match context {
                VoiceContext::Home => self.match_home(&text, transcript),
                VoiceContext::PageGrid => match_grid(&text, page_count)
                    .or_else(|| self.match_save_as(&text, transcript)),
            })
            .unwrap_or(Command::Unrecognized);

        debug!("Parsed '{}' ({:?}, {} pages) -> {}", text, context, page_count, command);
        command
    }

    fn match_home(&self, text: &str, transcript: &str) -> Option<Command> {
        if is_one_of(text, FILE_PICKER_PHRASES) {
            return Some(Command::OpenFilePicker);
        }
        if text == "open recent" {
            return None;
        }

        let caps = OPEN_NAMED.captures(text)?;
        let name = caps.get(1)?;
        let query = self
            .spoken_tail(transcript, &text[..name.start()])
            .map(|query| drop_leading_article(&query).to_string())
            .unwrap_or_else(|| name.as_str().to_string());
        Some(Command::OpenRecentByName { query })
    }

    fn match_save_as(&self, text: &str, transcript: &str) -> Option<Command> {
        let caps = SAVE_AS.captures(text)?;
        let name = caps.get(1)?;
        let name = self
            .spoken_tail(transcript, &text[..name.start()])
            .unwrap_or_else(|| name.as_str().to_string());
        Some(Command::ExtractWithName { name })
    }

    /// Words of `transcript` spoken after the command prefix.
    ///
    /// `prefix` is the normalized text in front of the name. The name keeps
    /// the speaker's casing and articles and is never corrected; only
    /// surrounding punctuation and a trailing "please" are dropped.
    fn spoken_tail(&self, transcript: &str, prefix: &str) -> Option<String> {
        let prefix = prefix.trim_end();
        let words: Vec<&str> = transcript.split_whitespace().collect();
        let cut = (1..words.len())
            .find(|&i| self.normalizer.normalize(&words[..i].join(" ")) == prefix)?;

        let mut tail: Vec<&str> = words[cut..]
            .iter()
            .map(|w| w.trim_matches(is_sentence_punctuation))
            .filter(|w| !w.is_empty())
            .collect();
        if tail.len() > 1 && tail.last().is_some_and(|w| w.eq_ignore_ascii_case("please")) {
            tail.pop();
        }

        (!tail.is_empty()).then(|| tail.join(" "))
    }
}

fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"')
}

/// "the budget" -> "budget"; a lone article is kept
fn drop_leading_article(query: &str) -> &str {
    match query.split_once(' ') {
        Some((first, rest)) if ["the", "a", "an"].contains(&first.to_lowercase().as_str()) => rest,
        _ => query,
    }
}

/// Parse with no voice corrections
pub fn parse(text: &str, page_count: u32, context: VoiceContext) -> Command {
    CommandParser::default().parse(text, page_count, context)
}

fn is_one_of(text: &str, phrases: &[&str]) -> bool {
    phrases.contains(&text)
}

fn match_flow(text: &str) -> Option<Command> {
    if is_one_of(text, CANCEL_PHRASES) {
        Some(Command::Cancel)
    } else if is_one_of(text, SETTINGS_PHRASES) {
        Some(Command::OpenSettings)
    } else if is_one_of(text, HELP_PHRASES) {
        Some(Command::ShowHelp)
    } else if is_one_of(text, PAYWALL_PHRASES) {
        Some(Command::ShowPaywall)
    } else {
        None
    }
}

fn match_grid(text: &str, page_count: u32) -> Option<Command> {
    match_selection_keyword(text, page_count)
        .or_else(|| match_range(text, page_count))
        .or_else(|| match_page_list(text, page_count))
        .or_else(|| match_single_page(text, page_count))
        .or_else(|| match_add_remove(text, page_count))
        .or_else(|| match_go_to(text))
        .or_else(|| match_grid_keyword(text))
        .or_else(|| match_extract(text))
}

fn select(pages: BTreeSet<u32>) -> Command {
    Command::SelectPages { pages }
}

fn match_selection_keyword(text: &str, page_count: u32) -> Option<Command> {
    let rest = text.strip_prefix("select ").unwrap_or(text);
    let pages = match rest {
        "all" | "all pages" | "everything" => all_pages(page_count),
        "odd" | "odd pages" => odd_pages(page_count),
        "even" | "even pages" => even_pages(page_count),
        "first page" => (1..=page_count.min(1)).collect(),
        "last page" => {
            if page_count >= 1 {
                BTreeSet::from([page_count])
            } else {
                BTreeSet::new()
            }
        }
        _ => return None,
    };
    Some(select(pages))
}

fn match_range(text: &str, page_count: u32) -> Option<Command> {
    let caps = RANGE
        .captures(text)
        .or_else(|| HYPHEN_RANGE.captures(text))?;
    let start = resolve_number(&caps[1])?;
    let end = resolve_number(&caps[2])?;
    expand_range(start, end, page_count).map(select)
}

fn match_page_list(text: &str, page_count: u32) -> Option<Command> {
    let caps = PAGE_LIST.captures(text)?;
    let tokens: Vec<&str> = caps[1]
        .split_whitespace()
        .filter(|t| *t != "and")
        .collect();
    if tokens.len() < 2 {
        return None;
    }

    let mut pages = BTreeSet::new();
    for token in tokens {
        let page = resolve_number(token)?;
        if !in_bounds(page, page_count) {
            return None;
        }
        pages.insert(page);
    }
    Some(select(pages))
}

fn match_single_page(text: &str, page_count: u32) -> Option<Command> {
    let caps = SINGLE_PAGE.captures(text)?;
    let page = resolve_number(&caps[1])?;
    in_bounds(page, page_count).then(|| select(BTreeSet::from([page])))
}

fn match_add_remove(text: &str, page_count: u32) -> Option<Command> {
    let caps = ADD_REMOVE.captures(text)?;
    let page = resolve_number(&caps[2])?;
    if !in_bounds(page, page_count) {
        return None;
    }

    let pages = BTreeSet::from([page]);
    match &caps[1] {
        "add" => Some(Command::AddPages { pages }),
        _ => Some(Command::RemovePages { pages }),
    }
}

fn match_go_to(text: &str) -> Option<Command> {
    let caps = GO_TO.captures(text)?;
    let page = resolve_number(&caps[1])?;
    (page >= 1).then_some(Command::GoToPage { page })
}

fn match_grid_keyword(text: &str) -> Option<Command> {
    if is_one_of(text, CLEAR_PHRASES) {
        Some(Command::ClearSelection)
    } else if is_one_of(text, INVERT_PHRASES) {
        Some(Command::InvertSelection)
    } else if is_one_of(text, CLOSE_PHRASES) {
        Some(Command::CloseDocument)
    } else {
        None
    }
}

fn match_extract(text: &str) -> Option<Command> {
    is_one_of(text, EXTRACT_PHRASES).then_some(Command::Extract)
}
