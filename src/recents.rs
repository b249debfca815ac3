//! Recent Files
//!
//! Bounded, most-recently-opened-first history of documents, used to
//! resolve "open <name>" by voice. Persisted as a JSON list; a missing or
//! corrupt file yields an empty history instead of an error.

use crate::error::{VoiceError, VoiceResult};
use crate::utils::fuzzy::{self, FileMatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Default number of remembered documents
pub const DEFAULT_CAPACITY: usize = 20;

/// A document the user opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFileEntry {
    /// Display name, usually the file name
    pub name: String,
    /// Location used to reopen the document; unique within the list
    pub path: String,
    pub opened_at: DateTime<Utc>,
}

/// Whole-list persistence for the recent files history
pub trait RecentsStore: Send + Sync {
    /// Load the saved list; empty when absent or unreadable
    fn load(&self) -> Vec<RecentFileEntry>;

    /// Replace the saved list
    fn save(&self, entries: &[RecentFileEntry]) -> VoiceResult<()>;
}

/// JSON file backed store
#[derive(Debug, Clone)]
pub struct JsonRecentsStore {
    path: PathBuf,
}

impl JsonRecentsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, err: std::io::Error) -> VoiceError {
        VoiceError::Recents(format!("cannot write {}: {}", self.path.display(), err))
    }
}

impl RecentsStore for JsonRecentsStore {
    fn load(&self) -> Vec<RecentFileEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("⚠️ Could not read recent files, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("⚠️ Recent files corrupted, starting empty: {}", e);
                // Keep the corrupt file around for debugging
                let backup_path = self.path.with_extension("json.corrupt");
                let _ = std::fs::rename(&self.path, &backup_path);
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[RecentFileEntry]) -> VoiceResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content).map_err(|e| self.write_error(e))?;
        Ok(())
    }
}

/// Store that keeps the list in memory only
#[derive(Debug, Default)]
pub struct MemoryRecentsStore {
    entries: Mutex<Vec<RecentFileEntry>>,
}

impl MemoryRecentsStore {
    pub fn new(entries: Vec<RecentFileEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl RecentsStore for MemoryRecentsStore {
    fn load(&self) -> Vec<RecentFileEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, entries: &[RecentFileEntry]) -> VoiceResult<()> {
        *self.entries.lock()? = entries.to_vec();
        Ok(())
    }
}

/// Most-recently-opened-first list, deduplicated by path
pub struct RecentFiles {
    entries: Vec<RecentFileEntry>,
    capacity: usize,
    store: Box<dyn RecentsStore>,
}

impl RecentFiles {
    /// Load the history from a store, enforcing capacity and uniqueness
    pub fn load(store: Box<dyn RecentsStore>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries: Vec<RecentFileEntry> = Vec::new();
        for entry in store.load() {
            if !entries.iter().any(|e| e.path == entry.path) {
                entries.push(entry);
            }
        }
        entries.truncate(capacity);

        info!("📚 Loaded {} recent files", entries.len());
        Self {
            entries,
            capacity,
            store,
        }
    }

    /// Empty history that is never written anywhere
    pub fn in_memory(capacity: usize) -> Self {
        Self::load(Box::new(MemoryRecentsStore::default()), capacity)
    }

    pub fn entries(&self) -> &[RecentFileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record that a document was opened now
    pub fn record_open(&mut self, name: &str, path: &str) {
        self.record_open_at(name, path, Utc::now());
    }

    /// Record an open at a given time. Re-opening a known path moves it to
    /// the front and refreshes its timestamp.
    pub fn record_open_at(&mut self, name: &str, path: &str, opened_at: DateTime<Utc>) {
        self.entries.retain(|e| e.path != path);
        self.entries.insert(
            0,
            RecentFileEntry {
                name: name.to_string(),
                path: path.to_string(),
                opened_at,
            },
        );
        self.entries.truncate(self.capacity);

        debug!("Recorded open: {} ({} recent files)", path, self.entries.len());
        self.persist();
    }

    /// Forget a document; returns whether it was present
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Rank the history against a spoken query
    pub fn search(&self, query: &str) -> Vec<FileMatch> {
        fuzzy::search(query, &self.entries)
    }

    pub fn best_match(&self, query: &str) -> Option<RecentFileEntry> {
        fuzzy::best_match(query, &self.entries)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.entries) {
            warn!("⚠️ Failed to save recent files: {}", e);
        }
    }
}

impl std::fmt::Debug for RecentFiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentFiles")
            .field("entries", &self.entries)
            .field("capacity", &self.capacity)
            .finish()
    }
}
