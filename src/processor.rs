//! Command Dispatcher
//!
//! Routes a parsed [`Command`] to the capability that carries it out and
//! produces the feedback shown to the user. The dispatcher holds no document
//! or persistence state of its own; every side effect goes through an
//! injected capability.

use crate::capabilities::{Extraction, FileActions, Navigation, PageSelectionStore};
use crate::commands::Command;
use crate::error::VoiceError;
use crate::recents::RecentFiles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

pub const NOT_RECOGNIZED: &str = "Command not recognized";
pub const BAD_PAGE_SELECTION: &str = "Could not parse page selection";
pub const NO_PAGES_TO_EXTRACT: &str = "No pages selected to extract";
pub const CANNOT_SELECT: &str = "Cannot select pages here";
pub const CANNOT_EXTRACT: &str = "Cannot extract here";
pub const CANNOT_OPEN_FILES: &str = "Cannot open files here";
pub const CANNOT_OPEN_RECENT: &str = "Cannot open recent files here";
pub const CANNOT_CLOSE: &str = "Cannot close document here";
pub const CANNOT_NAVIGATE: &str = "Cannot navigate here";

/// Outcome of dispatching one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    /// Text for the user
    pub feedback: String,
    /// Whether the voice overlay should close
    pub should_dismiss: bool,
}

impl DispatchResult {
    /// Command carried out; the overlay closes
    pub fn success(feedback: impl Into<String>) -> Self {
        Self {
            success: true,
            feedback: feedback.into(),
            should_dismiss: true,
        }
    }

    /// Command not carried out; the overlay stays so the user can retry
    pub fn failure(feedback: impl Into<String>) -> Self {
        Self {
            success: false,
            feedback: feedback.into(),
            should_dismiss: false,
        }
    }
}

/// Executes commands against whichever capabilities the host provides
#[derive(Clone, Default)]
pub struct Dispatcher {
    selection: Option<Arc<dyn PageSelectionStore>>,
    files: Option<Arc<dyn FileActions>>,
    /// Screens that browse for documents; the picker is not offered elsewhere
    picker: Option<Arc<dyn FileActions>>,
    extraction: Option<Arc<dyn Extraction>>,
    navigation: Option<Arc<dyn Navigation>>,
    recents: Option<Arc<RwLock<RecentFiles>>>,
}

impl Dispatcher {
    /// A dispatcher with no capabilities wired
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: Arc<dyn PageSelectionStore>) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Opening a known path and closing the document
    pub fn with_files(mut self, files: Arc<dyn FileActions>) -> Self {
        self.files = Some(files);
        self
    }

    /// Showing the document picker
    pub fn with_file_picker(mut self, picker: Arc<dyn FileActions>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn with_extraction(mut self, extraction: Arc<dyn Extraction>) -> Self {
        self.extraction = Some(extraction);
        self
    }

    pub fn with_navigation(mut self, navigation: Arc<dyn Navigation>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    pub fn with_recents(mut self, recents: Arc<RwLock<RecentFiles>>) -> Self {
        self.recents = Some(recents);
        self
    }

    /// Execute a command and report the outcome.
    ///
    /// Always runs to completion; capability errors become failure results.
    pub async fn dispatch(&self, command: &Command) -> DispatchResult {
        info!("🎯 Dispatching: {}", command);

        let result = match command {
            Command::Cancel => {
                if let Some(navigation) = &self.navigation {
                    navigation.dismiss_session();
                }
                DispatchResult::success("Cancelled")
            }
            Command::OpenSettings => self.navigate(
                |nav| nav.open_settings(),
                "Opening settings",
                "Cannot open settings here",
            ),
            Command::ShowHelp => {
                self.navigate(|nav| nav.show_help(), "Showing help", "Cannot show help here")
            }
            Command::ShowPaywall => self.navigate(
                |nav| nav.show_paywall(),
                "Showing upgrade options",
                "Cannot show upgrade options here",
            ),
            Command::GoToPage { page } => self.navigate(
                |nav| nav.go_to_page(*page),
                &format!("Going to page {}", page),
                CANNOT_NAVIGATE,
            ),
            Command::CloseDocument => self.close_document().await,
            Command::OpenFilePicker => self.open_file_picker().await,
            Command::OpenRecentByName { query } => self.open_recent(query).await,
            Command::SelectPages { pages } => self.update_selection(pages, |_, pages| pages, "Selected"),
            Command::AddPages { pages } => self.update_selection(
                pages,
                |current, pages| current.union(&pages).copied().collect(),
                "Added",
            ),
            Command::RemovePages { pages } => self.update_selection(
                pages,
                |current, pages| current.difference(&pages).copied().collect(),
                "Removed",
            ),
            Command::ClearSelection => match &self.selection {
                Some(selection) => {
                    selection.clear();
                    DispatchResult::success("Selection cleared")
                }
                None => DispatchResult::failure(CANNOT_SELECT),
            },
            Command::InvertSelection => match &self.selection {
                Some(selection) => {
                    selection.invert(selection.page_count());
                    DispatchResult::success("Selection inverted")
                }
                None => DispatchResult::failure(CANNOT_SELECT),
            },
            Command::Extract => self.extract(None).await,
            Command::ExtractWithName { name } => self.extract(Some(name)).await,
            Command::Unrecognized => DispatchResult::failure(NOT_RECOGNIZED),
        };

        if result.success {
            info!("✅ {}", result.feedback);
        } else {
            warn!("❌ {}: {}", command.name(), result.feedback);
        }
        result
    }

    fn navigate(
        &self,
        action: impl FnOnce(&dyn Navigation),
        done: &str,
        missing: &str,
    ) -> DispatchResult {
        match &self.navigation {
            Some(navigation) => {
                action(navigation.as_ref());
                DispatchResult::success(done)
            }
            None => DispatchResult::failure(missing),
        }
    }

    /// Apply `combine(current, spoken)` to the selection
    fn update_selection(
        &self,
        pages: &BTreeSet<u32>,
        combine: impl FnOnce(BTreeSet<u32>, BTreeSet<u32>) -> BTreeSet<u32>,
        verb: &str,
    ) -> DispatchResult {
        if pages.is_empty() {
            return DispatchResult::failure(BAD_PAGE_SELECTION);
        }

        let selection = match &self.selection {
            Some(selection) => selection,
            None => return DispatchResult::failure(CANNOT_SELECT),
        };

        let updated = combine(selection.selected(), pages.clone());
        selection.set_selection(updated);
        DispatchResult::success(format!("{} {}", verb, describe_pages(pages)))
    }

    async fn extract(&self, custom_name: Option<&str>) -> DispatchResult {
        let selection = match &self.selection {
            Some(selection) => selection,
            None => return DispatchResult::failure(CANNOT_EXTRACT),
        };

        let selected = selection.selected();
        if selected.is_empty() {
            return DispatchResult::failure(NO_PAGES_TO_EXTRACT);
        }

        let extraction = match &self.extraction {
            Some(extraction) => extraction,
            None => return DispatchResult::failure(CANNOT_EXTRACT),
        };

        match extraction.extract(custom_name).await {
            Ok(()) => {
                let mut feedback = format!("Extracting {}", describe_pages(&selected));
                if let Some(name) = custom_name {
                    feedback.push_str(&format!(" as {}", name));
                }
                DispatchResult::success(feedback)
            }
            Err(e) => DispatchResult::failure(format!("Extraction failed: {}", e)),
        }
    }

    async fn open_file_picker(&self) -> DispatchResult {
        let picker = match &self.picker {
            Some(picker) => picker,
            None => return DispatchResult::failure(CANNOT_OPEN_FILES),
        };

        match picker.open_file_picker().await {
            Ok(()) => DispatchResult::success("Opening file picker"),
            Err(e) => DispatchResult::failure(format!("Could not open file picker: {}", e)),
        }
    }

    async fn open_recent(&self, query: &str) -> DispatchResult {
        let recents = match &self.recents {
            Some(recents) => recents,
            None => return DispatchResult::failure(CANNOT_OPEN_RECENT),
        };

        let best = match recents.read().map_err(VoiceError::from) {
            Ok(recents) => recents.best_match(query),
            Err(e) => {
                warn!("⚠️ {}", e);
                None
            }
        };

        let entry = match best {
            Some(entry) => entry,
            None => return DispatchResult::failure(format!("No recent file matches \"{}\"", query)),
        };

        let files = match &self.files {
            Some(files) => files,
            None => return DispatchResult::failure(CANNOT_OPEN_FILES),
        };

        info!("📄 '{}' matched {}", query, entry.path);
        match files.open_file(&entry.path).await {
            Ok(()) => DispatchResult::success(format!("Opening {}", entry.name)),
            Err(e) => DispatchResult::failure(format!("Could not open {}: {}", entry.name, e)),
        }
    }

    async fn close_document(&self) -> DispatchResult {
        let files = match &self.files {
            Some(files) => files,
            None => return DispatchResult::failure(CANNOT_CLOSE),
        };

        match files.close_document().await {
            Ok(()) => DispatchResult::success("Document closed"),
            Err(e) => DispatchResult::failure(format!("Could not close document: {}", e)),
        }
    }
}

/// "page 3" or "4 pages"
fn describe_pages(pages: &BTreeSet<u32>) -> String {
    match pages.len() {
        1 => format!("page {}", pages.iter().next().copied().unwrap_or_default()),
        n => format!("{} pages", n),
    }
}
