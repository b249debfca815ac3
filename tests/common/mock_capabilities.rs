//! Recording capabilities for dispatcher tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pagetalks::capabilities::{Extraction, FileActions, Navigation};
use pagetalks::recents::RecentFiles;
use pagetalks::selection::PageSelection;
use pagetalks::Dispatcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Records every file action
#[derive(Default)]
pub struct RecordingFiles {
    pub calls: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingFiles {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("disk on fire"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl FileActions for RecordingFiles {
    async fn open_file_picker(&self) -> Result<()> {
        self.record("picker".to_string())
    }

    async fn open_file(&self, path: &str) -> Result<()> {
        self.record(format!("open {}", path))
    }

    async fn close_document(&self) -> Result<()> {
        self.record("close".to_string())
    }
}

/// Records the custom name of every extraction
#[derive(Default)]
pub struct RecordingExtraction {
    pub names: Mutex<Vec<Option<String>>>,
}

impl RecordingExtraction {
    pub fn names(&self) -> Vec<Option<String>> {
        self.names.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extraction for RecordingExtraction {
    async fn extract(&self, custom_name: Option<&str>) -> Result<()> {
        self.names
            .lock()
            .unwrap()
            .push(custom_name.map(str::to_string));
        Ok(())
    }
}

/// Records navigation requests
#[derive(Default)]
pub struct RecordingNavigation {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingNavigation {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl Navigation for RecordingNavigation {
    fn open_settings(&self) {
        self.record("settings");
    }

    fn show_help(&self) {
        self.record("help");
    }

    fn show_paywall(&self) {
        self.record("paywall");
    }

    fn go_to_page(&self, page: u32) {
        self.record(format!("page {}", page));
    }

    fn dismiss_session(&self) {
        self.record("dismiss");
    }
}

/// Every capability a screen could offer, each one observable
pub struct Capabilities {
    pub selection: Arc<PageSelection>,
    pub files: Arc<RecordingFiles>,
    pub extraction: Arc<RecordingExtraction>,
    pub navigation: Arc<RecordingNavigation>,
    pub recents: Arc<RwLock<RecentFiles>>,
}

impl Capabilities {
    pub fn new(page_count: u32, recents: RecentFiles) -> Self {
        Self {
            selection: Arc::new(PageSelection::new(page_count)),
            files: Arc::new(RecordingFiles::default()),
            extraction: Arc::new(RecordingExtraction::default()),
            navigation: Arc::new(RecordingNavigation::default()),
            recents: Arc::new(RwLock::new(recents)),
        }
    }

    /// Wiring of the page grid screen
    pub fn grid_dispatcher(&self) -> Dispatcher {
        Dispatcher::new()
            .with_selection(self.selection.clone())
            .with_files(self.files.clone())
            .with_extraction(self.extraction.clone())
            .with_navigation(self.navigation.clone())
    }

    /// Wiring of the home screen
    pub fn home_dispatcher(&self) -> Dispatcher {
        Dispatcher::new()
            .with_files(self.files.clone())
            .with_file_picker(self.files.clone())
            .with_navigation(self.navigation.clone())
            .with_recents(self.recents.clone())
    }
}
