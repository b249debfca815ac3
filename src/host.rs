//! Console Host
//!
//! Stands in for the PDF app screens when running from a terminal. Every
//! capability logs what the app would do, and the host tracks whether a
//! document is open so each turn gets the right voice context.

use crate::capabilities::{Extraction, FileActions, Navigation, PageSelectionStore};
use crate::commands::VoiceContext;
use crate::processor::Dispatcher;
use crate::recents::RecentFiles;
use crate::selection::PageSelection;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::info;

/// What the console host is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Document { path: String, page_count: u32 },
}

/// Terminal implementation of every app capability
#[derive(Debug)]
pub struct ConsoleHost {
    screen: Mutex<Screen>,
    selection: Arc<PageSelection>,
    recents: Arc<RwLock<RecentFiles>>,
    /// Page count assumed for any document opened by voice
    page_count: u32,
    extractions: Mutex<Vec<String>>,
}

impl ConsoleHost {
    pub fn new(recents: RecentFiles, page_count: u32) -> Self {
        Self {
            screen: Mutex::new(Screen::Home),
            selection: Arc::new(PageSelection::new(0)),
            recents: Arc::new(RwLock::new(recents)),
            page_count,
            extractions: Mutex::new(Vec::new()),
        }
    }

    pub fn screen(&self) -> Screen {
        self.lock_screen().clone()
    }

    /// Voice context of the current screen and its page count
    pub fn context(&self) -> (VoiceContext, u32) {
        match &*self.lock_screen() {
            Screen::Home => (VoiceContext::Home, 0),
            Screen::Document { page_count, .. } => (VoiceContext::PageGrid, *page_count),
        }
    }

    pub fn selection(&self) -> Arc<PageSelection> {
        self.selection.clone()
    }

    pub fn recents(&self) -> Arc<RwLock<RecentFiles>> {
        self.recents.clone()
    }

    /// Names of the documents extracted so far
    pub fn extractions(&self) -> Vec<String> {
        self.extractions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Open a document without going through a voice command
    pub fn open_document(&self, path: &str) {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        match self.recents.write() {
            Ok(mut recents) => recents.record_open(&name, path),
            Err(e) => tracing::warn!("⚠️ Recent files unavailable: {}", e),
        }

        self.selection.reset(self.page_count);
        *self.lock_screen() = Screen::Document {
            path: path.to_string(),
            page_count: self.page_count,
        };
        info!("📄 Opened {} ({} pages)", name, self.page_count);
    }

    /// Dispatcher wired the way the current screen would wire it
    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let dispatcher = Dispatcher::new()
            .with_files(self.clone())
            .with_navigation(self.clone());

        match self.context().0 {
            VoiceContext::Home => dispatcher
                .with_file_picker(self.clone())
                .with_recents(self.recents.clone()),
            VoiceContext::PageGrid => dispatcher
                .with_selection(self.selection.clone())
                .with_extraction(self.clone()),
        }
    }

    fn lock_screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FileActions for ConsoleHost {
    async fn open_file_picker(&self) -> Result<()> {
        info!("📂 Document picker would open here");
        Ok(())
    }

    async fn open_file(&self, path: &str) -> Result<()> {
        self.open_document(path);
        Ok(())
    }

    async fn close_document(&self) -> Result<()> {
        let mut screen = self.lock_screen();
        if *screen == Screen::Home {
            return Err(anyhow!("no document is open"));
        }
        *screen = Screen::Home;
        drop(screen);

        self.selection.reset(0);
        info!("📄 Document closed");
        Ok(())
    }
}

#[async_trait]
impl Extraction for ConsoleHost {
    async fn extract(&self, custom_name: Option<&str>) -> Result<()> {
        let stem = match self.screen() {
            Screen::Document { path, .. } => Path::new(&path)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "document".to_string()),
            Screen::Home => return Err(anyhow!("no document is open")),
        };

        let pages = self.selection.selected();
        let name = match custom_name {
            Some(name) => format!("{}.pdf", name),
            None => format!("{} (extracted).pdf", stem),
        };
        info!("✂️ Extracted pages {:?} into {}", pages, name);
        self.extractions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name);
        Ok(())
    }
}

impl Navigation for ConsoleHost {
    fn open_settings(&self) {
        info!("⚙️ Settings would open here");
    }

    fn show_help(&self) {
        let help = match self.context().0 {
            VoiceContext::Home => "Say 'open file', or 'open' and a recent document's name",
            VoiceContext::PageGrid => {
                "Say 'pages one to three', 'odd pages', 'add page 4', 'clear', 'extract' or 'save as <name>'"
            }
        };
        info!("❓ {}", help);
    }

    fn show_paywall(&self) {
        info!("💳 Upgrade options would show here");
    }

    fn go_to_page(&self, page: u32) {
        info!("➡️ Scrolled to page {}", page);
    }

    fn dismiss_session(&self) {
        info!("Voice overlay dismissed");
    }
}
