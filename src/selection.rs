//! Page Selection
//!
//! In-memory page selection for an open document. Page numbers are
//! 1-indexed and never exceed the document's page count.

use crate::capabilities::PageSelectionStore;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct SelectionState {
    pages: BTreeSet<u32>,
    page_count: u32,
}

/// Selected pages of one document
#[derive(Debug, Default)]
pub struct PageSelection {
    state: Mutex<SelectionState>,
}

impl PageSelection {
    pub fn new(page_count: u32) -> Self {
        Self {
            state: Mutex::new(SelectionState {
                pages: BTreeSet::new(),
                page_count,
            }),
        }
    }

    /// Switch to a different document; drops the selection
    pub fn reset(&self, page_count: u32) {
        let mut state = self.lock();
        state.pages.clear();
        state.page_count = page_count;
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().pages.len()
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageSelectionStore for PageSelection {
    fn selected(&self) -> BTreeSet<u32> {
        self.lock().pages.clone()
    }

    fn page_count(&self) -> u32 {
        self.lock().page_count
    }

    fn set_selection(&self, pages: BTreeSet<u32>) {
        let mut state = self.lock();
        let page_count = state.page_count;
        state.pages = pages.into_iter().filter(|p| (1..=page_count).contains(p)).collect();
        debug!("📋 Selection: {:?}", state.pages);
    }

    fn clear(&self) {
        self.lock().pages.clear();
        debug!("📋 Selection cleared");
    }

    fn invert(&self, page_count: u32) {
        let mut state = self.lock();
        let inverted: BTreeSet<u32> = (1..=page_count)
            .filter(|p| !state.pages.contains(p))
            .collect();
        state.page_count = page_count;
        state.pages = inverted;
        debug!("📋 Selection inverted: {:?}", state.pages);
    }
}
