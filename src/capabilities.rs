//! Application capabilities
//!
//! The host screen wires whichever of these it supports into the
//! [`Dispatcher`](crate::processor::Dispatcher). A command whose capability
//! is missing fails with a "cannot do this here" message.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Page selection of the open document
pub trait PageSelectionStore: Send + Sync {
    /// Currently selected pages
    fn selected(&self) -> BTreeSet<u32>;

    /// Pages in the open document
    fn page_count(&self) -> u32;

    /// Replace the selection
    fn set_selection(&self, pages: BTreeSet<u32>);

    /// Deselect everything
    fn clear(&self);

    /// Select exactly the pages that are not selected
    fn invert(&self, page_count: u32);
}

/// Opening and closing documents
#[async_trait]
pub trait FileActions: Send + Sync {
    /// Show the system document picker
    async fn open_file_picker(&self) -> Result<()>;

    /// Open a document by path
    async fn open_file(&self, path: &str) -> Result<()>;

    /// Close the open document
    async fn close_document(&self) -> Result<()>;
}

/// Extracting the selected pages into a new document
#[async_trait]
pub trait Extraction: Send + Sync {
    /// Extract the current selection, optionally under a custom file name
    async fn extract(&self, custom_name: Option<&str>) -> Result<()>;
}

/// Screen-level navigation
pub trait Navigation: Send + Sync {
    fn open_settings(&self);

    fn show_help(&self);

    /// Whether the upgrade screen is relevant is the host's decision
    fn show_paywall(&self);

    fn go_to_page(&self, page: u32);

    /// Close the voice overlay
    fn dismiss_session(&self);
}
