use pagetalks::capabilities::PageSelectionStore;
use pagetalks::processor::{CANNOT_OPEN_FILES, NOT_RECOGNIZED, NO_PAGES_TO_EXTRACT};
use pagetalks::{parse, Command, Dispatcher, VoiceContext};
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;

mod common;
use common::mock_capabilities::Capabilities;
use common::recents_with;

fn pages(list: &[u32]) -> BTreeSet<u32> {
    list.iter().copied().collect()
}

#[tokio::test]
async fn test_spoken_range_then_save_as() {
    let caps = Capabilities::new(10, recents_with(&[]));
    let dispatcher = caps.grid_dispatcher();

    let command = parse("pages one to three", 10, VoiceContext::PageGrid);
    assert_eq!(command, Command::SelectPages { pages: pages(&[1, 2, 3]) });
    let result = dispatcher.dispatch(&command).await;
    assert!(result.success);
    assert_eq!(result.feedback, "Selected 3 pages");
    assert_eq!(caps.selection.selected(), pages(&[1, 2, 3]));

    let command = parse("save as purple", 10, VoiceContext::PageGrid);
    let result = dispatcher.dispatch(&command).await;
    assert!(result.success);
    assert!(result.should_dismiss);
    assert_eq!(result.feedback, "Extracting 3 pages as purple");
    assert_eq!(caps.extraction.names(), vec![Some("purple".to_string())]);
}

#[tokio::test]
async fn test_range_clamped_to_document() {
    let caps = Capabilities::new(5, recents_with(&[]));
    let command = parse("pages 1 to 100", 5, VoiceContext::PageGrid);
    let result = caps.grid_dispatcher().dispatch(&command).await;
    assert!(result.success);
    assert_eq!(caps.selection.selected(), pages(&[1, 2, 3, 4, 5]));
}

#[tokio::test]
async fn test_extract_with_empty_selection() {
    let caps = Capabilities::new(10, recents_with(&[]));
    let result = caps.grid_dispatcher().dispatch(&Command::Extract).await;
    assert!(!result.success);
    assert!(!result.should_dismiss);
    assert_eq!(result.feedback, NO_PAGES_TO_EXTRACT);
    assert!(caps.extraction.names().is_empty());
}

#[tokio::test]
async fn test_add_remove_and_invert() {
    let caps = Capabilities::new(6, recents_with(&[]));
    let dispatcher = caps.grid_dispatcher();

    for spoken in ["odd pages", "add page 2", "remove page five"] {
        let command = parse(spoken, 6, VoiceContext::PageGrid);
        assert!(dispatcher.dispatch(&command).await.success, "{}", spoken);
    }
    assert_eq!(caps.selection.selected(), pages(&[1, 2, 3]));

    let result = dispatcher.dispatch(&Command::InvertSelection).await;
    assert!(result.success);
    assert_eq!(caps.selection.selected(), pages(&[4, 5, 6]));
}

#[tokio::test]
async fn test_clear_selection_is_idempotent() {
    let caps = Capabilities::new(4, recents_with(&[]));
    let dispatcher = caps.grid_dispatcher();
    dispatcher
        .dispatch(&Command::SelectPages { pages: pages(&[2, 3]) })
        .await;

    for _ in 0..2 {
        let result = dispatcher.dispatch(&Command::ClearSelection).await;
        assert!(result.success);
        assert_eq!(result.feedback, "Selection cleared");
        assert!(caps.selection.selected().is_empty());
    }
}

#[tokio::test]
async fn test_unrecognized_keeps_session_open() {
    let caps = Capabilities::new(4, recents_with(&[]));
    let command = parse("make me a sandwich", 4, VoiceContext::PageGrid);
    let result = caps.grid_dispatcher().dispatch(&command).await;
    assert!(!result.success);
    assert!(!result.should_dismiss);
    assert_eq!(result.feedback, NOT_RECOGNIZED);
}

#[tokio::test]
async fn test_missing_capabilities_fail_softly() {
    let dispatcher = Dispatcher::new();
    let commands = [
        Command::OpenSettings,
        Command::GoToPage { page: 2 },
        Command::CloseDocument,
        Command::OpenFilePicker,
        Command::OpenRecentByName { query: "report".to_string() },
        Command::SelectPages { pages: pages(&[1]) },
        Command::ClearSelection,
        Command::Extract,
    ];
    for command in commands {
        let result = dispatcher.dispatch(&command).await;
        assert!(!result.success, "{:?}", command);
        assert!(!result.should_dismiss);
    }

    // Cancel never needs a collaborator
    assert!(dispatcher.dispatch(&Command::Cancel).await.success);
}

#[tokio::test]
async fn test_page_grid_has_no_file_picker() {
    let caps = Capabilities::new(10, recents_with(&[]));
    let dispatcher = caps.grid_dispatcher();

    let result = dispatcher.dispatch(&Command::OpenFilePicker).await;
    assert!(!result.success);
    assert_eq!(result.feedback, CANNOT_OPEN_FILES);

    assert!(dispatcher.dispatch(&Command::CloseDocument).await.success);
    assert_eq!(caps.files.calls(), vec!["close"]);
}

#[tokio::test]
async fn test_navigation_commands() {
    let caps = Capabilities::new(10, recents_with(&[]));
    let dispatcher = caps.grid_dispatcher();

    assert!(dispatcher.dispatch(&parse("go to page 40", 10, VoiceContext::PageGrid)).await.success);
    assert!(dispatcher.dispatch(&parse("help", 10, VoiceContext::PageGrid)).await.success);
    assert!(dispatcher.dispatch(&parse("cancel", 10, VoiceContext::PageGrid)).await.success);
    assert_eq!(caps.navigation.calls(), vec!["page 40", "help", "dismiss"]);
}

#[tokio::test]
async fn test_open_recent_prefers_best_match() {
    let caps = Capabilities::new(
        10,
        recents_with(&["Quarterly Report.pdf", "Q3 Report.pdf"]),
    );

    let matches = caps.recents.read().unwrap().search("quarterly");
    assert_eq!(matches[0].entry.name, "Quarterly Report.pdf");

    let command = parse("open quarterly report", 0, VoiceContext::Home);
    assert_eq!(
        command,
        Command::OpenRecentByName { query: "quarterly report".to_string() }
    );
    let result = caps.home_dispatcher().dispatch(&command).await;
    assert!(result.success);
    assert_eq!(result.feedback, "Opening Quarterly Report.pdf");
    assert_eq!(caps.files.calls(), vec!["open /docs/Quarterly Report.pdf"]);
}

#[tokio::test]
async fn test_open_recent_without_match() {
    let caps = Capabilities::new(10, recents_with(&["Budget.pdf"]));
    let command = Command::OpenRecentByName { query: "holiday photos".to_string() };
    let result = caps.home_dispatcher().dispatch(&command).await;
    assert!(!result.success);
    assert_eq!(result.feedback, "No recent file matches \"holiday photos\"");
    assert!(caps.files.calls().is_empty());
}

#[tokio::test]
async fn test_open_recent_with_empty_recents() {
    let caps = Capabilities::new(10, recents_with(&[]));
    let command = Command::OpenRecentByName { query: "budget".to_string() };
    assert!(!caps.home_dispatcher().dispatch(&command).await.success);
}

#[tokio::test]
async fn test_file_action_errors_become_feedback() {
    let caps = Capabilities::new(10, recents_with(&["Budget.pdf"]));
    caps.files.fail.store(true, Ordering::SeqCst);

    let result = caps.home_dispatcher().dispatch(&Command::OpenFilePicker).await;
    assert!(!result.success);
    assert!(result.feedback.starts_with("Could not open file picker"));

    let command = Command::OpenRecentByName { query: "budget".to_string() };
    let result = caps.home_dispatcher().dispatch(&command).await;
    assert!(!result.success);
    assert!(result.feedback.starts_with("Could not open Budget.pdf"));
}
