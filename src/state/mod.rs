// State management module.
// Handles navigation and per-view state for the feed and detail views.

pub mod detail;
pub mod feed;
pub mod navigation;

pub use detail::{DetailState, DetailView};
pub use feed::{FeedState, FeedView, ITEMS_PER_PAGE};
pub use navigation::{BreadcrumbNode, NavigationStack, Route};

use crate::error::FetchError;

/// `Error: <message>`, or `Error: <fallback>` when the failure has no text.
pub fn error_message(error: &FetchError, fallback: &str) -> String {
    let message = error.message();
    if message.is_empty() {
        format!("Error: {}", fallback)
    } else {
        format!("Error: {}", message)
    }
}
