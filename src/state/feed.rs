// Feed view state management.
// Turns the collection query into one of four render states and tracks list selection.

use ratatui::widgets::ListState;

use crate::api::Post;
use crate::query::{QueryClient, QueryObserver, QueryResult};

use super::error_message;
use super::navigation::Route;

/// Display cap for the list. There is no paging beyond it.
pub const ITEMS_PER_PAGE: usize = 20;

pub const LOADING_LABEL: &str = "Loading";
pub const EMPTY_MESSAGE: &str = "Data is empty right now";
pub const GENERIC_ERROR: &str = "An error occurred";

/// What the feed view shows, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    /// Nothing loaded yet.
    Loading,
    /// The last fetch failed; already formatted for display.
    Error(String),
    /// Loaded, but there are no posts.
    Empty,
    /// The first `ITEMS_PER_PAGE` posts.
    Posts { posts: Vec<Post>, refreshing: bool },
}

impl FeedView {
    pub fn from_result(result: &QueryResult<Vec<Post>>) -> Self {
        if result.is_loading && result.data.is_none() {
            return FeedView::Loading;
        }
        if let Some(error) = &result.error {
            return FeedView::Error(error_message(error, GENERIC_ERROR));
        }
        match result.data.as_deref() {
            Some(posts) if !posts.is_empty() => FeedView::Posts {
                posts: posts.iter().take(ITEMS_PER_PAGE).cloned().collect(),
                refreshing: result.is_refetching,
            },
            _ => FeedView::Empty,
        }
    }

    /// Posts currently on screen; empty for every other state.
    pub fn posts(&self) -> &[Post] {
        match self {
            FeedView::Posts { posts, .. } => posts,
            _ => &[],
        }
    }
}

/// State for the feed view.
pub struct FeedState {
    query: QueryObserver<Vec<Post>>,
    pub list_state: ListState,
}

impl FeedState {
    pub fn new(client: &QueryClient) -> Self {
        Self {
            query: client.posts_query(),
            list_state: ListState::default(),
        }
    }

    /// Load the feed unless the cache is still fresh.
    pub fn mount(&self) {
        self.query.mount();
    }

    /// Pull-to-refresh: refetch while the current posts stay visible.
    pub fn refresh(&self) {
        self.query.refetch();
    }

    pub fn query(&self) -> &QueryObserver<Vec<Post>> {
        &self.query
    }

    pub fn view(&self) -> FeedView {
        FeedView::from_result(&self.query.snapshot())
    }

    /// Keep the selection inside the visible rows.
    pub fn sync_selection(&mut self, len: usize) {
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    /// Select the next item in the list.
    pub fn select_next(&mut self) {
        let len = self.view().posts().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i, // Stay at end
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item in the list.
    pub fn select_prev(&mut self) {
        if self.view().posts().is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    /// Route for the row at `index`, as pressing it would navigate.
    pub fn route_for(&self, index: usize) -> Option<Route> {
        self.view().posts().get(index).map(|post| Route::Post {
            id: post.route_id(),
        })
    }

    /// Route for the selected row.
    pub fn open_selected(&self) -> Option<Route> {
        self.route_for(self.list_state.selected()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::FetchError;

    fn posts(n: u64) -> Vec<Post> {
        (1..=n)
            .map(|i| Post {
                id: i,
                title: format!("Post {}", i),
                body: format!("Body {}", i),
                user_id: 1,
            })
            .collect()
    }

    fn result(data: Option<Vec<Post>>, error: Option<FetchError>) -> QueryResult<Vec<Post>> {
        let settled = data.is_some() || error.is_some();
        QueryResult {
            data: data.map(Arc::new),
            error,
            is_loading: !settled,
            is_fetching: !settled,
            is_refetching: false,
            updated_at: None,
        }
    }

    #[test]
    fn test_loading_before_anything_settles() {
        assert_eq!(FeedView::from_result(&result(None, None)), FeedView::Loading);
    }

    #[test]
    fn test_error_message_and_fallback() {
        let view = FeedView::from_result(&result(None, Some(FetchError::transport("Network error"))));
        assert_eq!(view, FeedView::Error("Error: Network error".to_string()));

        let view = FeedView::from_result(&result(None, Some(FetchError::transport(""))));
        assert_eq!(view, FeedView::Error("Error: An error occurred".to_string()));
    }

    #[test]
    fn test_error_takes_precedence_over_stale_posts() {
        let view = FeedView::from_result(&result(
            Some(posts(3)),
            Some(FetchError::Status { status: 500 }),
        ));
        assert_eq!(view, FeedView::Error("Error: HTTP error! status: 500".to_string()));
    }

    #[test]
    fn test_empty_collection() {
        let view = FeedView::from_result(&result(Some(Vec::new()), None));
        assert_eq!(view, FeedView::Empty);
        assert!(view.posts().is_empty());
    }

    #[test]
    fn test_short_collection_shown_in_full() {
        let view = FeedView::from_result(&result(Some(posts(10)), None));
        assert_eq!(view.posts().len(), 10);
        assert_eq!(view.posts()[0].title, "Post 1");

        let view = FeedView::from_result(&result(Some(posts(20)), None));
        assert_eq!(view.posts().len(), 20);
    }

    #[test]
    fn test_long_collection_capped_at_twenty() {
        let view = FeedView::from_result(&result(Some(posts(50)), None));
        let shown = view.posts();

        assert_eq!(shown.len(), ITEMS_PER_PAGE);
        assert_eq!(shown.first().map(|p| p.id), Some(1));
        assert_eq!(shown.last().map(|p| p.id), Some(20));
    }

    #[test]
    fn test_refreshing_flag_follows_refetch() {
        let mut snapshot = result(Some(posts(2)), None);
        snapshot.is_fetching = true;
        snapshot.is_refetching = true;

        match FeedView::from_result(&snapshot) {
            FeedView::Posts { posts, refreshing } => {
                assert_eq!(posts.len(), 2);
                assert!(refreshing);
            }
            other => panic!("expected posts, got {:?}", other),
        }
    }
}
