// Detail view state management.
// Resolves a single post query into loading, error, or the post's title and body.

use crate::api::Post;
use crate::query::{QueryClient, QueryObserver, QueryResult};

use super::error_message;

pub const NOT_FOUND: &str = "Post not found";

/// What the detail view shows, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
    Loading,
    /// Failure or missing post; already formatted for display.
    Error(String),
    /// Title and body are kept apart so each renders as its own text.
    Post { title: String, body: String },
}

impl DetailView {
    pub fn from_result(result: &QueryResult<Post>) -> Self {
        if result.is_loading {
            return DetailView::Loading;
        }
        if let Some(error) = &result.error {
            return DetailView::Error(error_message(error, NOT_FOUND));
        }
        match result.data.as_deref() {
            Some(post) => DetailView::Post {
                title: post.title.clone(),
                body: post.body.clone(),
            },
            None => DetailView::Error(format!("Error: {}", NOT_FOUND)),
        }
    }
}

/// State for the detail view of one post.
pub struct DetailState {
    id: String,
    query: QueryObserver<Post>,
    pub scroll: u16,
}

impl DetailState {
    /// Bind to the post `id`, seeding from the cached feed when possible.
    pub fn new(client: &QueryClient, id: &str) -> Self {
        Self {
            id: id.to_string(),
            query: client.post_query(id),
            scroll: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mount(&self) {
        self.query.mount();
    }

    pub fn refresh(&self) {
        self.query.refetch();
    }

    pub fn query(&self) -> &QueryObserver<Post> {
        &self.query
    }

    pub fn view(&self) -> DetailView {
        DetailView::from_result(&self.query.snapshot())
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}
