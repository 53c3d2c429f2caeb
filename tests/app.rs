//! Query, view-state, and navigation tests over an in-memory post source.
//!
//! The fake source counts calls and can hold the collection fetch open so
//! tests can observe the state of the views while a request is pending.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::KeyCode;
use feedview::api::{Post, PostSource};
use feedview::app::App;
use feedview::error::FetchError;
use feedview::query::{QueryClient, QueryOptions};
use feedview::state::{DetailView, FeedView, Route};
use ratatui::{Terminal, backend::TestBackend};
use tokio::sync::Notify;

#[derive(Default)]
struct FakeSource {
    posts: Vec<Post>,
    fail_with: Option<FetchError>,
    hold: AtomicBool,
    release: Notify,
    list_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl FakeSource {
    fn with_posts(n: u64) -> Self {
        Self {
            posts: sample_posts(n),
            ..Default::default()
        }
    }

    fn failing(error: FetchError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PostSource for FakeSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(self.posts.clone()),
        }
    }

    async fn fetch_post(&self, id: &str) -> Result<Post, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.posts
            .iter()
            .find(|post| post.id.to_string() == id)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}

fn sample_posts(n: u64) -> Vec<Post> {
    (1..=n)
        .map(|i| Post {
            id: i,
            title: format!("Post {}", i),
            body: format!("Body {}", i),
            user_id: 1,
        })
        .collect()
}

fn query_client(source: &Arc<FakeSource>) -> Arc<QueryClient> {
    let source: Arc<dyn PostSource> = source.clone();
    Arc::new(QueryClient::new(source, QueryOptions::no_retry()))
}

/// Poll `condition` until it holds or a second passes.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached in time");
}

fn render(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
    terminal.draw(|frame| feedview::ui::draw(frame, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[tokio::test]
async fn posts_query_loads_then_serves_cache() {
    let source = Arc::new(FakeSource::with_posts(2));
    let client = query_client(&source);

    let query = client.posts_query();
    assert!(query.snapshot().is_loading);
    assert!(query.snapshot().data.is_none());

    query.mount().unwrap().await.unwrap().unwrap();
    let snapshot = query.snapshot();
    assert!(!snapshot.is_loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.data.as_deref(), Some(&sample_posts(2)));

    // A second observer on the same key does not hit the source.
    assert!(client.posts_query().mount().is_none());
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_collection_surfaces_error_without_data() {
    let source = Arc::new(FakeSource::failing(FetchError::transport("Network error")));
    let client = query_client(&source);

    let query = client.posts_query();
    assert!(query.mount().unwrap().await.unwrap().is_err());

    let snapshot = query.snapshot();
    assert!(snapshot.data.is_none());
    assert_eq!(snapshot.error, Some(FetchError::transport("Network error")));
    assert!(!snapshot.is_loading);
    assert_eq!(
        FeedView::from_result(&snapshot),
        FeedView::Error("Error: Network error".to_string())
    );
}

#[tokio::test]
async fn refetch_keeps_previous_posts_visible() {
    let source = Arc::new(FakeSource::with_posts(3));
    let client = query_client(&source);

    let query = client.posts_query();
    query.mount().unwrap().await.unwrap().unwrap();

    source.hold.store(true, Ordering::SeqCst);
    let pending = query.refetch().unwrap();
    wait_until(|| source.list_calls.load(Ordering::SeqCst) == 2).await;

    let snapshot = query.snapshot();
    assert!(snapshot.is_refetching);
    assert!(!snapshot.is_loading);
    match FeedView::from_result(&snapshot) {
        FeedView::Posts { posts, refreshing } => {
            assert_eq!(posts.len(), 3);
            assert!(refreshing);
        }
        other => panic!("expected stale posts during refetch, got {:?}", other),
    }

    source.release.notify_one();
    pending.await.unwrap().unwrap();
    assert!(!query.snapshot().is_refetching);
}

#[tokio::test]
async fn detail_without_seed_loads_from_source() {
    let source = Arc::new(FakeSource::with_posts(3));
    let client = query_client(&source);

    let detail = client.post_query("3");
    assert_eq!(DetailView::from_result(&detail.snapshot()), DetailView::Loading);

    detail.mount().unwrap().await.unwrap().unwrap();
    assert_eq!(
        DetailView::from_result(&detail.snapshot()),
        DetailView::Post {
            title: "Post 3".to_string(),
            body: "Body 3".to_string(),
        }
    );
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_detail_surfaces_error_without_data() {
    let source = Arc::new(FakeSource::with_posts(1));
    let client = query_client(&source);

    let detail = client.post_query("8");
    assert!(detail.mount().unwrap().await.unwrap().is_err());

    let snapshot = detail.snapshot();
    assert!(snapshot.data.is_none());
    assert_eq!(
        DetailView::from_result(&snapshot),
        DetailView::Error("Error: HTTP error! status: 404".to_string())
    );
}

#[tokio::test]
async fn empty_id_disables_detail_query() {
    let source = Arc::new(FakeSource::with_posts(1));
    let client = query_client(&source);

    let detail = client.post_query("");
    assert!(!detail.is_enabled());
    assert!(detail.mount().is_none());
    assert!(detail.refetch().is_none());
    assert_eq!(
        DetailView::from_result(&detail.snapshot()),
        DetailView::Error("Error: Post not found".to_string())
    );
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn selecting_a_post_opens_its_route() {
    let source = Arc::new(FakeSource::with_posts(5));
    let mut app = App::new(query_client(&source));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    app.handle_key(KeyCode::Down);
    app.handle_key(KeyCode::Down);
    app.handle_key(KeyCode::Down);
    assert_eq!(app.feed.route_for(2).map(|r| r.path()), Some("/3".to_string()));

    app.handle_key(KeyCode::Enter);
    assert_eq!(
        app.nav.current(),
        &Route::Post {
            id: "3".to_string()
        }
    );
    assert_eq!(app.nav.current().path(), "/3");

    // Seeded from the feed: shown at once, no detail request.
    let detail = app.detail.as_ref().unwrap();
    assert_eq!(
        detail.view(),
        DetailView::Post {
            title: "Post 3".to_string(),
            body: "Body 3".to_string(),
        }
    );
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 0);

    app.handle_key(KeyCode::Esc);
    assert_eq!(app.nav.current(), &Route::Feed);
    assert!(app.detail.is_none());
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_key_refetches_feed() {
    let source = Arc::new(FakeSource::with_posts(2));
    let mut app = App::new(query_client(&source));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    app.handle_key(KeyCode::Char('r'));
    wait_until(|| source.list_calls.load(Ordering::SeqCst) == 2).await;
    wait_until(|| !app.feed.query().snapshot().is_fetching).await;

    assert_eq!(app.feed.view().posts().len(), 2);
}

#[tokio::test]
async fn reload_key_makes_seeded_posts_stale() {
    let source = Arc::new(FakeSource::with_posts(2));
    let mut app = App::new(query_client(&source));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    app.navigate(Route::Post {
        id: "2".to_string(),
    });
    app.handle_key(KeyCode::Esc);
    assert_eq!(source.item_calls.load(Ordering::SeqCst), 0);

    app.handle_key(KeyCode::Char('R'));
    wait_until(|| source.list_calls.load(Ordering::SeqCst) == 2).await;
    wait_until(|| !app.feed.query().snapshot().is_fetching).await;

    app.navigate(Route::Post {
        id: "2".to_string(),
    });
    wait_until(|| source.item_calls.load(Ordering::SeqCst) == 1).await;
}

#[tokio::test]
async fn feed_cache_outlives_gc_while_detail_is_open() {
    let source = Arc::new(FakeSource::with_posts(3));
    let options = QueryOptions {
        gc_time: Duration::ZERO,
        ..QueryOptions::no_retry()
    };
    let client = Arc::new(QueryClient::new(source.clone(), options));
    let mut app = App::new(Arc::clone(&client));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    app.navigate(Route::Post {
        id: "2".to_string(),
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(client.collect_garbage(), 0);

    app.handle_key(KeyCode::Esc);
    assert_eq!(client.collect_garbage(), 1);
    assert_eq!(app.feed.view().posts().len(), 3);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn help_overlay_swallows_keys_until_closed() {
    let source = Arc::new(FakeSource::with_posts(1));
    let mut app = App::new(query_client(&source));

    app.handle_key(KeyCode::Char('?'));
    assert!(app.show_help);

    app.handle_key(KeyCode::Char('q'));
    assert!(!app.show_help);
    assert!(!app.should_quit);

    app.handle_key(KeyCode::Char('q'));
    assert!(app.should_quit);
}

#[tokio::test]
async fn renders_loading_label_first() {
    let source = Arc::new(FakeSource::with_posts(1));
    source.hold.store(true, Ordering::SeqCst);
    let mut app = App::new(query_client(&source));

    let screen = render(&mut app);
    assert!(screen.contains("Loading"));

    source.release.notify_one();
}

#[tokio::test]
async fn renders_empty_state_without_list() {
    let source = Arc::new(FakeSource::with_posts(0));
    let mut app = App::new(query_client(&source));
    wait_until(|| app.feed.view() == FeedView::Empty).await;

    let screen = render(&mut app);
    assert!(screen.contains("Data is empty right now"));
    assert!(!screen.contains("Feed ("));
}

#[tokio::test]
async fn renders_at_most_twenty_rows() {
    let source = Arc::new(FakeSource::with_posts(50));
    let mut app = App::new(query_client(&source));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    let screen = render(&mut app);
    assert!(screen.contains("Feed (20)"));
    assert!(!screen.contains("Esc Back"));
    assert!(screen.contains("Post 1"));
    assert_eq!(app.feed.view().posts().len(), 20);
}

#[tokio::test]
async fn renders_detail_title_and_body() {
    let source = Arc::new(FakeSource::with_posts(2));
    let mut app = App::new(query_client(&source));
    wait_until(|| matches!(app.feed.view(), FeedView::Posts { .. })).await;

    app.navigate(Route::Post {
        id: "2".to_string(),
    });

    let screen = render(&mut app);
    assert!(screen.contains("Post 2"));
    assert!(screen.contains("Body 2"));
    assert!(screen.contains("Post Details"));
    assert!(screen.contains("Esc Back"));
}
