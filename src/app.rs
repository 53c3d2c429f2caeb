// App state and main event loop.
// Owns the query client, navigation stack, and keyboard input handling.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;

use crate::query::QueryClient;
use crate::state::{DetailState, FeedState, NavigationStack, Route};
use crate::ui;

const GC_INTERVAL: Duration = Duration::from_secs(60);

/// Main application state.
///
/// Must be created inside a tokio runtime: views start their fetches on
/// construction and navigation.
pub struct App {
    client: Arc<QueryClient>,
    /// Back stack of routes.
    pub nav: NavigationStack,
    /// Feed view state, alive for the whole session.
    pub feed: FeedState,
    /// Detail view state while a post is open.
    pub detail: Option<DetailState>,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
    last_gc: Instant,
}

impl App {
    pub fn new(client: Arc<QueryClient>) -> Self {
        let feed = FeedState::new(&client);
        feed.mount();

        Self {
            client,
            nav: NavigationStack::default(),
            feed,
            detail: None,
            show_help: false,
            should_quit: false,
            last_gc: Instant::now(),
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
            self.tick();
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.refresh_current(),
            KeyCode::Char('R') => self.reload_all(),
            KeyCode::Esc | KeyCode::Backspace => self.go_back(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter => {
                if matches!(self.nav.current(), Route::Feed) {
                    if let Some(route) = self.feed.open_selected() {
                        self.navigate(route);
                    }
                }
            }
            _ => {}
        }
    }

    /// Push `route` and mount its view.
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(path = %route.path(), depth = self.nav.depth() + 1, "navigate");
        match &route {
            Route::Feed => self.feed.mount(),
            Route::Post { id } => {
                let detail = DetailState::new(&self.client, id);
                detail.mount();
                self.detail = Some(detail);
            }
        }
        self.nav.push(route);
    }

    /// Pop back to the previous route. The feed remounts on cached data.
    pub fn go_back(&mut self) {
        if self.nav.pop() {
            tracing::debug!(path = %self.nav.current().path(), depth = self.nav.depth(), "back");
            if matches!(self.nav.current(), Route::Feed) {
                self.detail = None;
                self.feed.mount();
            }
        }
    }

    fn refresh_current(&self) {
        match self.nav.current() {
            Route::Feed => self.feed.refresh(),
            Route::Post { .. } => {
                if let Some(detail) = &self.detail {
                    detail.refresh();
                }
            }
        }
    }

    /// Mark every cached entry stale and refetch the current view.
    fn reload_all(&self) {
        self.client.invalidate();
        self.refresh_current();
    }

    fn select_next(&mut self) {
        match self.nav.current() {
            Route::Feed => self.feed.select_next(),
            Route::Post { .. } => {
                if let Some(detail) = &mut self.detail {
                    detail.scroll_down();
                }
            }
        }
    }

    fn select_prev(&mut self) {
        match self.nav.current() {
            Route::Feed => self.feed.select_prev(),
            Route::Post { .. } => {
                if let Some(detail) = &mut self.detail {
                    detail.scroll_up();
                }
            }
        }
    }

    /// Periodic housekeeping between frames.
    fn tick(&mut self) {
        if self.last_gc.elapsed() >= GC_INTERVAL {
            let dropped = self.client.collect_garbage();
            if dropped > 0 {
                tracing::debug!(dropped, "collected idle cache entries");
            }
            self.last_gc = Instant::now();
        }
    }
}
