// Navigation state management.
// Maps routes to paths and keeps the back stack for the feed and detail views.

/// A node in the navigation breadcrumb trail.
#[derive(Debug, Clone)]
pub struct BreadcrumbNode {
    /// Display label for the breadcrumb.
    pub label: String,
    /// The route this node represents.
    pub route: Route,
}

/// A screen the application can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The post list. Takes no parameters.
    Feed,
    /// A single post; `id` is the string form of the post identifier.
    Post { id: String },
}

impl Route {
    /// Get the header title for this route.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Feed => "Feed",
            Route::Post { .. } => "Post Details",
        }
    }

    /// Path form: `/` for the feed, `/{id}` for a post.
    pub fn path(&self) -> String {
        match self {
            Route::Feed => "/".to_string(),
            Route::Post { id } => format!("/{}", id),
        }
    }

    /// Parse a path produced by `path`.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;
        if rest.is_empty() {
            Some(Route::Feed)
        } else if rest.contains('/') {
            None
        } else {
            Some(Route::Post {
                id: rest.to_string(),
            })
        }
    }

    /// Create a breadcrumb node for this route.
    pub fn to_breadcrumb(&self) -> BreadcrumbNode {
        let label = match self {
            Route::Feed => "Feed".to_string(),
            Route::Post { id } => format!("#{}", id),
        };
        BreadcrumbNode {
            label,
            route: self.clone(),
        }
    }
}

/// Navigation back stack.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    /// Stack of routes (bottom = root, top = current)
    stack: Vec<Route>,
}

impl NavigationStack {
    /// Create a new navigation stack starting at the given route.
    pub fn new(root: Route) -> Self {
        Self { stack: vec![root] }
    }

    /// Get the current route.
    pub fn current(&self) -> &Route {
        self.stack.last().expect("Stack should never be empty")
    }

    /// Push a new route onto the stack (drill down).
    pub fn push(&mut self, route: Route) {
        self.stack.push(route);
    }

    /// Pop the current route (go back). Returns false if at root.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Check if we can go back (not at root).
    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    /// Get the breadcrumb trail.
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbNode> {
        self.stack.iter().map(Route::to_breadcrumb).collect()
    }

    /// Get the depth of the navigation stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(Route::Feed)
    }
}
