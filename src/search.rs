//! Debounced search and page state for post listings.
//!
//! A [`SearchController`] owns the state behind one listing view. Keystrokes go
//! through [`SearchController::set_query`], which only settles the effective
//! query once input has been quiet for the debounce period; page jumps go
//! through [`SearchController::set_page`]. Each settled change issues one
//! fetch, and responses are applied only if no later fetch was issued in the
//! meantime. Views observe the state through a watch channel.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    api::{ListParams, PostsApi},
    models::{Page, Post},
    pagination::PaginationControls,
    Config,
};

pub const BROWSE_ERROR: &str = "Failed to load posts. Please try again later.";
pub const SEARCH_ERROR: &str = "Failed to search posts. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Lists every post; an empty query still fetches.
    Browse,
    /// Only fetches once there is something to search for.
    Search,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub mode: ListMode,
    pub page_size: u32,
    pub debounce: Duration,
}

impl ControllerOptions {
    pub fn browse(config: &Config) -> Self {
        Self {
            mode: ListMode::Browse,
            page_size: config.posts_per_page,
            debounce: config.search_debounce,
        }
    }

    pub fn search(config: &Config) -> Self {
        Self {
            mode: ListMode::Search,
            page_size: config.search_per_page,
            debounce: config.search_debounce,
        }
    }

    fn error_message(&self) -> &'static str {
        match self.mode {
            ListMode::Browse => BROWSE_ERROR,
            ListMode::Search => SEARCH_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Input as typed.
    pub query: String,
    /// Debounced, trimmed query the current results belong to.
    pub effective_query: String,
    pub page: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<Post>,
    pub total: u64,
    pub total_pages: u32,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            effective_query: String::new(),
            page: 1,
            loading: false,
            error: None,
            items: Vec::new(),
            total: 0,
            total_pages: 1,
        }
    }
}

impl SearchState {
    pub fn has_query(&self) -> bool {
        !self.effective_query.is_empty()
    }

    pub fn controls(&self) -> Option<PaginationControls> {
        PaginationControls::build(self.page, self.total_pages)
    }

    fn apply(&mut self, page: Page<Post>) {
        self.total = page.total;
        self.total_pages = page.total_pages();
        self.items = page.items;
    }

    fn clear_results(&mut self, per_page: u32) {
        self.apply(Page::empty(per_page));
    }
}

/// Path that reproduces a search when opened.
pub fn share_path(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        "/search".to_string()
    } else {
        format!("/search?q={}", urlencoding::encode(query))
    }
}

struct Shared {
    api: Arc<dyn PostsApi>,
    options: ControllerOptions,
    state: watch::Sender<SearchState>,
    sequence: AtomicU64,
    fetches: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    /// Promotes the typed query to the effective one. A changed query starts
    /// over from page 1; an unchanged one is a no-op unless `force`d back to
    /// page 1.
    fn settle_query(self: &Arc<Self>, force: bool) {
        let changed = self.state.send_if_modified(|state| {
            let trimmed = state.query.trim();
            if trimmed == state.effective_query && !(force && state.page != 1) {
                return false;
            }
            state.effective_query = trimmed.to_string();
            state.page = 1;
            true
        });

        if changed {
            self.fetch();
        }
    }

    /// Runs one fetch cycle for the current (effective query, page).
    fn fetch(self: &Arc<Self>) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut params = None;

        self.state.send_modify(|state| {
            if self.options.mode == ListMode::Search && state.effective_query.is_empty() {
                state.clear_results(self.options.page_size);
                state.loading = false;
                state.error = None;
                return;
            }
            state.loading = true;
            state.error = None;
            params = Some(ListParams::new(
                state.page,
                self.options.page_size,
                state.effective_query.clone(),
            ));
        });

        let Some(params) = params else {
            tracing::debug!(seq, "Empty query, skipping fetch");
            return;
        };

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = shared.api.list_posts(&params).await;
            shared.state.send_if_modified(|state| {
                if shared.sequence.load(Ordering::SeqCst) != seq {
                    tracing::debug!(seq, "Discarding superseded response");
                    return false;
                }
                match result {
                    Ok(page) => {
                        state.apply(page);
                        state.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(seq, "Listing posts failed: {}", e);
                        state.clear_results(shared.options.page_size);
                        state.error = Some(shared.options.error_message().to_string());
                    }
                }
                state.loading = false;
                true
            });
        });

        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.retain(|h| !h.is_finished());
            fetches.push(handle);
        }
    }
}

/// Owns the listing state for one view. Must be used inside a tokio runtime.
pub struct SearchController {
    shared: Arc<Shared>,
    debounce: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(api: Arc<dyn PostsApi>, options: ControllerOptions) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            shared: Arc::new(Shared {
                api,
                options,
                state,
                sequence: AtomicU64::new(0),
                fetches: Mutex::new(Vec::new()),
            }),
            debounce: None,
        }
    }

    /// Seeds the query without debouncing, e.g. from a shared link.
    pub fn with_query(self, query: &str) -> Self {
        self.shared.state.send_modify(|state| {
            state.query = query.to_string();
            state.effective_query = query.trim().to_string();
        });
        self
    }

    pub fn mode(&self) -> ListMode {
        self.shared.options.mode
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Fetches for the current state, as when the view first opens.
    pub fn load(&mut self) {
        self.shared.fetch();
    }

    /// Records a keystroke and restarts the quiet-period timer.
    pub fn set_query(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.shared.state.send_modify(|state| state.query = raw);

        self.cancel_debounce();
        let shared = Arc::clone(&self.shared);
        let quiet = shared.options.debounce;
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            shared.settle_query(false);
        }));
    }

    /// Applies the typed query immediately and returns its shareable path.
    pub fn submit(&mut self) -> String {
        self.cancel_debounce();
        self.shared.settle_query(true);
        share_path(&self.shared.state.borrow().query)
    }

    /// Jumps to `page`. Callers keep `page` within `1..=total_pages`.
    pub fn set_page(&mut self, page: u32) {
        self.shared.state.send_modify(|state| state.page = page);
        self.shared.fetch();
    }

    fn cancel_debounce(&mut self) {
        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_debounce();
        if let Ok(mut fetches) = self.shared.fetches.lock() {
            for handle in fetches.drain(..) {
                handle.abort();
            }
        }
    }
}
