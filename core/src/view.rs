//! Headless presentation binding for the posts list.
//!
//! `PostsView` owns what a screen would render: the loaded posts, a pending
//! flag for the loading indicator and the latest error message. It listens
//! to the gateway's error bus from `activate` until `teardown` (or drop). The
//! bus is the only writer of the displayed error, so failures of background
//! creates and of this view's own calls show up the same way, once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::bus::Subscription;
use crate::gateway::PostsGateway;
use crate::transport::Transport;
use crate::types::Post;

/// Snapshot of what the view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub loaded_posts: Vec<Post>,
    /// True while at least one fetch is awaiting its outcome.
    pub is_fetching: bool,
    /// Latest error observed; a newer one replaces it.
    pub error: Option<String>,
}

pub struct PostsView<T: Transport> {
    gateway: PostsGateway<T>,
    state: Arc<Mutex<ViewState>>,
    fetches_in_flight: Mutex<usize>,
    subscription: Option<Subscription>,
}

impl<T: Transport> PostsView<T> {
    pub fn new(gateway: PostsGateway<T>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(ViewState::default())),
            fetches_in_flight: Mutex::new(0),
            subscription: None,
        }
    }

    /// Start listening for errors and load the posts. Activating twice keeps
    /// the single existing subscription.
    pub async fn activate(&mut self) {
        if self.subscription.is_none() {
            let state = Arc::clone(&self.state);
            let handle = self.gateway.errors().subscribe(move |event| {
                lock(&state).error = Some(event.message.clone());
            });
            self.subscription = Some(handle);
        }
        self.on_fetch_posts().await;
    }

    pub fn on_create_post(&self, title: &str, content: &str) -> JoinHandle<()> {
        self.gateway.create_and_store(title, content)
    }

    /// Overlapping fetches each replace the list as they complete; the
    /// pending flag clears only when the last one has finished.
    pub async fn on_fetch_posts(&self) {
        let pending = PendingFetch::start(&self.fetches_in_flight, &self.state);
        let result = self.gateway.fetch_all().await;
        drop(pending);
        // Failures reach `error` through the bus subscription.
        if let Ok(posts) = result {
            lock(&self.state).loaded_posts = posts;
        }
    }

    /// Delete everything remotely; the local list is cleared only once the
    /// store has confirmed. A failure is shown through the subscription.
    pub async fn on_clear_posts(&self) {
        if self.gateway.delete_all().await.is_ok() {
            lock(&self.state).loaded_posts.clear();
        }
    }

    /// Dismiss the displayed error.
    pub fn on_handle_error(&self) {
        lock(&self.state).error = None;
    }

    /// Stop listening for errors. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.gateway.errors().unsubscribe(handle);
        }
    }

    pub fn state(&self) -> ViewState {
        lock(&self.state).clone()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }
}

/// Counts one fetch as in flight until dropped, so a cancelled fetch still
/// releases the pending flag.
struct PendingFetch<'a> {
    count: &'a Mutex<usize>,
    state: &'a Mutex<ViewState>,
}

impl<'a> PendingFetch<'a> {
    fn start(count: &'a Mutex<usize>, state: &'a Mutex<ViewState>) -> Self {
        let pending = Self { count, state };
        pending.adjust(1);
        pending
    }

    fn adjust(&self, delta: isize) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_add_signed(delta);
        lock(self.state).is_fetching = *count > 0;
    }
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        self.adjust(-1);
    }
}

impl<T: Transport> Drop for PostsView<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
