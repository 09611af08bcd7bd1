//! Synchronization controller.
//!
//! Decides between cache and network, keeps the persisted cache in step with
//! deletions, and drives the projector and the watchdog.
//!
//! The controller never blocks. A fetch runs on a spawned tokio task and
//! reports back through a channel; the host calls [`Controller::pump`] from
//! its event loop to apply finished fetches, due retries and watchdog
//! mutations. A controller must therefore be used inside a tokio runtime.
//!
//! At most one fetch is in flight. A load requested while one is pending
//! attaches to it instead of starting another, and every fetch carries a
//! token so a result that arrives after `dispose` is dropped.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::{FetchError, UserSource};
use crate::cache::UserCache;
use crate::models::User;
use crate::mount::{Mount, NoticeKind};
use crate::render::{RenderProjector, RenderStrategy};
use crate::store::{KeyValueStore, MemoryStore, SessionFlag};
use crate::watchdog::Watchdog;

/// Delay before retrying a load after a delete found no data.
pub const NO_DATA_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Delay between `init` and the watchdog starting to observe.
pub const WATCHDOG_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Title built into the container.
pub const DEFAULT_TITLE: &str = "User List";

/// Buffer size for the fetch result channel.
/// Only one fetch is in flight per token, so a few slots suffice.
const CHANNEL_BUFFER_SIZE: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("No user data found to delete from")]
    EmptyDataOnDelete,
}

/// What the controller currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Empty,
    Loading,
    Loaded(Vec<User>),
    Errored,
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Empty => "Empty",
            ViewState::Loading => "Loading",
            ViewState::Loaded(_) => "Loaded",
            ViewState::Errored => "Error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub title: String,
    pub render_strategy: RenderStrategy,
    pub watchdog_settle: Duration,
    pub retry_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            render_strategy: RenderStrategy::default(),
            watchdog_settle: WATCHDOG_SETTLE_DELAY,
            retry_delay: NO_DATA_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadToken(u64);

struct LoadOutcome {
    token: LoadToken,
    result: Result<Vec<User>, FetchError>,
}

pub struct Controller<S: KeyValueStore, F: UserSource, Q: KeyValueStore = MemoryStore> {
    cache: UserCache<S>,
    source: Arc<F>,
    session: SessionFlag<Q>,
    projector: RenderProjector,
    options: ControllerOptions,

    mount: Mount,
    view: ViewState,
    watchdog: Option<Watchdog>,

    in_flight: Option<LoadToken>,
    next_token: u64,
    retry_at: Option<Instant>,

    results_tx: mpsc::Sender<LoadOutcome>,
    results_rx: mpsc::Receiver<LoadOutcome>,
}

impl<S: KeyValueStore, F: UserSource, Q: KeyValueStore> Controller<S, F, Q> {
    pub fn new(
        cache: UserCache<S>,
        source: F,
        session: SessionFlag<Q>,
        options: ControllerOptions,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            cache,
            source: Arc::new(source),
            session,
            projector: RenderProjector::new(options.render_strategy),
            options,
            mount: Mount::new(),
            view: ViewState::Empty,
            watchdog: None,
            in_flight: None,
            next_token: 0,
            retry_at: None,
            results_tx,
            results_rx,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Reset the container, build it, load data and schedule the watchdog.
    /// Calling it again starts over cleanly.
    pub fn init(&mut self) {
        self.dispose();
        self.mount.reset();
        self.mount.build(&self.options.title);
        self.view = ViewState::Empty;

        self.check_and_load_data();
        self.watchdog = Some(Watchdog::schedule(self.options.watchdog_settle));
    }

    /// Detach the watchdog and forget pending work. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(mut watchdog) = self.watchdog.take() {
            watchdog.dispose(&mut self.mount);
        }
        if self.in_flight.take().is_some() {
            debug!("Abandoning in-flight user fetch");
        }
        self.retry_at = None;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Show cached users if the cache is warm, otherwise start a fetch.
    ///
    /// Joining a fetch already in flight leaves the current notice up; only
    /// a load that actually starts clears it.
    pub fn check_and_load_data(&mut self) {
        if self.in_flight.is_some() {
            debug!("User fetch already in flight, attaching to it");
            return;
        }

        self.mount.clear_notice();
        self.view = ViewState::Loading;

        match self.cache.load() {
            Ok(Some(users)) => {
                debug!(count = users.len(), "Serving users from cache");
                self.show(users);
                return;
            }
            Ok(None) => debug!("User cache empty"),
            Err(e) => {
                error!(error = %e, "Saved user data could not be read");
                self.mount.show_notice(NoticeKind::StorageUnreadable);
            }
        }

        self.start_fetch();
    }

    /// Remove the user with `id` from the cached set and re-render.
    ///
    /// The cache, not the in-memory view, is the source of truth here.
    /// Returns whether a user was actually removed. With no cached set a
    /// notice is shown and a reload is scheduled.
    pub fn delete_user(&mut self, id: i64) -> Result<bool, SyncError> {
        let cached = match self.cache.load() {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Saved user data could not be read");
                None
            }
        };

        let Some(users) = cached else {
            warn!(id, "No cached users to delete from, scheduling reload");
            self.mount.show_notice(NoticeKind::NoData);
            self.schedule_retry();
            return Err(SyncError::EmptyDataOnDelete);
        };

        let before = users.len();
        let remaining: Vec<User> = users.into_iter().filter(|u| u.id != id).collect();
        let removed = remaining.len() < before;
        debug!(id, removed, remaining = remaining.len(), "Deleting user");

        self.cache.save(&remaining);
        self.show(remaining);
        Ok(removed)
    }

    /// The user asked for a reload: suppress the watchdog for the session,
    /// drop the cache and load again.
    pub fn manual_reload(&mut self) {
        info!("Manual reload requested");
        self.session.set();
        self.cache.clear();
        self.mount.remove_reload();
        self.check_and_load_data();
    }

    /// Apply finished fetches, run a due retry and let the watchdog look at
    /// new mutations. Call this from the host's event loop.
    pub fn pump(&mut self) {
        while let Ok(outcome) = self.results_rx.try_recv() {
            self.apply_outcome(outcome);
        }

        if self.retry_at.is_some_and(|at| Instant::now() >= at) {
            self.retry_at = None;
            debug!("Running scheduled reload");
            self.check_and_load_data();
        }

        let suppressed = self.session.is_set();
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.poll(&mut self.mount, suppressed);
        }
    }

    /// Resolve once a pending fetch has finished, then pump. Returns
    /// immediately when nothing is in flight.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            match self.results_rx.recv().await {
                Some(outcome) => self.apply_outcome(outcome),
                None => break,
            }
        }
        self.pump();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    /// Mutable access for agents outside the controller.
    pub fn mount_mut(&mut self) -> &mut Mount {
        &mut self.mount
    }

    pub fn cache(&self) -> &UserCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut UserCache<S> {
        &mut self.cache
    }

    pub fn session(&self) -> &SessionFlag<Q> {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn retry_pending(&self) -> bool {
        self.retry_at.is_some()
    }

    pub fn watchdog_observing(&self) -> bool {
        self.watchdog.as_ref().is_some_and(|w| w.is_observing())
    }

    pub fn cache_age(&self) -> Option<String> {
        self.cache.age_display()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn show(&mut self, users: Vec<User>) {
        self.projector.render(&mut self.mount, &users);
        self.view = ViewState::Loaded(users);
    }

    fn schedule_retry(&mut self) {
        if self.retry_at.is_none() {
            self.retry_at = Some(Instant::now() + self.options.retry_delay);
        }
    }

    fn start_fetch(&mut self) {
        self.next_token += 1;
        let token = LoadToken(self.next_token);
        self.in_flight = Some(token);

        info!("Fetching users from remote source");

        let source = Arc::clone(&self.source);
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_all().await;
            if let Err(e) = tx.send(LoadOutcome { token, result }).await {
                // The controller is gone
                debug!(error = %e, "Dropping user fetch result");
            }
        });
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        if self.in_flight != Some(outcome.token) {
            debug!(token = outcome.token.0, "Dropping superseded user fetch result");
            return;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(users) => {
                info!(count = users.len(), "Users fetched");
                self.cache.save(&users);
                self.show(users);
            }
            Err(e) => {
                error!(error = %e.detail(), "User fetch failed");
                self.view = ViewState::Errored;
                self.mount.show_notice(NoticeKind::FetchFailed);
            }
        }
    }
}
