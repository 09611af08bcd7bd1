//! Integrity watchdog for the rendered list.
//!
//! Subscribes to the mount once a settle delay after installation has
//! passed. Whenever a batch of mutations arrives and the list holds no
//! cards, it shows the reload affordance unless the session's
//! reload-suppression flag is set.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::mount::{Mount, Subscription};

enum WatchState {
    Pending { install_at: Instant },
    Observing(Subscription),
    Disposed,
}

pub struct Watchdog {
    state: WatchState,
}

impl Watchdog {
    /// Install after `settle` has elapsed, counted from now.
    pub fn schedule(settle: Duration) -> Self {
        Self {
            state: WatchState::Pending {
                install_at: Instant::now() + settle,
            },
        }
    }

    pub fn is_observing(&self) -> bool {
        matches!(self.state, WatchState::Observing(_))
    }

    /// Install if due, then handle pending mutations. Returns true when the
    /// reload affordance was shown by this call.
    pub fn poll(&mut self, mount: &mut Mount, suppressed: bool) -> bool {
        if let WatchState::Pending { install_at } = self.state {
            if Instant::now() < install_at {
                return false;
            }
            let subscription = mount.subscribe();
            debug!(subscription = subscription.id(), "Watchdog observing user list");
            self.state = WatchState::Observing(subscription);
        }

        let WatchState::Observing(subscription) = &mut self.state else {
            return false;
        };

        if subscription.drain().is_empty() {
            return false;
        }

        if suppressed || mount.card_count() > 0 {
            return false;
        }

        let shown = mount.show_reload();
        if shown {
            info!("User list emptied, offering manual reload");
        }
        shown
    }

    /// Detach from the mount. Safe to call more than once.
    pub fn dispose(&mut self, mount: &mut Mount) {
        if let WatchState::Observing(subscription) = &self.state {
            mount.unsubscribe(subscription.id());
        }
        self.state = WatchState::Disposed;
    }
}
