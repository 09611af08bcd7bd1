//! Application state for the userlist terminal host.
//!
//! `App` owns the synchronization controller and the bits of UI state that
//! live outside it (selection, overlays). Everything the list shows is read
//! back from the controller's mount.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use userlist_core::{
    ApiClient, Config, Controller, FileStore, SessionFlag, SyncError, UserCache,
};

pub type UserController = Controller<FileStore, ApiClient>;

/// Number of cards to jump on PgUp/PgDn
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Main application state container
pub struct App {
    pub config: Config,
    pub controller: UserController,
    pub state: AppState,
    /// Index into the rendered cards.
    pub selection: usize,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let store = FileStore::new(cache_dir)?;
        let cache = UserCache::with_ttl(store, config.cache_ttl());
        let api = ApiClient::new(config.api_url.clone(), config.request_timeout())
            .context("Failed to build HTTP client")?;

        let controller =
            Controller::new(cache, api, SessionFlag::default(), config.controller_options());

        Ok(Self {
            config,
            controller,
            state: AppState::Normal,
            selection: 0,
            status_message: None,
        })
    }

    pub fn init(&mut self) {
        info!(url = %self.config.api_url, "Initializing user list");
        self.controller.init();
        self.selection = 0;
    }

    /// Drive the controller and keep the selection on a real card.
    pub fn tick(&mut self) {
        self.controller.pump();
        self.selection = clamp_selection(self.selection, self.card_count());
    }

    pub fn card_count(&self) -> usize {
        self.controller.mount().card_count()
    }

    pub fn selected_card_id(&self) -> Option<i64> {
        self.controller
            .mount()
            .cards()
            .get(self.selection)
            .map(|c| c.id)
    }

    pub fn select_next(&mut self, step: usize) {
        self.selection = clamp_selection(self.selection.saturating_add(step), self.card_count());
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    /// The delete control of the selected card.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_card_id() else {
            return;
        };

        match self.controller.delete_user(id) {
            Ok(true) => self.status_message = Some(format!("Deleted user {}", id)),
            Ok(false) => self.status_message = None,
            Err(SyncError::EmptyDataOnDelete) => self.status_message = None,
        }
        self.selection = clamp_selection(self.selection, self.card_count());
    }

    /// The reload control. Only active while the affordance is visible.
    pub fn activate_reload(&mut self) -> bool {
        if !self.controller.mount().reload_visible() {
            return false;
        }
        self.controller.manual_reload();
        self.selection = 0;
        self.status_message = Some("Reloading users...".to_string());
        true
    }

    /// Wipe the rendered list without going through the controller, the
    /// way an unrelated script would.
    pub fn wipe_externally(&mut self) {
        info!("Rendered list wiped externally");
        self.controller.mount_mut().clear_list();
        self.status_message = Some("List wiped externally".to_string());
    }

    pub fn status_line(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }

        let age = self
            .controller
            .cache_age()
            .unwrap_or_else(|| "never".to_string());
        format!("{} | Updated {}", self.controller.view().label(), age)
    }
}

/// Keep `selection` inside `0..count` (0 when empty).
pub fn clamp_selection(selection: usize, count: usize) -> usize {
    selection.min(count.saturating_sub(1))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_selection() {
        assert_eq!(clamp_selection(0, 0), 0);
        assert_eq!(clamp_selection(5, 0), 0);
        assert_eq!(clamp_selection(2, 3), 2);
        assert_eq!(clamp_selection(3, 3), 2);
        assert_eq!(clamp_selection(100, 10), 9);
    }
}
