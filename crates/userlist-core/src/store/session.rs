use tracing::warn;

use super::{KeyValueStore, MemoryStore};

/// Session key holding the reload-suppression marker.
pub const RELOADED_KEY: &str = "isUsersReloaded";

const RELOADED_VALUE: &str = "true";

/// Reload-suppression flag: once the user reloads by hand, the watchdog
/// stays quiet until the session ends. There is no way to unset it.
pub struct SessionFlag<S: KeyValueStore = MemoryStore> {
    store: S,
}

impl<S: KeyValueStore> SessionFlag<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn is_set(&self) -> bool {
        match self.store.get(RELOADED_KEY) {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read session flag");
                false
            }
        }
    }

    pub fn set(&mut self) {
        if let Err(e) = self.store.set(RELOADED_KEY, RELOADED_VALUE) {
            warn!(error = %e, "Failed to write session flag");
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl Default for SessionFlag<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}
