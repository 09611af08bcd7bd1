//! Key-value stores backing the cache and the session flag.
//!
//! - `FileStore`: persisted store, one JSON file per key
//! - `MemoryStore`: lives as long as the process (the "session")
//! - `SessionFlag`: the reload-suppression marker kept in a session store

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::SessionFlag;

use anyhow::Result;

/// String key-value storage with local-storage semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}
