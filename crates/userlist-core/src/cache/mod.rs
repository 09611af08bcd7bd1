//! Persisted cache of the user set.
//!
//! A single entry under `userListData` holds the users plus the time they
//! were written. Entries older than the TTL (24 hours by default) are purged
//! on read. Writes are best-effort; a blob that cannot be decoded is
//! reported so the caller can tell the user.

pub mod manager;

pub use manager::{CacheError, CachedUsers, UserCache, DEFAULT_TTL, STORAGE_KEY};
