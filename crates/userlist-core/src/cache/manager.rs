use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::User;
use crate::store::KeyValueStore;

/// Persisted key holding the cache entry.
pub const STORAGE_KEY: &str = "userListData";

/// Entries older than this are stale.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Saved user data is unreadable: {0}")]
    Unreadable(#[from] serde_json::Error),
}

/// On-disk shape: `{"users": [...], "exp": <epoch millis>}`.
/// `exp` is the write time, not an expiry.
#[derive(Serialize)]
struct EntryOut<'a> {
    users: &'a [User],
    exp: i64,
}

#[derive(Deserialize)]
struct EntryIn {
    users: Option<Vec<User>>,
    exp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedUsers {
    pub users: Vec<User>,
    pub written_at: DateTime<Utc>,
}

fn is_stale(written_at: DateTime<Utc>, ttl: Duration) -> bool {
    let age_ms = (Utc::now() - written_at).num_milliseconds();
    age_ms > ttl.as_millis() as i64
}

fn format_age(written_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - written_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Cache of the user set on top of a persisted key-value store.
pub struct UserCache<S: KeyValueStore> {
    store: S,
    ttl: Duration,
    /// Write time of the entry as of the last load, save or clear.
    last_written_at: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore> UserCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            last_written_at: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Write `users` with the current time. Failures are logged, never returned.
    pub fn save(&mut self, users: &[User]) {
        let now = Utc::now();
        let entry = EntryOut {
            users,
            exp: now.timestamp_millis(),
        };

        let contents = match serde_json::to_string(&entry) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to encode user cache");
                return;
            }
        };

        if let Err(e) = self.store.set(STORAGE_KEY, &contents) {
            warn!(error = %e, "Failed to write user cache");
        } else {
            self.last_written_at = Some(now);
            debug!(count = users.len(), "User cache written");
        }
    }

    /// Cached users, or `None` when missing, incomplete or stale.
    /// A stale entry is purged.
    pub fn load(&mut self) -> Result<Option<Vec<User>>, CacheError> {
        Ok(self.load_entry()?.map(|entry| entry.users))
    }

    pub fn load_entry(&mut self) -> Result<Option<CachedUsers>, CacheError> {
        self.last_written_at = None;

        let decoded = self.decode().inspect_err(|e| {
            error!(error = %e, "User cache parse error");
        })?;
        let Some(entry) = decoded else {
            return Ok(None);
        };

        if is_stale(entry.written_at, self.ttl) {
            debug!(written_at = %entry.written_at, "User cache is stale, purging");
            self.clear();
            return Ok(None);
        }

        self.last_written_at = Some(entry.written_at);
        Ok(Some(entry))
    }

    /// Remove the entry unconditionally.
    pub fn clear(&mut self) {
        self.last_written_at = None;
        if let Err(e) = self.store.remove(STORAGE_KEY) {
            warn!(error = %e, "Failed to clear user cache");
        }
    }

    /// Age of the entry as of the last load or save, for display.
    /// Does not touch the store.
    pub fn age_display(&self) -> Option<String> {
        self.last_written_at
            .filter(|&written_at| !is_stale(written_at, self.ttl))
            .map(format_age)
    }

    fn decode(&self) -> Result<Option<CachedUsers>, CacheError> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "Failed to read user cache, treating as empty");
                return Ok(None);
            }
        };

        let parsed: EntryIn = serde_json::from_str(&raw)?;

        // A zero timestamp counts as never written
        let (Some(users), Some(exp)) = (parsed.users, parsed.exp.filter(|&exp| exp != 0)) else {
            return Ok(None);
        };

        let Some(written_at) = Utc.timestamp_millis_opt(exp).single() else {
            return Ok(None);
        };

        Ok(Some(CachedUsers { users, written_at }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use crate::store::MemoryStore;
    use chrono::Duration as ChronoDuration;

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("User {}", id),
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            address: Address::default(),
        }
    }

    fn write_raw(cache: &mut UserCache<MemoryStore>, raw: &str) {
        cache.store_mut().set(STORAGE_KEY, raw).unwrap();
    }

    fn entry_written_at(users: &[User], written_at: DateTime<Utc>) -> String {
        serde_json::to_string(&EntryOut {
            users,
            exp: written_at.timestamp_millis(),
        })
        .unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut cache = UserCache::new(MemoryStore::new());
        let users = vec![user(1), user(2), user(3)];

        cache.save(&users);
        assert_eq!(cache.load().unwrap(), Some(users));
    }

    #[test]
    fn test_load_missing_is_absent() {
        let mut cache = UserCache::new(MemoryStore::new());
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_saved_blob_shape() {
        let mut cache = UserCache::new(MemoryStore::new());
        cache.save(&[user(1)]);

        let raw = cache.store().get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["users"][0]["id"], 1);
        assert!(value["exp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_stale_entry_is_purged() {
        let mut cache = UserCache::new(MemoryStore::new());
        let old = Utc::now() - ChronoDuration::hours(25);
        write_raw(&mut cache, &entry_written_at(&[user(1)], old));

        assert_eq!(cache.load().unwrap(), None);
        assert_eq!(cache.store().get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_entry_inside_ttl_is_kept() {
        let mut cache = UserCache::new(MemoryStore::new());
        let recent = Utc::now() - ChronoDuration::hours(23);
        write_raw(&mut cache, &entry_written_at(&[user(1)], recent));

        assert_eq!(cache.load().unwrap(), Some(vec![user(1)]));
    }

    #[test]
    fn test_custom_ttl() {
        let mut cache = UserCache::with_ttl(MemoryStore::new(), Duration::from_secs(60));
        let old = Utc::now() - ChronoDuration::minutes(2);
        write_raw(&mut cache, &entry_written_at(&[user(1)], old));

        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_unreadable_blob_is_error_and_kept() {
        let mut cache = UserCache::new(MemoryStore::new());
        write_raw(&mut cache, "{not json");

        assert!(matches!(cache.load(), Err(CacheError::Unreadable(_))));
        // Unreadable entries are reported, not purged
        assert!(cache.store().get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_missing_fields_are_silently_absent() {
        let mut cache = UserCache::new(MemoryStore::new());

        write_raw(&mut cache, r#"{"users": []}"#);
        assert_eq!(cache.load().unwrap(), None);

        write_raw(&mut cache, r#"{"exp": 1700000000000}"#);
        assert_eq!(cache.load().unwrap(), None);

        write_raw(&mut cache, r#"{"users": [], "exp": 0}"#);
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_empty_user_set_is_valid() {
        let mut cache = UserCache::new(MemoryStore::new());
        cache.save(&[]);
        assert_eq!(cache.load().unwrap(), Some(vec![]));
    }

    #[test]
    fn test_clear_removes_entry() {
        let mut cache = UserCache::new(MemoryStore::new());
        cache.save(&[user(1)]);
        cache.clear();
        assert_eq!(cache.load().unwrap(), None);
        // Clearing an empty cache is fine
        cache.clear();
    }

    #[test]
    fn test_age_display() {
        let mut cache = UserCache::new(MemoryStore::new());
        assert_eq!(cache.age_display(), None);

        cache.save(&[user(1)]);
        assert_eq!(cache.age_display().as_deref(), Some("just now"));

        let earlier = Utc::now() - ChronoDuration::minutes(90);
        write_raw(&mut cache, &entry_written_at(&[user(1)], earlier));
        // Reflects the last load or save, not the raw store
        assert_eq!(cache.age_display().as_deref(), Some("just now"));
        cache.load().unwrap();
        assert_eq!(cache.age_display().as_deref(), Some("1h ago"));

        cache.clear();
        assert_eq!(cache.age_display(), None);
    }

    #[test]
    fn test_age_display_with_unreadable_blob() {
        let mut cache = UserCache::new(MemoryStore::new());
        cache.save(&[user(1)]);
        write_raw(&mut cache, "{not json");

        assert!(matches!(cache.load(), Err(CacheError::Unreadable(_))));
        assert_eq!(cache.age_display(), None);
        // Repeated reads for display stay quiet and leave the blob alone
        assert_eq!(cache.age_display(), None);
        assert_eq!(
            cache.store().get(STORAGE_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_age_display_drops_expired_entry() {
        let mut cache = UserCache::with_ttl(MemoryStore::new(), Duration::from_secs(60));
        let recent = Utc::now() - ChronoDuration::seconds(30);
        write_raw(&mut cache, &entry_written_at(&[user(1)], recent));
        cache.load().unwrap();
        assert_eq!(cache.age_display().as_deref(), Some("just now"));

        cache.last_written_at = Some(Utc::now() - ChronoDuration::minutes(5));
        assert_eq!(cache.age_display(), None);
    }
}
