//! Cache-and-render synchronization engine for a remote user list.
//!
//! - `cache`: persisted snapshot of the user set with a 24 hour TTL
//! - `api`: single-request client for the users collection
//! - `controller`: cache-or-fetch loading, deletion and manual reload
//! - `render`: rebuilds the mounted list from a user set
//! - `watchdog`: offers a reload when the list is emptied from outside
//! - `mount`: the host container the list is rendered into
//! - `store`: persisted and session key-value stores
//! - `config`: on-disk configuration with environment overrides

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod models;
pub mod mount;
pub mod render;
pub mod store;
pub mod watchdog;

pub use api::{ApiClient, FetchError, UserSource};
pub use cache::UserCache;
pub use config::Config;
pub use controller::{Controller, ControllerOptions, SyncError, ViewState};
pub use models::{Address, User};
pub use mount::{Card, Mount, Mutation, Notice, NoticeKind};
pub use render::{RenderProjector, RenderStrategy};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionFlag};
pub use watchdog::Watchdog;
