//! Remote source of the user set.
//!
//! `ApiClient` performs a single GET of the users collection. Every failure
//! (transport, timeout, non-2xx status, malformed body) reaches callers as
//! one `FetchError`; the finer `ApiError` classification only feeds logs.

pub mod client;
pub mod error;
pub mod source;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::{ApiError, FetchError};
pub use source::UserSource;
