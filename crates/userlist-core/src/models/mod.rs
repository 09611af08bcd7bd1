//! Data models for the user list.
//!
//! - `User`: one displayable record with a stable integer id
//! - `Address`: the postal address rendered in a card's summary line

pub mod user;

pub use user::{Address, User};
