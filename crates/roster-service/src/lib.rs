//! # Roster Service
//!
//! Cache-aside coordination between callers and the record store.
//!
//! Reads consult the cache first and fall back to the store on a miss,
//! populating the cache with the result. Writes go to the store first and
//! then invalidate every cache key the mutation could have made stale.

pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod user_service;

pub use cache::*;
pub use dto::*;
pub use r#impl::{CachePolicy, CachedUserService};
pub use user_service::*;
