//! # Roster REST
//!
//! REST API layer using Axum for Roster.
//! Exposes the user CRUD endpoints and a health check over HTTP.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
