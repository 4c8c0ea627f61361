//! # Roster Repository
//!
//! The record store: the only component allowed to mutate user state.
//!
//! ```text
//! Service (cache-aside coordinator)
//!   ↓  Arc<dyn UserRepository>   (store interface)
//! InMemoryUserRepository         (process-local collection)
//! ```
//!
//! The collection is re-seeded from [`seed::seed_users`] on every start and
//! is never persisted.

pub mod in_memory;
pub mod seed;
pub mod traits;

pub use in_memory::InMemoryUserRepository;
pub use seed::seed_users;
pub use traits::*;
