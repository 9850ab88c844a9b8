//! Scrobblarr Stats Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod scrobble_store;
pub mod server;
pub mod sqlite_persistence;
pub mod stats;

// Re-export commonly used types for convenience
pub use scrobble_store::{ScrobbleStore, SqliteScrobbleStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use stats::{StatsCache, StatsEngine};
