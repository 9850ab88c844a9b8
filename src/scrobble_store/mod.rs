mod models;
mod query;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use schema::SCROBBLE_VERSIONED_SCHEMAS;
pub use store::SqliteScrobbleStore;
pub use trait_def::{AlbumTrackOrdering, Scope, ScrobbleStore};

#[cfg(feature = "mock")]
pub use trait_def::MockScrobbleStore;
