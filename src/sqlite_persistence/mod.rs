//! Declarative SQLite schema management.
//!
//! Tables are described as const data, created from that description, and
//! validated against the live database on startup so schema drift fails fast
//! instead of corrupting queries later.

mod versioned_schema;

pub use versioned_schema::{
    Column, ForeignKey, OnDelete, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
