//! Askdoc DB - storage layer for askdoc.
//!
//! The document registry and conversation store are in-memory maps shared by
//! the pipelines; each mutation is mirrored to a [`SnapshotStore`] on a
//! best-effort basis (failures are logged, never surfaced to the caller).
//! [`Database`] is the SQLite implementation of that mirror.

mod conversations;
mod database;
mod error;
mod migrations;
mod registry;
mod snapshot;

pub use conversations::ConversationStore;
pub use database::Database;
pub use error::{DbError, DbResult};
pub use registry::DocumentRegistry;
pub use snapshot::SnapshotStore;
