//! Storage layer for venti.
//!
//! Async record-store traits plus a SQLite implementation on an r2d2
//! connection pool. Constraint violations surface as conflict-kind errors so
//! callers can detect concurrent profile creation.

mod error;
mod migrations;
mod sqlite_async;
mod store;
#[cfg(test)]
mod tests;
pub mod traits;
mod types;

pub use error::{StorageError, StoreErrorKind};
pub use store::Storage;
pub use traits::{
    AccountStore, ChatStore, JournalStore, MoodStore, ProfileStore, RecordStore, StoryStore,
};
pub use types::Account;
