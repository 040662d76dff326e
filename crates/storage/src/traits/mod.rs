//! Async record-store traits.
//!
//! The service layer only ever sees these traits, so the SQLite `Storage`
//! can be swapped for a remote store or a failure-injecting test double.

mod account;
mod collections;
mod profile;

pub use account::AccountStore;
pub use collections::{ChatStore, JournalStore, MoodStore, StoryStore};
pub use profile::ProfileStore;

/// Everything the per-user session needs: profile plus the four collections.
pub trait RecordStore: ProfileStore + JournalStore + MoodStore + StoryStore + ChatStore {}

impl<T> RecordStore for T where T: ProfileStore + JournalStore + MoodStore + StoryStore + ChatStore {}
