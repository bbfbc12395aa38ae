//! # Storage Module
//!
//! Durable mirror of the console's collections.
//!
//! Each top-level collection (`inventory`, `transactions`, `machines`,
//! `logs`) and the `user` session record is stored as one JSON document under
//! its key. The coordinator writes a collection through on every change; on
//! startup it hydrates from whatever is stored, minus any sample data.
//!
//! ## Implementations
//!
//! - **JsonFileStore**: one file per key in the profile data directory
//! - **MemoryStore**: process-local map for tests and ephemeral sessions
//!
//! Console settings live next to the documents in `console_config.yaml`
//! ([`ConsoleConfigRepository`]).
//!
//! The [`StorageWatcher`] polls the documents so that several console
//! instances on the same profile converge on the last write.

pub mod collections;
pub mod json;
pub mod memory;
pub mod traits;
pub mod watcher;

pub use collections::{
    clear_session, load_collection, load_session, save_collection, save_session, SAMPLE_RECORD_IDS,
};
pub use json::{ConsoleConfig, ConsoleConfigRepository, JsonFileStore};
pub use memory::MemoryStore;
pub use traits::{StateStore, StorageKey};
pub use watcher::{StorageChange, StorageWatcher};
