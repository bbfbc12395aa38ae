//! # Storage Traits
//!
//! The console persists each top-level collection as one serialized document
//! under a fixed key. Implementations only move strings; (de)serialization and
//! sample-data purging live in [`super::collections`].

use anyhow::Result;
use std::fmt;

/// Durable storage keys, shared by every console instance on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Inventory,
    Transactions,
    Machines,
    Logs,
    /// Signed-in session record
    User,
}

impl StorageKey {
    /// Every durable document, collections first
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Inventory,
        StorageKey::Transactions,
        StorageKey::Machines,
        StorageKey::Logs,
        StorageKey::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Inventory => "inventory",
            StorageKey::Transactions => "transactions",
            StorageKey::Machines => "machines",
            StorageKey::Logs => "logs",
            StorageKey::User => "user",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value document store backing the coordinator's collections
pub trait StateStore: Send + Sync {
    /// Raw document under `key`, `None` when nothing is stored
    fn read(&self, key: StorageKey) -> Result<Option<String>>;

    /// Replace the document under `key`
    fn write(&self, key: StorageKey, contents: &str) -> Result<()>;

    /// Delete the document under `key`. Removing a missing key is not an error.
    fn remove(&self, key: StorageKey) -> Result<()>;

    /// Contents this handle itself last wrote under `key`. Used by the
    /// watcher to tell its own writes apart from other instances' writes.
    fn last_written(&self, _key: StorageKey) -> Option<String> {
        None
    }

    /// Drop the record of this handle's own write under `key`, once another
    /// instance has replaced that document
    fn forget_written(&self, _key: StorageKey) {}
}
