//! Cross-instance change detection.
//!
//! Several console instances can share one profile directory. The watcher
//! polls every durable document, the session record included, and reports
//! keys whose content changed underneath this instance. Writes made through
//! the same store handle are recognised via [`StateStore::last_written`] and
//! not reported.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::traits::{StateStore, StorageKey};

/// A stored document was changed by another instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageChange {
    pub key: StorageKey,
}

pub struct StorageWatcher<S: StateStore> {
    store: Arc<S>,
    interval: Duration,
    seen: HashMap<StorageKey, Option<String>>,
}

impl<S: StateStore + 'static> StorageWatcher<S> {
    /// Snapshot the current documents; only later changes are reported
    pub fn new(store: Arc<S>, interval: Duration) -> Self {
        let mut watcher = Self {
            store,
            interval,
            seen: HashMap::new(),
        };
        for key in StorageKey::ALL {
            let current = watcher.read(key);
            watcher.seen.insert(key, current);
        }
        watcher
    }

    fn read(&self, key: StorageKey) -> Option<String> {
        match self.store.read(key) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Watcher could not read {}: {:#}", key, e);
                self.seen.get(&key).cloned().flatten()
            }
        }
    }

    /// Check every document once
    pub fn poll(&mut self) -> Vec<StorageChange> {
        let mut changes = Vec::new();

        for key in StorageKey::ALL {
            let current = self.read(key);
            if self.seen.get(&key) == Some(&current) {
                continue;
            }
            self.seen.insert(key, current.clone());

            if current.is_some() && current == self.store.last_written(key) {
                debug!("Ignoring own write to {}", key);
                continue;
            }
            // Our last write is gone; identical content from now on is foreign
            self.store.forget_written(key);
            changes.push(StorageChange { key });
        }

        changes
    }

    /// Poll on a fixed interval until the receiver is dropped
    pub fn spawn(mut self) -> (JoinHandle<()>, mpsc::Receiver<StorageChange>) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            info!("Watching storage every {}ms", self.interval.as_millis());
            let mut ticker = tokio::time::interval(self.interval);

            loop {
                ticker.tick().await;
                for change in self.poll() {
                    debug!("Storage change detected: {}", change.key);
                    if tx.send(change).await.is_err() {
                        debug!("Storage watcher stopped");
                        return;
                    }
                }
            }
        });

        (handle, rx)
    }
}
