//! # Backend Module
//!
//! Contains all non-UI logic for the arcade console.
//!
//! This module brings together:
//! - **Domain**: the mutation coordinator, undo buffer and business rules
//! - **Storage**: the on-device mirror of every collection and the session
//! - **IO**: the REST client for the arcade backend
//!
//! ## Architecture
//!
//! ```text
//! UI / CLI
//!     ↓
//! Domain Layer (Coordinator, validation, undo)
//!     ↓                ↓
//! IO Layer (REST)   Storage Layer (JSON documents)
//! ```
//!
//! The coordinator is generic over both seams ([`io::RemoteApi`] and
//! [`storage::StateStore`]) so tests run it against in-process fakes.

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use log::info;
use std::sync::Arc;

pub use domain::*;
pub use io::*;
pub use storage::*;

/// Coordinator wired to the real backend and the on-disk store
pub type ConsoleCoordinator = Coordinator<HttpRemote<JsonFileStore>, JsonFileStore>;

/// Everything a running console needs
pub struct AppState {
    pub config: ConsoleConfig,
    pub store: Arc<JsonFileStore>,
    pub coordinator: ConsoleCoordinator,
}

impl AppState {
    /// Watcher over this console's store, polling at the configured interval
    pub fn storage_watcher(&self) -> StorageWatcher<JsonFileStore> {
        StorageWatcher::new(self.store.clone(), self.config.watch_interval())
    }
}

/// Initialize the backend in the default data directory
pub fn initialize_backend() -> Result<AppState> {
    info!("Setting up storage");
    let store = JsonFileStore::new_default()?;
    initialize_backend_with_store(store)
}

/// Initialize the backend on top of an already opened store
pub fn initialize_backend_with_store(store: JsonFileStore) -> Result<AppState> {
    let config = ConsoleConfigRepository::new(store.base_directory())
        .load_or_create()?
        .with_env_overrides();
    let store = Arc::new(store);

    info!("Setting up backend client for {}", config.api_base_url);
    let remote = HttpRemote::new(&config.api_base_url, config.request_timeout(), store.clone())?;

    info!("Setting up coordinator");
    let coordinator = Coordinator::new(remote, store.clone(), config.undo_window());

    Ok(AppState {
        config,
        store,
        coordinator,
    })
}
