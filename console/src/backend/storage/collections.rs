//! Typed access to the stored collections and the session record.
//!
//! Loading never fails: a missing, unreadable or corrupt document yields an
//! empty collection. A collection that contains any of the known sample
//! records is discarded whole and its document deleted, so seeded demo data
//! can never leak into a live console.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::Session;

use super::traits::{StateStore, StorageKey};

/// Identifiers that only ever appear in shipped sample data
pub const SAMPLE_RECORD_IDS: [&str; 4] = ["CARD-8832", "CARD-9941", "M-001", "TX-1001"];

fn is_sample_record(record: &Value) -> bool {
    ["id", "cardId"].iter().any(|field| {
        record
            .get(field)
            .and_then(Value::as_str)
            .map(|id| SAMPLE_RECORD_IDS.contains(&id))
            .unwrap_or(false)
    })
}

/// True when any record of the array carries a sample identifier
pub fn contains_sample_records(records: &[Value]) -> bool {
    records.iter().any(is_sample_record)
}

/// Load the collection stored under `key`
pub fn load_collection<T, S>(store: &S, key: StorageKey) -> Vec<T>
where
    T: DeserializeOwned,
    S: StateStore + ?Sized,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Error reading {} from storage: {:#}", key, e);
            return Vec::new();
        }
    };

    let records: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Error parsing {} from storage: {}", key, e);
            return Vec::new();
        }
    };

    if contains_sample_records(&records) {
        info!("Purging sample data from {}", key);
        if let Err(e) = store.remove(key) {
            warn!("Failed to remove sample data from {}: {:#}", key, e);
        }
        return Vec::new();
    }

    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed record in {}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Serialize and write the whole collection
pub fn save_collection<T, S>(store: &S, key: StorageKey, items: &[T]) -> Result<()>
where
    T: Serialize,
    S: StateStore + ?Sized,
{
    let contents = serde_json::to_string(items).with_context(|| format!("Failed to serialize {}", key))?;
    store.write(key, &contents)
}

/// Persisted session, if a user is signed in
pub fn load_session<S: StateStore + ?Sized>(store: &S) -> Option<Session> {
    let raw = match store.read(StorageKey::User) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Error reading session record: {:#}", e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("Discarding unreadable session record: {}", e);
            None
        }
    }
}

pub fn save_session<S: StateStore + ?Sized>(store: &S, session: &Session) -> Result<()> {
    let contents = serde_json::to_string(session).context("Failed to serialize session")?;
    store.write(StorageKey::User, &contents)
}

pub fn clear_session<S: StateStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(StorageKey::User)
}
