//! # Remote Sync Client
//!
//! Thin binding to the arcade backend. The coordinator only ever talks to the
//! [`RemoteApi`] trait; [`HttpRemote`] is the production implementation.
//!
//! Every call is a single request: no retries, no backoff, no offline queue.
//! List endpoints return the full collection already mapped into domain
//! entities, which the coordinator then swaps in wholesale.

pub mod http_remote;
pub mod mappers;
pub mod token;

use async_trait::async_trait;
use shared::{Card, LogEntry, Machine, RechargeResponse, RefundResponse, Transaction};
use thiserror::Error;

pub use http_remote::HttpRemote;
pub use token::role_from_token;

/// Failure of a single backend call
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status}{}", detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Api { status: u16, detail: Option<String> },
}

impl RemoteError {
    /// Server-supplied `detail` message, if the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            RemoteError::Api { detail, .. } => detail.as_deref(),
            RemoteError::Transport(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Operations the console needs from the backend
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Exchange credentials for an access token
    async fn exchange_token(&self, username: &str, password: &str) -> RemoteResult<String>;

    async fn create_card(&self, card_id: &str, owner_name: &str, contact_no: &str) -> RemoteResult<()>;

    /// Add `amount` tokens to a card
    async fn recharge_card(&self, card_id: &str, amount: i64) -> RemoteResult<RechargeResponse>;

    /// Refund a card's full balance
    async fn refund_card(&self, card_id: &str) -> RemoteResult<RefundResponse>;

    async fn fetch_cards(&self) -> RemoteResult<Vec<Card>>;

    async fn fetch_machines(&self) -> RemoteResult<Vec<Machine>>;

    async fn fetch_logs(&self) -> RemoteResult<Vec<LogEntry>>;

    async fn fetch_transactions(&self) -> RemoteResult<Vec<Transaction>>;
}
