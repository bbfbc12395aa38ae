//! `reqwest` implementation of [`RemoteApi`].

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{RequestBuilder, Response};
use shared::{
    ApiErrorBody, Card, LogEntry, Machine, RechargeRequest, RechargeResponse, RefundRequest,
    RefundResponse, RemoteCard, RemoteLog, RemoteMachine, RemoteTransaction, TokenResponse,
    Transaction,
};
use std::sync::Arc;
use std::time::Duration;

use super::mappers::{CardMapper, LogMapper, MachineMapper, TransactionMapper};
use super::{RemoteApi, RemoteError, RemoteResult};
use crate::backend::storage::{load_session, StateStore};

/// HTTP client for the arcade backend.
///
/// The bearer token is read from the session record in `store` on every
/// request, so a login or logout made by any holder of the store takes effect
/// immediately.
pub struct HttpRemote<S: StateStore> {
    http: reqwest::Client,
    base_url: String,
    store: Arc<S>,
}

impl<S: StateStore> HttpRemote<S> {
    pub fn new(base_url: &str, timeout: Duration, store: Arc<S>) -> RemoteResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url, store })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match load_session(self.store.as_ref()) {
            Some(session) => request.bearer_auth(session.access_token),
            None => request,
        }
    }

    /// Turn non-2xx responses into `RemoteError::Api`, keeping the server's `detail`
    async fn check_status(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .map(|body| body.detail);
        warn!("Backend returned {}: {}", status, detail.as_deref().unwrap_or("no detail"));

        Err(RemoteError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, path: &str) -> RemoteResult<Vec<T>> {
        debug!("GET {}", path);
        let response = self.authorize(self.http.get(self.url(path))).send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl<S: StateStore + 'static> RemoteApi for HttpRemote<S> {
    async fn exchange_token(&self, username: &str, password: &str) -> RemoteResult<String> {
        debug!("POST /token for {}", username);
        let response = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        let token: TokenResponse = Self::check_status(response).await?.json().await?;
        Ok(token.access_token)
    }

    async fn create_card(&self, card_id: &str, owner_name: &str, contact_no: &str) -> RemoteResult<()> {
        let body = CardMapper::to_create_request(card_id, owner_name, contact_no);
        debug!("POST /manager/create-card {}", body.card_id);
        let response = self
            .authorize(self.http.post(self.url("/manager/create-card")))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn recharge_card(&self, card_id: &str, amount: i64) -> RemoteResult<RechargeResponse> {
        let body = RechargeRequest {
            card_id: card_id.to_string(),
            amount,
        };
        debug!("PUT /manager/recharge {} +{}", card_id, amount);
        let response = self
            .authorize(self.http.put(self.url("/manager/recharge")))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check_status(response).await?.json().await?)
    }

    async fn refund_card(&self, card_id: &str) -> RemoteResult<RefundResponse> {
        let body = RefundRequest {
            card_id: card_id.to_string(),
            reason: None,
        };
        debug!("PUT /manager/refund {}", card_id);
        let response = self
            .authorize(self.http.put(self.url("/manager/refund")))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check_status(response).await?.json().await?)
    }

    async fn fetch_cards(&self) -> RemoteResult<Vec<Card>> {
        let cards: Vec<RemoteCard> = self.get_list("/manager/cards").await?;
        Ok(CardMapper::to_domain_list(cards))
    }

    async fn fetch_machines(&self) -> RemoteResult<Vec<Machine>> {
        let machines: Vec<RemoteMachine> = self.get_list("/manager/machines").await?;
        Ok(MachineMapper::to_domain_list(machines))
    }

    async fn fetch_logs(&self) -> RemoteResult<Vec<LogEntry>> {
        let logs: Vec<RemoteLog> = self.get_list("/manager/logs").await?;
        Ok(LogMapper::to_domain_list(logs))
    }

    async fn fetch_transactions(&self) -> RemoteResult<Vec<Transaction>> {
        let transactions: Vec<RemoteTransaction> = self.get_list("/manager/transactions").await?;
        Ok(TransactionMapper::to_domain_list(transactions))
    }
}
