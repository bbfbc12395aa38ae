//! # Mutation Coordinator
//!
//! Single owner of the console's collections. Every state-changing action
//! goes through here and leaves an audit log entry behind.
//!
//! ## Persistence paths
//!
//! - Card creation, recharges and full refunds call the backend and then
//!   refetch the affected collections; the backend stays the source of truth.
//! - Everything else (deletes, status changes, partial deductions, bulk
//!   operations, machine edits) is applied locally only.
//!
//! In both cases every changed collection is written through to the
//! [`StateStore`]. Backend failures are logged and returned as
//! [`ActionError`]; local-only actions cannot fail.
//!
//! The coordinator is mutated through `&mut self`, so a single writer applies
//! all changes and two refetches from one coordinator never interleave.

use chrono::Local;
use log::{debug, info, warn};
use shared::{
    Card, CardStatus, EntityType, LogEntry, LogLevel, LogSubject, Machine, Notification,
    NotificationType, Session, Transaction, JUST_NOW,
};
use std::sync::Arc;
use std::time::Duration;

use super::cashier::{Prize, RechargePack};
use super::commands::{update_persistence, Command, Persistence};
use super::errors::{ActionError, ActionResult, ValidationError};
use super::summary::StatusSummary;
use super::undo::{UndoAction, UndoBuffer, UndoEntry};
use super::validation;
use crate::backend::io::rest::{role_from_token, RemoteApi};
use crate::backend::storage::{
    clear_session, load_collection, load_session, save_collection, save_session, StateStore,
    StorageChange, StorageKey,
};

/// Log `source` tags
pub mod sources {
    pub const INVENTORY: &str = "Inventory";
    pub const CARD_OPS: &str = "Card Ops";
    pub const CASHIER: &str = "Cashier";
    pub const MACHINES: &str = "Machines";
    pub const AUTH: &str = "Auth";
    pub const SYSTEM: &str = "System";
}

/// Operator recorded on log entries made while nobody is signed in
const SYSTEM_OPERATOR: &str = "System";

fn clock_time() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub struct Coordinator<R: RemoteApi, S: StateStore> {
    remote: R,
    store: Arc<S>,
    inventory: Vec<Card>,
    transactions: Vec<Transaction>,
    machines: Vec<Machine>,
    logs: Vec<LogEntry>,
    notifications: Vec<Notification>,
    session: Option<Session>,
    undo: UndoBuffer,
}

impl<R: RemoteApi, S: StateStore> Coordinator<R, S> {
    /// Create a coordinator hydrated from whatever `store` holds
    pub fn new(remote: R, store: Arc<S>, undo_window: Duration) -> Self {
        let inventory = load_collection(store.as_ref(), StorageKey::Inventory);
        let transactions = load_collection(store.as_ref(), StorageKey::Transactions);
        let machines = load_collection(store.as_ref(), StorageKey::Machines);
        let logs = load_collection(store.as_ref(), StorageKey::Logs);
        let session = load_session(store.as_ref());

        info!(
            "Hydrated {} cards, {} transactions, {} machines, {} log entries{}",
            inventory.len(),
            transactions.len(),
            machines.len(),
            logs.len(),
            session
                .as_ref()
                .map(|s| format!(" (signed in as {})", s.username))
                .unwrap_or_default()
        );

        Self {
            remote,
            store,
            inventory,
            transactions,
            machines,
            logs,
            notifications: Vec::new(),
            session,
            undo: UndoBuffer::new(undo_window),
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn inventory(&self) -> &[Card] {
        &self.inventory
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Audit log, newest first
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.inventory.iter().find(|card| card.id == card_id)
    }

    /// Look up a scanned or typed card ID, ignoring case and surrounding blanks
    pub fn card_by_scan(&self, scanned: &str) -> Option<&Card> {
        let scanned = scanned.trim();
        self.inventory
            .iter()
            .find(|card| card.id.eq_ignore_ascii_case(scanned))
    }

    pub fn machine(&self, machine_id: &str) -> Option<&Machine> {
        self.machines.iter().find(|machine| machine.id == machine_id)
    }

    /// Log entries about one card, newest first
    pub fn card_history(&self, card_id: &str) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|entry| entry.subject.concerns(EntityType::Card, card_id))
            .collect()
    }

    pub fn card_transactions(&self, card_id: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.card_id == card_id)
            .collect()
    }

    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary::compute(&self.inventory, &self.machines, &self.transactions, &self.logs)
    }

    /// The pending undo entry, if its window is still open
    pub fn pending_undo(&self) -> Option<&UndoEntry> {
        self.undo.peek()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn persist(&self, key: StorageKey) {
        let store = self.store.as_ref();
        let result = match key {
            StorageKey::Inventory => save_collection(store, key, &self.inventory),
            StorageKey::Transactions => save_collection(store, key, &self.transactions),
            StorageKey::Machines => save_collection(store, key, &self.machines),
            StorageKey::Logs => save_collection(store, key, &self.logs),
            StorageKey::User => match &self.session {
                Some(session) => save_session(store, session),
                None => clear_session(store),
            },
        };

        if let Err(e) = result {
            warn!("Failed to persist {}: {:#}", key, e);
        }
    }

    fn set_inventory(&mut self, inventory: Vec<Card>) {
        self.inventory = inventory;
        self.persist(StorageKey::Inventory);
    }

    fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.persist(StorageKey::Transactions);
    }

    fn set_machines(&mut self, machines: Vec<Machine>) {
        self.machines = machines;
        self.persist(StorageKey::Machines);
    }

    fn set_logs(&mut self, logs: Vec<LogEntry>) {
        self.logs = logs;
        self.persist(StorageKey::Logs);
    }

    /// Reload a collection another console instance wrote. Last writer wins.
    pub fn apply_storage_change(&mut self, change: StorageChange) {
        let store = self.store.as_ref();
        match change.key {
            StorageKey::Inventory => self.inventory = load_collection(store, change.key),
            StorageKey::Transactions => self.transactions = load_collection(store, change.key),
            StorageKey::Machines => self.machines = load_collection(store, change.key),
            StorageKey::Logs => self.logs = load_collection(store, change.key),
            StorageKey::User => self.session = load_session(store),
        }
        debug!("Reloaded {} after external change", change.key);
    }

    // ------------------------------------------------------------------
    // Audit log and notifications
    // ------------------------------------------------------------------

    /// Prepend an audit entry attributed to the signed-in user
    pub fn add_log(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        source: &str,
        subject: LogSubject,
    ) {
        let operator = self
            .session
            .as_ref()
            .map(|s| s.username.clone())
            .unwrap_or_else(|| SYSTEM_OPERATOR.to_string());

        let entry = LogEntry {
            id: LogEntry::generate_id(),
            level,
            message: message.into(),
            time: clock_time(),
            source: source.to_string(),
            operator,
            subject,
        };
        debug!("[{}] {} ({})", entry.level, entry.message, entry.source);

        self.logs.insert(0, entry);
        self.persist(StorageKey::Logs);
    }

    pub fn add_notification(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.notifications.insert(
            0,
            Notification {
                id: Notification::generate_id(),
                notification_type,
                message: message.into(),
                time: JUST_NOW.to_string(),
            },
        );
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
        self.persist(StorageKey::Transactions);
    }

    // ------------------------------------------------------------------
    // Refetch
    // ------------------------------------------------------------------

    pub async fn refresh_cards(&mut self) {
        match self.remote.fetch_cards().await {
            Ok(cards) => self.set_inventory(cards),
            Err(e) => warn!("Failed to fetch cards: {}", e),
        }
    }

    pub async fn refresh_machines(&mut self) {
        match self.remote.fetch_machines().await {
            Ok(machines) => self.set_machines(machines),
            Err(e) => warn!("Failed to fetch machines: {}", e),
        }
    }

    pub async fn refresh_logs(&mut self) {
        match self.remote.fetch_logs().await {
            Ok(logs) => self.set_logs(logs),
            Err(e) => warn!("Failed to fetch logs: {}", e),
        }
    }

    pub async fn refresh_transactions(&mut self) {
        match self.remote.fetch_transactions().await {
            Ok(transactions) => self.set_transactions(transactions),
            Err(e) => warn!("Failed to fetch transactions: {}", e),
        }
    }

    /// Replace every collection with the backend's current set
    pub async fn refresh_all(&mut self) {
        self.refresh_machines().await;
        self.refresh_cards().await;
        self.refresh_logs().await;
        self.refresh_transactions().await;
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Exchange credentials for a token, persist the session and hydrate
    /// every collection from the backend.
    pub async fn login(&mut self, username: &str, password: &str) -> ActionResult<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let access_token = match self.remote.exchange_token(username, password).await {
            Ok(token) => token,
            Err(e) => {
                let detail = e.detail().unwrap_or("Server error").to_string();
                self.add_log(
                    LogLevel::Error,
                    format!("Login failed: {}", detail),
                    sources::AUTH,
                    LogSubject::session(username),
                );
                return Err(ActionError::remote(e, "Server error"));
            }
        };

        let session = Session {
            username: username.to_string(),
            role: role_from_token(&access_token),
            access_token,
        };
        info!("Signed in as {} ({})", session.username, session.role);

        self.session = Some(session.clone());
        self.persist(StorageKey::User);
        self.add_log(
            LogLevel::Info,
            format!("User {} logged in successfully", username),
            sources::AUTH,
            LogSubject::session(username),
        );

        self.refresh_all().await;
        Ok(session)
    }

    /// Forget the session locally. The token is not revoked server-side.
    pub fn logout(&mut self) {
        let Some(username) = self.session.as_ref().map(|s| s.username.clone()) else {
            return;
        };

        self.add_log(
            LogLevel::Info,
            format!("User {} logged out", username),
            sources::AUTH,
            LogSubject::session(username.as_str()),
        );
        self.session = None;
        self.undo.clear();
        self.persist(StorageKey::User);
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Make `action` the one recoverable action, dropping any pending one
    pub fn register_undo(&mut self, action: UndoAction) {
        debug!("'{}' can be undone for {}s", action.describe(), self.undo.window().as_secs());
        if let Some(discarded) = self.undo.register(action) {
            debug!("Undo for '{}' is no longer available", discarded.describe());
        }
    }

    /// Drop the pending entry once its window has passed
    pub fn expire_undo(&mut self) -> bool {
        self.undo.expire()
    }

    /// Reverse the pending action. Returns false when there was nothing to undo.
    pub fn perform_undo(&mut self) -> bool {
        if let Some(left) = self.undo.remaining() {
            debug!("Undoing with {}ms of the window left", left.as_millis());
        }
        let Some(action) = self.undo.take() else {
            debug!("Nothing to undo");
            return false;
        };

        match action {
            UndoAction::DeleteCard(card) => {
                let card_id = card.id.clone();
                self.inventory.retain(|c| c.id != card_id);
                self.inventory.insert(0, card);
                self.persist(StorageKey::Inventory);
                self.add_log(
                    LogLevel::Info,
                    format!("Undo: Restored card {}", card_id),
                    sources::SYSTEM,
                    LogSubject::card(card_id.as_str()),
                );
            }
            UndoAction::BlockCard {
                card_id,
                previous_status,
            } => {
                if !self.modify_card(&card_id, |card| card.status = previous_status) {
                    warn!("Card {} no longer exists; nothing to restore", card_id);
                    return false;
                }
                self.add_log(
                    LogLevel::Info,
                    format!("Undo: Reverted block status for card {}", card_id),
                    sources::SYSTEM,
                    LogSubject::card(card_id.as_str()),
                );
            }
            UndoAction::RefundCard {
                card_id,
                previous_balance,
            } => {
                if !self.modify_card(&card_id, |card| card.balance = previous_balance) {
                    warn!("Card {} no longer exists; nothing to restore", card_id);
                    return false;
                }
                self.add_log(
                    LogLevel::Info,
                    format!("Undo: Reverted refund for card {}", card_id),
                    sources::SYSTEM,
                    LogSubject::card(card_id.as_str()),
                );
            }
            UndoAction::DeleteMachine(machine) => {
                let machine_id = machine.id.clone();
                let name = machine.name.clone();
                self.machines.retain(|m| m.id != machine_id);
                self.machines.push(machine);
                self.persist(StorageKey::Machines);
                self.add_log(
                    LogLevel::Info,
                    format!("Undo: Restored machine {}", name),
                    sources::SYSTEM,
                    LogSubject::machine(machine_id),
                );
            }
        }

        true
    }

    // ------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------

    /// Apply `change` to the card with `card_id`. Returns false for unknown IDs.
    fn modify_card<F: FnOnce(&mut Card)>(&mut self, card_id: &str, change: F) -> bool {
        let Some(card) = self.inventory.iter_mut().find(|c| c.id == card_id) else {
            return false;
        };
        change(card);
        self.persist(StorageKey::Inventory);
        true
    }

    fn replace_local_card(&mut self, updated: Card) -> bool {
        let card_id = updated.id.clone();
        self.modify_card(&card_id, |card| *card = updated)
    }

    /// Register a card with the backend and refetch cards and logs.
    /// Nothing changes locally when the backend refuses.
    pub async fn add_card(&mut self, card: Card) -> ActionResult {
        let contact_no = card.phone_number.clone().unwrap_or_default();

        match self.remote.create_card(&card.id, &card.issued_to, &contact_no).await {
            Ok(()) => {
                info!("Registered card {}", card.id);
                self.refresh_cards().await;
                self.refresh_logs().await;
                Ok(())
            }
            Err(e) => {
                self.add_log(
                    LogLevel::Error,
                    format!("Failed to register card {}", card.id),
                    sources::INVENTORY,
                    LogSubject::card(card.id.as_str()),
                );
                Err(ActionError::remote(e, "Registration failed"))
            }
        }
    }

    /// Validate a new card against the inventory, then register it
    pub async fn issue_card(&mut self, card: Card) -> ActionResult {
        validation::validate_new_card(&card, &self.inventory)?;
        self.add_card(card).await
    }

    /// Apply an edited card, routed by its balance change:
    ///
    /// - higher balance: backend recharge of the difference, then refetch
    /// - balance down to zero: backend full refund
    /// - lower, nonzero balance: local only, the backend has no partial deduction
    /// - same balance: local field update
    ///
    /// Unknown cards are ignored.
    pub async fn update_card(&mut self, updated: Card) -> ActionResult {
        let Some(previous) = self.card(&updated.id).cloned() else {
            debug!("Ignoring update for unknown card {}", updated.id);
            return Ok(());
        };

        if updated.balance > previous.balance {
            let amount = updated.balance - previous.balance;
            return self.recharge(&updated.id, amount).await;
        }

        if updated.balance < previous.balance {
            if updated.balance == 0 {
                return self.refund_card(&updated.id).await;
            }

            warn!(
                "Balance of card {} lowered from {} to {} locally only; the backend has no partial deduction",
                updated.id, previous.balance, updated.balance
            );
            let card_id = updated.id.clone();
            self.replace_local_card(updated);
            self.add_log(
                LogLevel::Info,
                format!("Updated card {} (Local update)", card_id),
                sources::INVENTORY,
                LogSubject::card(card_id),
            );
            return Ok(());
        }

        if updated == previous {
            return Ok(());
        }

        let card_id = updated.id.clone();
        let message = if updated.status != previous.status {
            format!("Card {} status changed to {}", card_id, updated.status)
        } else {
            format!("Updated card {} details", card_id)
        };
        self.replace_local_card(updated);
        self.add_log(LogLevel::Info, message, sources::INVENTORY, LogSubject::card(card_id));
        Ok(())
    }

    /// Add tokens at the manager desk: a positive amount through the recharge path
    pub async fn add_tokens(&mut self, card_id: &str, amount: i64) -> ActionResult {
        validation::validate_amount(amount)?;
        let card = self
            .card(card_id)
            .cloned()
            .ok_or_else(|| ValidationError::CardNotFound(card_id.to_string()))?;

        self.update_card(Card {
            balance: card.balance + amount,
            ..card
        })
        .await
    }

    /// Take tokens off a card. Emptying the card is a full backend refund;
    /// anything less is a local deduction.
    pub async fn deduct_tokens(&mut self, card_id: &str, amount: i64) -> ActionResult {
        let card = self
            .card(card_id)
            .cloned()
            .ok_or_else(|| ValidationError::CardNotFound(card_id.to_string()))?;
        validation::validate_deduction(&card, amount)?;

        self.update_card(Card {
            balance: card.balance - amount,
            ..card
        })
        .await
    }

    /// Validate contact details, then apply the edit
    pub async fn edit_card(&mut self, card: Card) -> ActionResult {
        validation::validate_card_edit(&card)?;
        self.update_card(card).await
    }

    async fn recharge(&mut self, card_id: &str, amount: i64) -> ActionResult {
        match self.remote.recharge_card(card_id, amount).await {
            Ok(response) => {
                debug!("Recharge of {} accepted: {}", card_id, response.message);
                self.refresh_cards().await;
                self.refresh_transactions().await;
                self.refresh_logs().await;
                self.add_log(
                    LogLevel::Success,
                    format!("Recharged card {} with {} tokens", card_id, amount),
                    sources::INVENTORY,
                    LogSubject::card(card_id),
                );
                Ok(())
            }
            Err(e) => {
                let err = ActionError::remote(e, "Recharge failed");
                self.add_log(
                    LogLevel::Error,
                    format!("Recharge failed for card {}: {}", card_id, err.message()),
                    sources::INVENTORY,
                    LogSubject::card(card_id),
                );
                Err(err)
            }
        }
    }

    /// Refund the card's whole balance through the backend and refetch
    pub async fn refund_card(&mut self, card_id: &str) -> ActionResult {
        match self.remote.refund_card(card_id).await {
            Ok(response) => {
                info!("Refunded {} tokens from card {}", response.refunded_amount, card_id);
                self.refresh_cards().await;
                self.refresh_transactions().await;
                self.refresh_logs().await;
                Ok(())
            }
            Err(e) => {
                self.add_log(
                    LogLevel::Error,
                    format!("Refund failed for card {}", card_id),
                    sources::INVENTORY,
                    LogSubject::card(card_id),
                );
                Err(ActionError::remote(e, "Refund failed"))
            }
        }
    }

    /// Full refund requested at the refund desk: the card must exist and be active
    pub async fn process_refund(&mut self, card_id: &str) -> ActionResult {
        validation::validate_refund(card_id, &self.inventory)?;
        self.refund_card(card_id).await
    }

    /// Credit tokens back to a card, e.g. after a failed game. Applied
    /// locally and reversible through undo.
    pub fn compensate_card(&mut self, card_id: &str, amount: i64, reason: Option<&str>) -> ActionResult {
        validation::validate_compensation(card_id, amount, &self.inventory)?;

        let previous_balance = self.card(card_id).map(|c| c.balance).unwrap_or_default();
        self.register_undo(UndoAction::RefundCard {
            card_id: card_id.to_string(),
            previous_balance,
        });
        self.modify_card(card_id, |card| card.balance += amount);

        let message = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("Refund processed: {} tokens to {}. Reason: {}", amount, card_id, reason),
            None => format!("Refund processed: {} tokens to {}", amount, card_id),
        };
        self.add_log(LogLevel::Success, message, sources::INVENTORY, LogSubject::card(card_id));
        Ok(())
    }

    /// Remove a card locally, keeping a snapshot for undo
    pub fn delete_card(&mut self, card_id: &str) {
        let Some(card) = self.card(card_id).cloned() else {
            return;
        };

        self.register_undo(UndoAction::DeleteCard(card));
        self.inventory.retain(|c| c.id != card_id);
        self.persist(StorageKey::Inventory);
        self.add_log(
            LogLevel::Warning,
            format!("Card {} deleted from system", card_id),
            sources::INVENTORY,
            LogSubject::card(card_id),
        );
    }

    pub async fn block_card(&mut self, card_id: &str) -> ActionResult {
        let Some(card) = self.card(card_id).cloned() else {
            return Ok(());
        };

        self.register_undo(UndoAction::BlockCard {
            card_id: card_id.to_string(),
            previous_status: card.status,
        });
        self.update_card(Card {
            status: CardStatus::Blocked,
            ..card
        })
        .await
    }

    pub async fn unblock_card(&mut self, card_id: &str) -> ActionResult {
        let Some(card) = self.card(card_id).cloned() else {
            return Ok(());
        };

        self.update_card(Card {
            status: CardStatus::Active,
            ..card
        })
        .await
    }

    pub async fn toggle_card_status(&mut self, card_id: &str) -> ActionResult {
        match self.card(card_id).map(|c| c.status) {
            Some(CardStatus::Active) => self.block_card(card_id).await,
            Some(CardStatus::Blocked) => self.unblock_card(card_id).await,
            None => Ok(()),
        }
    }

    /// Move balance, tickets and owner details from a lost card to a new one.
    /// The old card ends up zeroed and blocked.
    pub fn replace_card(&mut self, old_id: &str, new_id: &str) -> ActionResult {
        let old_card = validation::validate_replacement(old_id, new_id, &self.inventory)?.clone();

        let transferred = old_card.balance;
        let new_card = Card {
            id: new_id.to_string(),
            balance: old_card.balance,
            tickets: old_card.tickets,
            status: CardStatus::Active,
            issued_to: old_card.issued_to.clone(),
            phone_number: old_card.phone_number.clone(),
            last_used: JUST_NOW.to_string(),
        };
        let retired_card = Card {
            balance: 0,
            tickets: 0,
            status: CardStatus::Blocked,
            issued_to: format!("{} (Replaced by {})", old_card.issued_to, new_id),
            ..old_card
        };

        let mut inventory = Vec::with_capacity(self.inventory.len() + 1);
        inventory.push(new_card);
        inventory.push(retired_card);
        inventory.extend(
            self.inventory
                .iter()
                .filter(|c| c.id != old_id && c.id != new_id)
                .cloned(),
        );
        self.set_inventory(inventory);

        self.add_log(
            LogLevel::Warning,
            format!("REPLACEMENT: {} -> {}. Transferred {} tokens.", old_id, new_id, transferred),
            sources::CARD_OPS,
            LogSubject::cards([old_id, new_id]),
        );
        Ok(())
    }

    pub fn bulk_delete_cards(&mut self, card_ids: &[String]) {
        self.inventory.retain(|c| !card_ids.contains(&c.id));
        self.persist(StorageKey::Inventory);
        self.add_log(
            LogLevel::Warning,
            format!("Bulk deleted {} cards: {}", card_ids.len(), card_ids.join(", ")),
            sources::INVENTORY,
            LogSubject::cards(card_ids.iter().cloned()),
        );
    }

    pub fn bulk_block_cards(&mut self, card_ids: &[String]) {
        for card in self.inventory.iter_mut().filter(|c| card_ids.contains(&c.id)) {
            card.status = CardStatus::Blocked;
        }
        self.persist(StorageKey::Inventory);
        self.add_log(
            LogLevel::Warning,
            format!("Bulk blocked {} cards", card_ids.len()),
            sources::INVENTORY,
            LogSubject::cards(card_ids.iter().cloned()),
        );
    }

    pub fn bulk_recharge_cards(&mut self, card_ids: &[String], amount: i64) {
        for card in self.inventory.iter_mut().filter(|c| card_ids.contains(&c.id)) {
            card.balance += amount;
        }
        self.persist(StorageKey::Inventory);
        self.add_log(
            LogLevel::Info,
            format!("Bulk recharged {} cards with {} tokens", card_ids.len(), amount),
            sources::INVENTORY,
            LogSubject::cards(card_ids.iter().cloned()),
        );
    }

    // ------------------------------------------------------------------
    // Cashier
    // ------------------------------------------------------------------

    /// Sell a recharge pack: credits plus bonus go through the recharge path
    pub async fn recharge_pack(&mut self, card_id: &str, pack: &RechargePack) -> ActionResult {
        let card = self
            .card(card_id)
            .cloned()
            .ok_or_else(|| ValidationError::CardNotFound(card_id.to_string()))?;

        self.update_card(Card {
            balance: card.balance + pack.total_credits(),
            last_used: JUST_NOW.to_string(),
            ..card
        })
        .await
    }

    /// Exchange tickets for a prize. Fails without touching the card when it
    /// holds too few tickets.
    pub fn redeem_tickets(&mut self, card_id: &str, prize: &Prize) -> ActionResult {
        let card = self
            .card(card_id)
            .ok_or_else(|| ValidationError::CardNotFound(card_id.to_string()))?;
        validation::validate_redemption(card, prize.name, prize.cost)?;

        self.modify_card(card_id, |card| {
            card.tickets -= prize.cost;
            card.last_used = JUST_NOW.to_string();
        });
        self.add_log(
            LogLevel::Success,
            format!("Redeemed {} for {} tickets on card {}", prize.name, prize.cost, card_id),
            sources::CASHIER,
            LogSubject::card(card_id),
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Machines
    // ------------------------------------------------------------------

    pub fn add_machine(&mut self, machine: Machine) {
        let message = format!("New machine added: {}", machine.name);
        let subject = LogSubject::machine(machine.id.as_str());
        self.machines.push(machine);
        self.persist(StorageKey::Machines);
        self.add_log(LogLevel::Success, message, sources::MACHINES, subject);
    }

    pub fn update_machine(&mut self, updated: Machine) {
        let Some(machine) = self.machines.iter_mut().find(|m| m.id == updated.id) else {
            debug!("Ignoring update for unknown machine {}", updated.id);
            return;
        };

        let message = format!("Machine {} updated", updated.name);
        let subject = LogSubject::machine(updated.id.as_str());
        *machine = updated;
        self.persist(StorageKey::Machines);
        self.add_log(LogLevel::Info, message, sources::MACHINES, subject);
    }

    pub fn delete_machine(&mut self, machine_id: &str) {
        let Some(machine) = self.machine(machine_id).cloned() else {
            return;
        };

        self.register_undo(UndoAction::DeleteMachine(machine));
        self.machines.retain(|m| m.id != machine_id);
        self.persist(StorageKey::Machines);
        self.add_log(
            LogLevel::Warning,
            format!("Machine {} removed", machine_id),
            sources::MACHINES,
            LogSubject::machine(machine_id),
        );
    }

    // ------------------------------------------------------------------
    // Command pipeline
    // ------------------------------------------------------------------

    /// Persistence path `command` takes against the current state
    pub fn persistence_for(&self, command: &Command) -> Persistence {
        match command {
            Command::UpdateCard(card) => {
                update_persistence(self.card(&card.id).map(|c| c.balance), card.balance)
            }
            Command::DeductTokens { card_id, amount } => {
                let balance = self.card(card_id).map(|c| c.balance);
                update_persistence(balance, balance.unwrap_or_default() - amount)
            }
            other => other
                .declared_persistence()
                .unwrap_or(Persistence::LocalOnly),
        }
    }

    /// Run one command
    pub async fn dispatch(&mut self, command: Command) -> ActionResult {
        debug!("Dispatching {} ({:?})", command.name(), self.persistence_for(&command));

        match command {
            Command::AddCard(card) => self.add_card(card).await,
            Command::UpdateCard(card) => self.update_card(card).await,
            Command::AddTokens { card_id, amount } => self.add_tokens(&card_id, amount).await,
            Command::DeductTokens { card_id, amount } => self.deduct_tokens(&card_id, amount).await,
            Command::DeleteCard(card_id) => {
                self.delete_card(&card_id);
                Ok(())
            }
            Command::BlockCard(card_id) => self.block_card(&card_id).await,
            Command::UnblockCard(card_id) => self.unblock_card(&card_id).await,
            Command::ToggleCardStatus(card_id) => self.toggle_card_status(&card_id).await,
            Command::RefundCard(card_id) => self.refund_card(&card_id).await,
            Command::CompensateCard {
                card_id,
                amount,
                reason,
            } => self.compensate_card(&card_id, amount, reason.as_deref()),
            Command::ReplaceCard { old_id, new_id } => self.replace_card(&old_id, &new_id),
            Command::BulkDeleteCards(card_ids) => {
                self.bulk_delete_cards(&card_ids);
                Ok(())
            }
            Command::BulkBlockCards(card_ids) => {
                self.bulk_block_cards(&card_ids);
                Ok(())
            }
            Command::BulkRechargeCards { card_ids, amount } => {
                self.bulk_recharge_cards(&card_ids, amount);
                Ok(())
            }
            Command::RedeemTickets { card_id, prize } => self.redeem_tickets(&card_id, &prize),
            Command::RechargePack { card_id, pack } => self.recharge_pack(&card_id, &pack).await,
            Command::AddMachine(machine) => {
                self.add_machine(machine);
                Ok(())
            }
            Command::UpdateMachine(machine) => {
                self.update_machine(machine);
                Ok(())
            }
            Command::DeleteMachine(machine_id) => {
                self.delete_machine(&machine_id);
                Ok(())
            }
            Command::AddTransaction(transaction) => {
                self.add_transaction(transaction);
                Ok(())
            }
            Command::Undo => {
                self.perform_undo();
                Ok(())
            }
        }
    }
}
