//! Single-slot undo buffer.
//!
//! Holds the most recent reversible action together with a deadline. Only one
//! action is ever recoverable: registering a new one silently drops whatever
//! was pending. Taking the entry hands it out once and empties the slot, so a
//! second undo in a row does nothing.
//!
//! Expiry is measured with `tokio::time::Instant`, which lets tests drive the
//! clock with `tokio::time::pause`/`advance`.

use log::{debug, info};
use shared::{Card, CardStatus, Machine};
use std::time::Duration;
use tokio::time::Instant;

/// Default validity window of an undo entry
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(20);

/// Snapshot needed to reverse one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Full card record captured before deletion
    DeleteCard(Card),
    /// Status the card had before it was blocked
    BlockCard {
        card_id: String,
        previous_status: CardStatus,
    },
    /// Balance the card had before a refund
    RefundCard {
        card_id: String,
        previous_balance: i64,
    },
    /// Full machine record captured before deletion
    DeleteMachine(Machine),
}

impl UndoAction {
    /// Short label for toasts and logs
    pub fn describe(&self) -> String {
        match self {
            UndoAction::DeleteCard(card) => format!("Card {} deleted", card.id),
            UndoAction::BlockCard { card_id, .. } => format!("Card {} status changed", card_id),
            UndoAction::RefundCard { card_id, .. } => format!("Refund processed for {}", card_id),
            UndoAction::DeleteMachine(machine) => format!("Machine {} removed", machine.name),
        }
    }
}

/// A pending undo entry
#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub action: UndoAction,
    pub expires_at: Instant,
}

impl UndoEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct UndoBuffer {
    window: Duration,
    slot: Option<UndoEntry>,
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        Self { window, slot: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Store a new reversible action, replacing any pending one.
    /// Returns the action that was discarded, if there was a live one.
    pub fn register(&mut self, action: UndoAction) -> Option<UndoAction> {
        let now = Instant::now();
        let discarded = self
            .slot
            .take()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.action);

        if let Some(previous) = &discarded {
            debug!("Discarding pending undo: {}", previous.describe());
        }

        info!("Registered undo: {} ({}s window)", action.describe(), self.window.as_secs());
        self.slot = Some(UndoEntry {
            action,
            expires_at: now + self.window,
        });

        discarded
    }

    /// The pending entry, if it has not expired yet
    pub fn peek(&self) -> Option<&UndoEntry> {
        let now = Instant::now();
        self.slot.as_ref().filter(|entry| !entry.is_expired(now))
    }

    /// Time left before the pending entry becomes permanent
    pub fn remaining(&self) -> Option<Duration> {
        self.peek()
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }

    /// Consume the pending entry. Expired entries are dropped and never returned.
    pub fn take(&mut self) -> Option<UndoAction> {
        let entry = self.slot.take()?;
        if entry.is_expired(Instant::now()) {
            debug!("Undo window elapsed for: {}", entry.action.describe());
            return None;
        }
        Some(entry.action)
    }

    /// Drop the slot if its window has passed. Returns true when something expired.
    pub fn expire(&mut self) -> bool {
        let now = Instant::now();
        match &self.slot {
            Some(entry) if entry.is_expired(now) => {
                debug!("Undo expired: {}", entry.action.describe());
                self.slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl Default for UndoBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(card_id: &str) -> UndoAction {
        UndoAction::BlockCard {
            card_id: card_id.to_string(),
            previous_status: CardStatus::Active,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_returns_entry_once() {
        let mut buffer = UndoBuffer::default();
        buffer.register(block("C-1"));

        assert_eq!(buffer.take(), Some(block("C-1")));
        assert_eq!(buffer.take(), None);
        assert!(buffer.peek().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_register_discards_first() {
        let mut buffer = UndoBuffer::default();
        assert!(buffer.register(block("C-1")).is_none());

        let discarded = buffer.register(block("C-2"));

        assert_eq!(discarded, Some(block("C-1")));
        assert_eq!(buffer.take(), Some(block("C-2")));
        assert_eq!(buffer.take(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_window() {
        let mut buffer = UndoBuffer::new(Duration::from_secs(20));
        buffer.register(block("C-1"));

        tokio::time::advance(Duration::from_secs(19)).await;
        assert!(buffer.peek().is_some());
        assert_eq!(buffer.remaining(), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(buffer.peek().is_none());
        assert!(buffer.expire());
        assert_eq!(buffer.take(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reregister_restarts_window() {
        let mut buffer = UndoBuffer::new(Duration::from_secs(20));
        buffer.register(block("C-1"));

        tokio::time::advance(Duration::from_secs(15)).await;
        buffer.register(block("C-2"));

        tokio::time::advance(Duration::from_secs(15)).await;
        assert_eq!(buffer.take(), Some(block("C-2")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_after_expiry_reports_nothing_discarded() {
        let mut buffer = UndoBuffer::new(Duration::from_secs(5));
        buffer.register(block("C-1"));

        tokio::time::advance(Duration::from_secs(6)).await;

        assert!(buffer.register(block("C-2")).is_none());
    }

    #[test]
    fn test_describe_labels() {
        let card = Card::new("CARD-5", "Dana");
        assert_eq!(UndoAction::DeleteCard(card).describe(), "Card CARD-5 deleted");
        assert_eq!(block("CARD-6").describe(), "Card CARD-6 status changed");
    }
}
