//! Command values for the coordinator's mutation pipeline.
//!
//! Every state-changing action can be expressed as a [`Command`] and run
//! through `Coordinator::dispatch`. Each command declares how it is
//! persisted, which makes the split between backend-backed and local-only
//! mutations explicit instead of implicit in each action.

use shared::{Card, Machine, Transaction};

use super::cashier::{Prize, RechargePack};

/// Where a mutation is made durable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Sent to the backend; on success the affected collections are refetched
    RemoteThenRefetch,
    /// Applied to local collections and the on-device store only. The
    /// backend never hears about it and the next refetch discards it.
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddCard(Card),
    UpdateCard(Card),
    /// Positive top-up entered at the manager desk
    AddTokens {
        card_id: String,
        amount: i64,
    },
    /// Partial or full refund of `amount` tokens
    DeductTokens {
        card_id: String,
        amount: i64,
    },
    DeleteCard(String),
    BlockCard(String),
    UnblockCard(String),
    ToggleCardStatus(String),
    /// Full refund of the card's balance
    RefundCard(String),
    /// Goodwill credit, e.g. for a failed game
    CompensateCard {
        card_id: String,
        amount: i64,
        reason: Option<String>,
    },
    ReplaceCard {
        old_id: String,
        new_id: String,
    },
    BulkDeleteCards(Vec<String>),
    BulkBlockCards(Vec<String>),
    BulkRechargeCards {
        card_ids: Vec<String>,
        amount: i64,
    },
    RedeemTickets {
        card_id: String,
        prize: Prize,
    },
    RechargePack {
        card_id: String,
        pack: RechargePack,
    },
    AddMachine(Machine),
    UpdateMachine(Machine),
    DeleteMachine(String),
    AddTransaction(Transaction),
    Undo,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddCard(_) => "add_card",
            Command::UpdateCard(_) => "update_card",
            Command::AddTokens { .. } => "add_tokens",
            Command::DeductTokens { .. } => "deduct_tokens",
            Command::DeleteCard(_) => "delete_card",
            Command::BlockCard(_) => "block_card",
            Command::UnblockCard(_) => "unblock_card",
            Command::ToggleCardStatus(_) => "toggle_card_status",
            Command::RefundCard(_) => "refund_card",
            Command::CompensateCard { .. } => "compensate_card",
            Command::ReplaceCard { .. } => "replace_card",
            Command::BulkDeleteCards(_) => "bulk_delete_cards",
            Command::BulkBlockCards(_) => "bulk_block_cards",
            Command::BulkRechargeCards { .. } => "bulk_recharge_cards",
            Command::RedeemTickets { .. } => "redeem_tickets",
            Command::RechargePack { .. } => "recharge_pack",
            Command::AddMachine(_) => "add_machine",
            Command::UpdateMachine(_) => "update_machine",
            Command::DeleteMachine(_) => "delete_machine",
            Command::AddTransaction(_) => "add_transaction",
            Command::Undo => "undo",
        }
    }

    /// Persistence path known without looking at current state.
    /// `UpdateCard` and `DeductTokens` depend on the current balance and
    /// return `None`; the coordinator resolves them.
    pub fn declared_persistence(&self) -> Option<Persistence> {
        match self {
            Command::AddCard(_)
            | Command::AddTokens { .. }
            | Command::RefundCard(_)
            | Command::RechargePack { .. } => Some(Persistence::RemoteThenRefetch),
            Command::UpdateCard(_) | Command::DeductTokens { .. } => None,
            _ => Some(Persistence::LocalOnly),
        }
    }
}

/// Persistence of a card update given the balance it replaces.
/// Raising the balance is a recharge and dropping it to zero a full refund;
/// both go to the backend. A partial deduction has no backend endpoint and
/// stays local.
pub fn update_persistence(previous_balance: Option<i64>, new_balance: i64) -> Persistence {
    match previous_balance {
        Some(old) if new_balance > old => Persistence::RemoteThenRefetch,
        Some(old) if new_balance < old && new_balance == 0 => Persistence::RemoteThenRefetch,
        _ => Persistence::LocalOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_persistence_follows_balance_delta() {
        assert_eq!(update_persistence(Some(100), 150), Persistence::RemoteThenRefetch);
        assert_eq!(update_persistence(Some(100), 0), Persistence::RemoteThenRefetch);
        assert_eq!(update_persistence(Some(100), 40), Persistence::LocalOnly);
        assert_eq!(update_persistence(Some(100), 100), Persistence::LocalOnly);
        assert_eq!(update_persistence(None, 100), Persistence::LocalOnly);
    }

    #[test]
    fn test_declared_persistence() {
        assert_eq!(
            Command::AddCard(Card::new("C-1", "Ann")).declared_persistence(),
            Some(Persistence::RemoteThenRefetch)
        );
        assert_eq!(
            Command::DeleteCard("C-1".to_string()).declared_persistence(),
            Some(Persistence::LocalOnly)
        );
        assert_eq!(
            Command::BulkRechargeCards {
                card_ids: vec!["C-1".to_string()],
                amount: 5
            }
            .declared_persistence(),
            Some(Persistence::LocalOnly)
        );
        assert_eq!(Command::UpdateCard(Card::new("C-1", "Ann")).declared_persistence(), None);
    }
}
