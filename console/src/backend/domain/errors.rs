//! Error types returned by coordinator actions.
//!
//! Backend-calling actions never panic or leak transport errors to callers;
//! everything resolves to an `ActionError` carrying a message suitable for an
//! inline form error or toast.

use shared::CardStatus;
use thiserror::Error;

use crate::backend::io::rest::RemoteError;

/// Local validation failures. No state is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Card ID is required")]
    EmptyCardId,

    #[error("Card ID {0} already exists")]
    DuplicateCardId(String),

    #[error("Phone number must be exactly 10 digits (got {0:?})")]
    InvalidPhoneNumber(String),

    #[error("Card {0} not found")]
    CardNotFound(String),

    #[error("New card ID must be different from old card ID")]
    SameCardId,

    #[error("Target card {0} is already in use (has balance)")]
    TargetCardInUse(String),

    #[error("Card {card_id} is {status}. Cannot process refund.")]
    CardNotActive { card_id: String, status: CardStatus },

    #[error("Insufficient tickets for {prize}: needs {required}, card has {available}")]
    InsufficientTickets {
        prize: String,
        required: i64,
        available: i64,
    },

    #[error("Insufficient balance on card {card_id}: requested {requested}, card has {available}")]
    InsufficientBalance {
        card_id: String,
        requested: i64,
        available: i64,
    },

    #[error("Amount must be a positive number of tokens (got {0})")]
    NonPositiveAmount(i64),

    #[error("Username and password are required")]
    MissingCredentials,
}

/// Failure result of a coordinator action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A backend call failed. `message` is the server detail when one was
    /// returned, otherwise a generic per-action message.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: RemoteError,
    },
}

impl ActionError {
    pub fn remote(source: RemoteError, fallback: &str) -> Self {
        let message = source
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        ActionError::Remote { message, source }
    }

    /// User-facing message
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}

pub type ActionResult<T = ()> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_prefers_server_detail() {
        let err = ActionError::remote(
            RemoteError::Api {
                status: 400,
                detail: Some("Card CARD-1 already exists in this arcade".to_string()),
            },
            "Registration failed",
        );
        assert_eq!(err.message(), "Card CARD-1 already exists in this arcade");
    }

    #[test]
    fn test_remote_error_falls_back_to_generic_message() {
        let err = ActionError::remote(
            RemoteError::Api {
                status: 502,
                detail: None,
            },
            "Recharge failed",
        );
        assert_eq!(err.message(), "Recharge failed");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_messages() {
        let err: ActionError = ValidationError::CardNotActive {
            card_id: "CARD-2".to_string(),
            status: CardStatus::Blocked,
        }
        .into();
        assert_eq!(err.message(), "Card CARD-2 is BLOCKED. Cannot process refund.");
        assert!(err.is_validation());
    }
}
