//! Mapping of backend transaction documents.

use shared::{RemoteTransaction, Transaction};

use super::to_tokens;

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_domain(dto: RemoteTransaction) -> Transaction {
        Transaction {
            id: dto.id.unwrap_or_else(Transaction::generate_id),
            card_id: dto.card_id.or(dto.card_id_alias).unwrap_or_default(),
            transaction_type: dto.transaction_type,
            amount: to_tokens(dto.amount),
            terminal: dto.terminal.unwrap_or_default(),
            status: dto.status.unwrap_or_default(),
            time: dto.time.or_else(|| dto.timestamp.clone()).unwrap_or_default(),
            timestamp: dto.timestamp,
        }
    }

    pub fn to_domain_list(dtos: Vec<RemoteTransaction>) -> Vec<Transaction> {
        dtos.into_iter().map(Self::to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TransactionType;

    #[test]
    fn test_recharge_document_maps() {
        let raw = r#"{"_id": "t1", "id": "t1", "card_id": "C-1", "cardId": "C-1", "amount": 50.0,
                      "type": "CREDIT", "terminal": "Manager Panel", "status": "SUCCESS",
                      "time": "10:15:00", "timestamp": "2024-05-01T10:15:00"}"#;
        let tx = TransactionMapper::to_domain(serde_json::from_str(raw).unwrap());

        assert_eq!(tx.id, "t1");
        assert_eq!(tx.card_id, "C-1");
        assert_eq!(tx.transaction_type, TransactionType::Credit);
        assert_eq!(tx.amount, 50);
        assert_eq!(tx.time, "10:15:00");
        assert_eq!(tx.timestamp.as_deref(), Some("2024-05-01T10:15:00"));
    }

    #[test]
    fn test_camel_case_card_id_is_accepted() {
        let raw = r#"{"cardId": "C-3", "type": "PUNCH", "amount": 2}"#;
        let tx = TransactionMapper::to_domain(serde_json::from_str(raw).unwrap());

        assert_eq!(tx.card_id, "C-3");
        assert!(tx.id.starts_with("tx::"));
    }
}
