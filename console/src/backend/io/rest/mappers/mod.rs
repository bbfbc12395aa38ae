//! Mappers from backend documents to the console's domain entities.

pub mod card_mapper;
pub mod log_mapper;
pub mod machine_mapper;
pub mod transaction_mapper;

pub use card_mapper::CardMapper;
pub use log_mapper::LogMapper;
pub use machine_mapper::MachineMapper;
pub use transaction_mapper::TransactionMapper;

/// Backend amounts are floats; the console counts whole tokens
pub(crate) fn to_tokens(amount: f64) -> i64 {
    amount.round() as i64
}
