//! File-backed storage: one JSON document per key in the profile's data
//! directory, plus the console's YAML settings file.

pub mod config_repository;
pub mod connection;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::{ConsoleConfig, ConsoleConfigRepository};
pub use connection::JsonFileStore;
