//! Arcade operations console.
//!
//! Client for the arcade backend: card inventory, cashier, machines and the
//! audit log, mirrored to an on-device store and kept in sync across console
//! instances on the same profile.

pub mod backend;
