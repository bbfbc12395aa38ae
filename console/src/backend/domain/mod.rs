//! # Domain Module
//!
//! Business rules of the arcade console, independent of transport and storage.
//!
//! ## Module Organization
//!
//! - **coordinator**: the mutation coordinator that owns all collections
//! - **commands**: command values and their persistence paths
//! - **undo**: single-slot, time-limited undo buffer
//! - **validation**: input checks run before any mutation
//! - **cashier**: recharge packs and the prize catalog
//! - **summary**: aggregate figures for the status overview
//! - **errors**: validation and action error types
//!
//! ## Business Rules
//!
//! - Card IDs are unique within the inventory
//! - Contact numbers, when given, are exactly ten digits
//! - Recharges, card registration and full refunds are authoritative on the
//!   backend; the console refetches after each
//! - Everything else is local to the console and its on-device store
//! - At most one action can be undone, and only within its window
//! - Every mutation leaves an audit log entry

pub mod cashier;
pub mod commands;
pub mod coordinator;
pub mod errors;
pub mod summary;
pub mod undo;
pub mod validation;

pub use cashier::{affordable_prizes, Prize, RechargePack, PRIZES, RECHARGE_PACKS};
pub use commands::{Command, Persistence};
pub use coordinator::Coordinator;
pub use errors::{ActionError, ActionResult, ValidationError};
pub use summary::StatusSummary;
pub use undo::{UndoAction, UndoBuffer, UndoEntry, DEFAULT_UNDO_WINDOW};
