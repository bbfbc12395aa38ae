//! # IO Module
//!
//! Outbound interface of the console: the REST client that mirrors local
//! collections against the arcade backend.

pub mod rest;

pub use rest::*;
