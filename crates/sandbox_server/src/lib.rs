//! JSON API server for the OBP sandbox companion
//!
//! Fronts an Open Bank Project sandbox with a small JSON surface: browse
//! endpoints for banks, accounts, transactions and counterparties, plus the
//! populate action that seeds the sandbox with test data via
//! [`sandbox_populator`]. The caller's bearer token is passed through on
//! every request; this server keeps no session state of its own.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
