//! # obp_client: Typed REST client for the Open Bank Project sandbox API
//!
//! A thin, token-scoped binding over the OBP REST surface this workspace
//! actually uses: banks, accounts, counterparties, FX rates, historical
//! transactions, transaction requests and the current user.
//!
//! Design points:
//! - One [`ObpClient`] per authenticated principal; clones share the
//!   connection pool.
//! - Wire irregularities are absorbed at this boundary (account lists are
//!   normalised to [`types::AccountSummary`], error bodies are reduced to a
//!   message), so callers never touch raw payload shapes.
//! - Existence probes (`bank_exists`, `fx_rate`) are total: any failure
//!   reads as "absent" rather than an error.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ObpClient, OWNER_VIEW};
pub use error::ObpError;
