//! # sandbox_populator: Test-data seeding for an OBP sandbox
//!
//! Drives a five-stage pipeline that fills a sandbox with a realistic
//! starter set for one user: banks, accounts per bank, and optionally
//! counterparties, FX rates and a year of historical transactions.
//!
//! The pipeline is built to be re-run:
//! - every stage checks the remote before creating, so a second run finds
//!   everything in place and reports it as `existed`;
//! - a single item failing is recorded and skipped, never aborting the run;
//! - items are created strictly one at a time with short pauses, keeping
//!   the sandbox's rate limits happy.
//!
//! The result of a run is a [`report::PopulateReport`]: what was created,
//! what already existed, and the errors survived along the way.

pub mod businesses;
pub mod config;
pub mod ids;
pub mod populator;
pub mod report;

pub use config::{FxRateEntry, FxRateTable, PopulateRequest, PopulatorConfig};
pub use populator::{SandboxPopulator, UserIdentity};
pub use report::PopulateReport;
