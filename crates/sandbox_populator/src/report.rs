//! Outcome records for a population run.
//!
//! Every item the pipeline touches produces exactly one record, whether it
//! was created fresh or found already in place. Failures produce no record
//! and land in [`PopulateReport::errors`] instead.

use serde::{Deserialize, Serialize};

/// One bank the pipeline created or found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankRecord {
    pub bank_id: String,
    pub bank_code: String,
    pub full_name: String,
    /// True when the bank was already present and creation was skipped
    pub existed: bool,
}

/// One customer account the pipeline created or found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub bank_id: String,
    pub label: String,
    pub currency: String,
    pub existed: bool,
}

/// One counterparty the pipeline created or found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRecord {
    pub counterparty_id: String,
    pub name: String,
    pub bank_id: String,
    pub account_id: String,
    pub existed: bool,
}

/// One directional FX rate the pipeline created or found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRateRecord {
    pub bank_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub existed: bool,
}

/// One historical transaction the pipeline created or found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub bank_id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    /// Display amount, e.g. "450.23 BWP"
    pub amount: String,
    pub existed: bool,
}

/// Aggregate outcome of a population run.
///
/// A run always yields a report. Per-item failures are collected as
/// human-readable strings in `errors` alongside whatever did succeed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulateReport {
    pub banks: Vec<BankRecord>,
    pub accounts: Vec<AccountRecord>,
    pub counterparties: Vec<CounterpartyRecord>,
    #[serde(rename = "fxRates")]
    pub fx_rates: Vec<FxRateRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub errors: Vec<String>,
}

impl PopulateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of items recorded, created and pre-existing alike
    pub fn total_items(&self) -> usize {
        self.banks.len()
            + self.accounts.len()
            + self.counterparties.len()
            + self.fx_rates.len()
            + self.transactions.len()
    }
}
