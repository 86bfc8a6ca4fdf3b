//! Tunables for a population run.

use std::time::Duration;

/// Default number of banks to create
pub const DEFAULT_NUM_BANKS: u32 = 2;

/// Default number of accounts per bank
pub const DEFAULT_NUM_ACCOUNTS_PER_BANK: u32 = 5;

/// Default currency for balances and FX rates (Botswana pula)
pub const DEFAULT_CURRENCY: &str = "BWP";

/// One target currency with its approximate conversion value from the
/// requested base currency
#[derive(Debug, Clone, PartialEq)]
pub struct FxRateEntry {
    pub currency: String,
    pub rate: f64,
}

impl FxRateEntry {
    pub fn new(currency: impl Into<String>, rate: f64) -> Self {
        Self {
            currency: currency.into(),
            rate,
        }
    }
}

/// Ordered list of target currencies seeded during the FX stage.
///
/// Held as a value on [`PopulatorConfig`] rather than baked into the
/// pipeline, so deployments and tests can run with their own set.
#[derive(Debug, Clone)]
pub struct FxRateTable {
    entries: Vec<FxRateEntry>,
}

impl FxRateTable {
    pub fn new(entries: Vec<FxRateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FxRateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FxRateTable {
    /// Approximate market rates against the Botswana pula
    fn default() -> Self {
        Self::new(vec![
            FxRateEntry::new("EUR", 0.068),
            FxRateEntry::new("USD", 0.074),
            FxRateEntry::new("GBP", 0.058),
            FxRateEntry::new("ZAR", 1.37),
            FxRateEntry::new("KES", 11.5),
            FxRateEntry::new("NGN", 115.0),
            FxRateEntry::new("EGP", 2.28),
            FxRateEntry::new("GHS", 0.92),
            FxRateEntry::new("TZS", 186.0),
            FxRateEntry::new("UGX", 275.0),
            FxRateEntry::new("ZMW", 1.88),
            FxRateEntry::new("NAD", 1.37),
            FxRateEntry::new("CNY", 0.53),
        ])
    }
}

/// Pipeline tuning: the FX table and the rate-limit pauses.
///
/// The pauses keep a run gentle on the sandbox; tests zero them out.
#[derive(Debug, Clone)]
pub struct PopulatorConfig {
    pub fx_table: FxRateTable,
    /// Pause after each create/check attempt in the bank, account,
    /// counterparty and transaction stages
    pub item_delay: Duration,
    /// Pause after each directional attempt in the FX stage
    pub fx_delay: Duration,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        Self {
            fx_table: FxRateTable::default(),
            item_delay: Duration::from_millis(100),
            fx_delay: Duration::from_millis(50),
        }
    }
}

impl PopulatorConfig {
    /// Config with no pauses, for tests and trusted deployments
    pub fn without_delays() -> Self {
        Self {
            item_delay: Duration::ZERO,
            fx_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// What to populate, as requested by the caller
#[derive(Debug, Clone)]
pub struct PopulateRequest {
    pub num_banks: u32,
    pub num_accounts_per_bank: u32,
    pub currency: String,
    /// Overrides the prefix derived from the username when set
    pub bank_id_prefix: Option<String>,
    pub create_counterparties: bool,
    pub create_fx_rates: bool,
    pub create_transactions: bool,
}

impl Default for PopulateRequest {
    fn default() -> Self {
        Self {
            num_banks: DEFAULT_NUM_BANKS,
            num_accounts_per_bank: DEFAULT_NUM_ACCOUNTS_PER_BANK,
            currency: DEFAULT_CURRENCY.to_string(),
            bank_id_prefix: None,
            create_counterparties: false,
            create_fx_rates: false,
            create_transactions: false,
        }
    }
}
