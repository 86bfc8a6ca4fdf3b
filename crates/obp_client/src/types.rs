//! Wire types for the OBP REST API.
//!
//! Read-side models are deliberately tolerant: the sandbox elides optional
//! fields freely, so everything that is not load-bearing carries
//! `#[serde(default)]`. Write-side `New*` types hold caller intent; the
//! client fills in documented defaults when it builds request bodies.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Banks
// ---------------------------------------------------------------------------

/// Routing entry attached to a bank (e.g. BIC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRouting {
    pub scheme: String,
    pub address: String,
}

/// A bank as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub short_name: String,
    /// Not all deployments echo a bank code back; absent maps to empty
    #[serde(default)]
    pub bank_code: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub bank_routings: Vec<BankRouting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BankList {
    #[serde(default)]
    pub banks: Vec<Bank>,
}

/// Parameters for creating a bank. Optional fields fall back to documented
/// defaults when the request body is built: `bank_code` to `short_name`,
/// `logo`/`website` to empty strings, `bank_routings` to an empty list.
#[derive(Debug, Clone, Default)]
pub struct NewBank {
    pub bank_id: String,
    pub full_name: String,
    pub short_name: String,
    pub bank_code: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub bank_routings: Option<Vec<BankRouting>>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Account balance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

/// Routing entry attached to an account (e.g. IBAN)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRouting {
    pub scheme: String,
    pub address: String,
}

/// A fully described account, as returned by `/my/accounts` and by account
/// creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub bank_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub balance: Option<Balance>,
    #[serde(default)]
    pub account_routings: Vec<AccountRouting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MyAccountList {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Canonical entry of a bank's account list.
///
/// The raw list endpoint is inconsistent across deployments: the body may be
/// a bare array or wrapped in `{ "accounts": [...] }`, and each entry may
/// carry its identifier under `id` or `account_id`. [`ObpClient`] normalises
/// both axes at the boundary so callers only ever see this shape.
///
/// [`ObpClient`]: crate::client::ObpClient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub label: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AccountListPayload {
    Wrapped { accounts: Vec<RawAccountEntry> },
    Bare(Vec<RawAccountEntry>),
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAccountEntry {
    account_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    currency: String,
}

impl AccountListPayload {
    /// Flatten either wire shape into canonical summaries. `account_id`
    /// wins over `id` when both are present; an entry with neither keeps an
    /// empty id (it can still be matched by label). A body that is neither
    /// an array nor a wrapped list normalises to no accounts.
    pub(crate) fn into_summaries(self) -> Vec<AccountSummary> {
        let entries = match self {
            Self::Wrapped { accounts } => accounts,
            Self::Bare(entries) => entries,
            Self::Other(_) => return Vec::new(),
        };
        entries
            .into_iter()
            .map(|e| AccountSummary {
                id: e.account_id.or(e.id).unwrap_or_default(),
                label: e.label,
                currency: e.currency,
            })
            .collect()
    }
}

/// Parameters for creating an account. `product_code` and `branch_id`
/// default to empty strings, `account_routings` to an empty list; `user_id`
/// is omitted from the body entirely when `None`.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub label: String,
    pub currency: String,
    pub balance: Balance,
    pub user_id: Option<String>,
    pub product_code: Option<String>,
    pub branch_id: Option<String>,
    pub account_routings: Option<Vec<AccountRouting>>,
}

// ---------------------------------------------------------------------------
// Counterparties
// ---------------------------------------------------------------------------

/// Free-form key/value attribute on a counterparty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BespokeField {
    pub key: String,
    pub value: String,
}

/// A counterparty visible through an account view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterparty {
    /// Empty when the remote returned an entry without an id
    #[serde(default)]
    pub counterparty_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub other_account_routing_scheme: String,
    #[serde(default)]
    pub other_account_routing_address: String,
    #[serde(default)]
    pub other_bank_routing_scheme: String,
    #[serde(default)]
    pub other_bank_routing_address: String,
    #[serde(default)]
    pub is_beneficiary: bool,
    #[serde(default)]
    pub bespoke: Vec<BespokeField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CounterpartyList {
    #[serde(default)]
    pub counterparties: Vec<Counterparty>,
}

/// Parameters for creating a counterparty. Scheme defaults are `IBAN` for
/// the account routing and `BIC` for the bank routing; secondary and branch
/// routings default to empty strings, `is_beneficiary` to `true` and
/// `bespoke` to an empty list.
#[derive(Debug, Clone, Default)]
pub struct NewCounterparty {
    pub name: String,
    pub description: String,
    pub currency: String,
    pub other_account_routing_scheme: Option<String>,
    pub other_account_routing_address: Option<String>,
    pub other_account_secondary_routing_scheme: Option<String>,
    pub other_account_secondary_routing_address: Option<String>,
    pub other_bank_routing_scheme: Option<String>,
    pub other_bank_routing_address: Option<String>,
    pub other_branch_routing_scheme: Option<String>,
    pub other_branch_routing_address: Option<String>,
    pub is_beneficiary: Option<bool>,
    pub bespoke: Option<Vec<BespokeField>>,
}

// ---------------------------------------------------------------------------
// FX rates
// ---------------------------------------------------------------------------

/// An FX rate registered at a bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRate {
    #[serde(default)]
    pub bank_id: String,
    pub from_currency_code: String,
    pub to_currency_code: String,
    pub conversion_value: f64,
    #[serde(default)]
    pub inverse_conversion_value: f64,
    #[serde(default)]
    pub effective_date: String,
}

/// Parameters for registering an FX rate. `inverse_conversion_value`
/// defaults to `1 / conversion_value`; `effective_date` is omitted from the
/// body when `None`.
#[derive(Debug, Clone, Default)]
pub struct NewFxRate {
    pub from_currency_code: String,
    pub to_currency_code: String,
    pub conversion_value: f64,
    pub inverse_conversion_value: Option<f64>,
    pub effective_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrencyList {
    #[serde(default)]
    pub currencies: Vec<CurrencyEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrencyEntry {
    pub currency_code: String,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Monetary value of a transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionValue {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub amount: String,
}

/// Account reference inside a transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub bank_id: Option<String>,
}

/// Descriptive part of a transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionDetails {
    #[serde(rename = "type", default)]
    pub transaction_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posted: String,
    #[serde(default)]
    pub completed: String,
    #[serde(default)]
    pub value: TransactionValue,
}

/// A booked transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub this_account: Option<TransactionAccount>,
    #[serde(default)]
    pub other_account: Option<TransactionAccount>,
    #[serde(default)]
    pub details: TransactionDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionList {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Parameters for booking a historical transaction. `transaction_type`
/// defaults to `SANDBOX_TAN` and `charge_policy` to `SHARED`.
#[derive(Debug, Clone, Default)]
pub struct NewHistoricalTransaction {
    pub from_account_id: String,
    pub to_account_id: String,
    pub value: TransactionValue,
    pub description: String,
    pub posted: String,
    pub completed: String,
    pub transaction_type: Option<String>,
    pub charge_policy: Option<String>,
}

// ---------------------------------------------------------------------------
// Transaction requests
// ---------------------------------------------------------------------------

/// Destination account of a transaction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequestTo {
    pub bank_id: String,
    pub account_id: String,
}

/// Descriptive part of a transaction request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequestDetails {
    #[serde(default)]
    pub to_sandbox_tan: Option<TransactionRequestTo>,
    #[serde(default)]
    pub value: TransactionValue,
    #[serde(default)]
    pub description: String,
}

/// A transaction request (initiated transfer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub transaction_request_type: String,
    #[serde(default)]
    pub from: Option<TransactionAccount>,
    #[serde(default)]
    pub details: TransactionRequestDetails,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionRequestList {
    #[serde(default)]
    pub transaction_requests: Vec<TransactionRequest>,
}

/// Parameters for initiating an ACCOUNT-type transaction request; sent on
/// the wire as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionRequest {
    pub to: TransactionRequestTo,
    pub value: TransactionValue,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Entitlement granted to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    #[serde(default)]
    pub entitlement_id: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub bank_id: String,
}

/// Entitlement list wrapper as the API nests it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entitlements {
    #[serde(default)]
    pub list: Vec<Entitlement>,
}

/// The authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub entitlements: Option<Entitlements>,
}
