//! HTTP binding to the OBP REST API.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ObpError;
use crate::types::{
    Account, AccountListPayload, AccountRouting, AccountSummary, Balance, Bank, BankList,
    BankRouting, Counterparty, CounterpartyList, CurrencyList, FxRate, MyAccountList, NewAccount,
    NewBank, NewCounterparty, NewFxRate, NewHistoricalTransaction, NewTransactionRequest,
    Transaction, TransactionList, TransactionRequest, TransactionRequestList, TransactionValue,
    User,
};

/// The account view used when the caller has no reason to pick another one
pub const OWNER_VIEW: &str = "owner";

/// Client for one authenticated principal against one OBP deployment.
///
/// Cheap to clone; the underlying connection pool is shared between clones.
#[derive(Clone)]
pub struct ObpClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    access_token: String,
}

impl ObpClient {
    /// Create a client with its own connection pool
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, api_version, access_token)
    }

    /// Create a client on top of an existing connection pool. Servers keep
    /// one `reqwest::Client` per process and build a per-request `ObpClient`
    /// around the caller's token.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_version: api_version.into(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/obp/{}{}", self.base_url, self.api_version, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ObpError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ObpError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ObpError> {
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Decode a success body, or turn an error response into
    /// [`ObpError::Api`] with the message the remote put in its body
    /// (falling back to the status line).
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ObpError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| default_error_message(status)),
            Err(_) => default_error_message(status),
        };
        tracing::debug!(status = %status, message = %message, "OBP API error");
        Err(ObpError::Api { status, message })
    }

    fn validate_bank(bank: Bank) -> Result<Bank, ObpError> {
        if bank.bank_id.is_empty() {
            return Err(ObpError::invalid_response("bank entry is missing bank_id"));
        }
        Ok(bank)
    }

    // --- users ---

    /// Fetch the authenticated user
    pub async fn current_user(&self) -> Result<User, ObpError> {
        self.get("/users/current").await
    }

    // --- banks ---

    /// List all visible banks
    pub async fn banks(&self) -> Result<Vec<Bank>, ObpError> {
        let list: BankList = self.get("/banks").await?;
        list.banks.into_iter().map(Self::validate_bank).collect()
    }

    /// Fetch a single bank
    pub async fn bank(&self, bank_id: &str) -> Result<Bank, ObpError> {
        let bank: Bank = self.get(&format!("/banks/{}", bank_id)).await?;
        Self::validate_bank(bank)
    }

    /// Whether a bank with this id is visible to the caller. Any failure
    /// (missing bank, auth trouble, transport) reads as "no".
    pub async fn bank_exists(&self, bank_id: &str) -> bool {
        self.bank(bank_id).await.is_ok()
    }

    /// Create a bank, applying the [`NewBank`] defaults
    pub async fn create_bank(&self, bank: &NewBank) -> Result<Bank, ObpError> {
        let body = CreateBankBody {
            bank_id: &bank.bank_id,
            full_name: &bank.full_name,
            short_name: &bank.short_name,
            bank_code: bank.bank_code.as_deref().unwrap_or(&bank.short_name),
            logo: bank.logo.as_deref().unwrap_or(""),
            website: bank.website.as_deref().unwrap_or(""),
            bank_routings: bank.bank_routings.as_deref().unwrap_or(&[]),
        };
        let created: Bank = self.post("/banks", &body).await?;
        Self::validate_bank(created)
    }

    // --- accounts ---

    /// List the accounts owned by the authenticated user across all banks
    pub async fn my_accounts(&self) -> Result<Vec<Account>, ObpError> {
        let list: MyAccountList = self.get("/my/accounts").await?;
        Ok(list.accounts)
    }

    /// List accounts at a bank, normalised to [`AccountSummary`] (see the
    /// type for the wire shapes this absorbs)
    pub async fn accounts_at_bank(&self, bank_id: &str) -> Result<Vec<AccountSummary>, ObpError> {
        let payload: AccountListPayload =
            self.get(&format!("/banks/{}/accounts", bank_id)).await?;
        Ok(payload.into_summaries())
    }

    /// Create an account, applying the [`NewAccount`] defaults
    pub async fn create_account(
        &self,
        bank_id: &str,
        account: &NewAccount,
    ) -> Result<Account, ObpError> {
        let body = CreateAccountBody {
            label: &account.label,
            currency: &account.currency,
            balance: &account.balance,
            user_id: account.user_id.as_deref(),
            product_code: account.product_code.as_deref().unwrap_or(""),
            branch_id: account.branch_id.as_deref().unwrap_or(""),
            account_routings: account.account_routings.as_deref().unwrap_or(&[]),
        };
        self.post(&format!("/banks/{}/accounts", bank_id), &body)
            .await
    }

    // --- counterparties ---

    /// List the counterparties visible through an account view
    pub async fn counterparties(
        &self,
        bank_id: &str,
        account_id: &str,
        view_id: &str,
    ) -> Result<Vec<Counterparty>, ObpError> {
        let list: CounterpartyList = self
            .get(&format!(
                "/banks/{}/accounts/{}/{}/counterparties",
                bank_id, account_id, view_id
            ))
            .await?;
        Ok(list.counterparties)
    }

    /// Create a counterparty, applying the [`NewCounterparty`] defaults
    pub async fn create_counterparty(
        &self,
        bank_id: &str,
        account_id: &str,
        counterparty: &NewCounterparty,
        view_id: &str,
    ) -> Result<Counterparty, ObpError> {
        let body = CreateCounterpartyBody {
            name: &counterparty.name,
            description: &counterparty.description,
            currency: &counterparty.currency,
            other_account_routing_scheme: counterparty
                .other_account_routing_scheme
                .as_deref()
                .unwrap_or("IBAN"),
            other_account_routing_address: counterparty
                .other_account_routing_address
                .as_deref()
                .unwrap_or(""),
            other_account_secondary_routing_scheme: counterparty
                .other_account_secondary_routing_scheme
                .as_deref()
                .unwrap_or(""),
            other_account_secondary_routing_address: counterparty
                .other_account_secondary_routing_address
                .as_deref()
                .unwrap_or(""),
            other_bank_routing_scheme: counterparty
                .other_bank_routing_scheme
                .as_deref()
                .unwrap_or("BIC"),
            other_bank_routing_address: counterparty
                .other_bank_routing_address
                .as_deref()
                .unwrap_or(""),
            other_branch_routing_scheme: counterparty
                .other_branch_routing_scheme
                .as_deref()
                .unwrap_or(""),
            other_branch_routing_address: counterparty
                .other_branch_routing_address
                .as_deref()
                .unwrap_or(""),
            is_beneficiary: counterparty.is_beneficiary.unwrap_or(true),
            bespoke: counterparty.bespoke.as_deref().unwrap_or(&[]),
        };
        self.post(
            &format!(
                "/banks/{}/accounts/{}/{}/counterparties",
                bank_id, account_id, view_id
            ),
            &body,
        )
        .await
    }

    // --- FX rates ---

    /// Currencies registered at a bank
    pub async fn currencies_at_bank(&self, bank_id: &str) -> Result<Vec<String>, ObpError> {
        let list: CurrencyList = self.get(&format!("/banks/{}/currencies", bank_id)).await?;
        Ok(list
            .currencies
            .into_iter()
            .map(|c| c.currency_code)
            .collect())
    }

    /// Look up one directional rate. Absent rates and failed probes are the
    /// same thing to callers: `None`.
    pub async fn fx_rate(&self, bank_id: &str, from: &str, to: &str) -> Option<FxRate> {
        self.get(&format!("/banks/{}/fx/{}/{}", bank_id, from, to))
            .await
            .ok()
    }

    /// Register an FX rate, applying the [`NewFxRate`] defaults
    pub async fn create_fx_rate(
        &self,
        bank_id: &str,
        rate: &NewFxRate,
    ) -> Result<FxRate, ObpError> {
        let body = CreateFxRateBody {
            bank_id,
            from_currency_code: &rate.from_currency_code,
            to_currency_code: &rate.to_currency_code,
            conversion_value: rate.conversion_value,
            inverse_conversion_value: rate
                .inverse_conversion_value
                .unwrap_or(1.0 / rate.conversion_value),
            effective_date: rate.effective_date.as_deref(),
        };
        self.put(&format!("/banks/{}/fx", bank_id), &body).await
    }

    // --- transactions ---

    /// Book a back-dated transaction through the management endpoint,
    /// applying the [`NewHistoricalTransaction`] defaults
    pub async fn create_historical_transaction(
        &self,
        bank_id: &str,
        txn: &NewHistoricalTransaction,
    ) -> Result<Transaction, ObpError> {
        let body = CreateHistoricalTransactionBody {
            from_account_id: &txn.from_account_id,
            to_account_id: &txn.to_account_id,
            value: &txn.value,
            description: &txn.description,
            posted: &txn.posted,
            completed: &txn.completed,
            transaction_type: txn.transaction_type.as_deref().unwrap_or("SANDBOX_TAN"),
            charge_policy: txn.charge_policy.as_deref().unwrap_or("SHARED"),
        };
        self.post(
            &format!("/banks/{}/management/historical/transactions", bank_id),
            &body,
        )
        .await
    }

    /// Transactions booked on an account. A response without a transaction
    /// list reads as empty.
    pub async fn transactions_for_account(
        &self,
        bank_id: &str,
        account_id: &str,
        view_id: &str,
    ) -> Result<Vec<Transaction>, ObpError> {
        let list: TransactionList = self
            .get(&format!(
                "/banks/{}/accounts/{}/{}/transactions",
                bank_id, account_id, view_id
            ))
            .await?;
        Ok(list.transactions)
    }

    // --- transaction requests ---

    /// Transaction requests initiated from an account. A response without a
    /// list reads as empty.
    pub async fn transaction_requests_for_account(
        &self,
        bank_id: &str,
        account_id: &str,
        view_id: &str,
    ) -> Result<Vec<TransactionRequest>, ObpError> {
        let list: TransactionRequestList = self
            .get(&format!(
                "/banks/{}/accounts/{}/{}/transaction-requests",
                bank_id, account_id, view_id
            ))
            .await?;
        Ok(list.transaction_requests)
    }

    /// Initiate an ACCOUNT-type transaction request from an account
    pub async fn create_transaction_request(
        &self,
        bank_id: &str,
        account_id: &str,
        request: &NewTransactionRequest,
        view_id: &str,
    ) -> Result<TransactionRequest, ObpError> {
        self.post(
            &format!(
                "/banks/{}/accounts/{}/{}/transaction-request-types/ACCOUNT/transaction-requests",
                bank_id, account_id, view_id
            ),
            request,
        )
        .await
    }
}

fn default_error_message(status: StatusCode) -> String {
    format!(
        "API Error {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
}

// Request bodies with defaults already applied. Kept separate from the New*
// parameter types so the wire shape is explicit in one place.

#[derive(Serialize)]
struct CreateBankBody<'a> {
    bank_id: &'a str,
    full_name: &'a str,
    short_name: &'a str,
    bank_code: &'a str,
    logo: &'a str,
    website: &'a str,
    bank_routings: &'a [BankRouting],
}

#[derive(Serialize)]
struct CreateAccountBody<'a> {
    label: &'a str,
    currency: &'a str,
    balance: &'a Balance,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    product_code: &'a str,
    branch_id: &'a str,
    account_routings: &'a [AccountRouting],
}

#[derive(Serialize)]
struct CreateCounterpartyBody<'a> {
    name: &'a str,
    description: &'a str,
    currency: &'a str,
    other_account_routing_scheme: &'a str,
    other_account_routing_address: &'a str,
    other_account_secondary_routing_scheme: &'a str,
    other_account_secondary_routing_address: &'a str,
    other_bank_routing_scheme: &'a str,
    other_bank_routing_address: &'a str,
    other_branch_routing_scheme: &'a str,
    other_branch_routing_address: &'a str,
    is_beneficiary: bool,
    bespoke: &'a [crate::types::BespokeField],
}

#[derive(Serialize)]
struct CreateFxRateBody<'a> {
    bank_id: &'a str,
    from_currency_code: &'a str,
    to_currency_code: &'a str,
    conversion_value: f64,
    inverse_conversion_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    effective_date: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateHistoricalTransactionBody<'a> {
    from_account_id: &'a str,
    to_account_id: &'a str,
    value: &'a TransactionValue,
    description: &'a str,
    posted: &'a str,
    completed: &'a str,
    #[serde(rename = "type")]
    transaction_type: &'a str,
    charge_policy: &'a str,
}
