//! Sandbox population endpoints.
//!
//! GET surveys what already exists for the caller (matched by the derived
//! bank-id prefix) and reports the form defaults; POST runs the population
//! pipeline and returns the full report.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::{Form, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use obp_client::{ObpClient, OWNER_VIEW};
use sandbox_populator::config::{
    DEFAULT_CURRENCY, DEFAULT_NUM_ACCOUNTS_PER_BANK, DEFAULT_NUM_BANKS,
};
use sandbox_populator::{
    ids, FxRateTable, PopulateRequest, PopulatorConfig, SandboxPopulator, UserIdentity,
};

use super::AppState;
use crate::auth::AuthToken;

/// Country the seed data is themed around
const DEFAULT_COUNTRY: &str = "Botswana";

/// How many transactions of the first account the survey reports at most
const SURVEY_TRANSACTION_LIMIT: usize = 20;

/// Form defaults reported by the survey
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateDefaults {
    pub num_banks: u32,
    pub num_accounts_per_bank: u32,
    pub country: String,
    pub currency: String,
    pub bank_id_prefix: String,
}

/// Entities already present for the caller, one section per stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExistingData {
    pub banks: Vec<ExistingBank>,
    pub accounts: Vec<ExistingAccount>,
    pub counterparties: Vec<ExistingCounterparty>,
    #[serde(rename = "fxRates")]
    pub fx_rates: Vec<ExistingFxRate>,
    pub transactions: Vec<ExistingTransaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingBank {
    pub bank_id: String,
    pub bank_code: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingAccount {
    pub account_id: String,
    pub bank_id: String,
    pub label: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingCounterparty {
    pub counterparty_id: String,
    pub name: String,
    pub bank_id: String,
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingFxRate {
    pub bank_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExistingTransaction {
    pub transaction_id: String,
    pub bank_id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: String,
}

/// Response of GET /api/populate
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResponse {
    pub username: String,
    #[serde(rename = "obpBaseUrl")]
    pub obp_base_url: String,
    pub defaults: PopulateDefaults,
    pub existing: ExistingData,
}

/// Raw population form, every field optional and string-typed.
///
/// Mirrors an HTML form post: numbers arrive as text, checkboxes arrive as
/// `"on"` when ticked and are absent otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateForm {
    pub num_banks: Option<String>,
    pub num_accounts_per_bank: Option<String>,
    pub currency: Option<String>,
    pub bank_id_prefix: Option<String>,
    pub create_counterparties: Option<String>,
    pub create_fx_rates: Option<String>,
    pub create_transactions: Option<String>,
}

impl PopulateForm {
    /// Lenient conversion to a typed request: unparseable or zero counts
    /// and empty strings fall back to the defaults silently.
    fn into_request(self) -> PopulateRequest {
        let defaults = PopulateRequest::default();
        PopulateRequest {
            num_banks: parse_count(self.num_banks.as_deref()).unwrap_or(defaults.num_banks),
            num_accounts_per_bank: parse_count(self.num_accounts_per_bank.as_deref())
                .unwrap_or(defaults.num_accounts_per_bank),
            currency: self
                .currency
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.currency),
            bank_id_prefix: self.bank_id_prefix.filter(|p| !p.is_empty()),
            create_counterparties: is_checked(self.create_counterparties.as_deref()),
            create_fx_rates: is_checked(self.create_fx_rates.as_deref()),
            create_transactions: is_checked(self.create_transactions.as_deref()),
        }
    }
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n != 0)
}

/// HTML checkboxes submit exactly `"on"`; anything else reads as unticked
fn is_checked(raw: Option<&str>) -> bool {
    raw == Some("on")
}

/// Build the populate routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/populate",
        get(survey_handler).post(populate_handler),
    )
}

/// GET /api/populate - Form defaults plus a survey of existing entities
///
/// The survey never fails the request: an unknown user yields empty
/// sections, and any section whose fetch fails is left empty.
async fn survey_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
) -> Json<SurveyResponse> {
    let client = state.obp_client(&token);

    let (username, existing) = match client.current_user().await {
        Ok(user) => {
            let prefix = ids::bank_id_prefix(&user.username);
            let existing = collect_existing(&client, &prefix).await;
            (user.username, existing)
        }
        Err(e) => {
            tracing::warn!("Could not resolve current user: {}", e);
            ("unknown".to_string(), ExistingData::default())
        }
    };

    let bank_id_prefix = ids::bank_id_prefix(&username);
    Json(SurveyResponse {
        username,
        obp_base_url: state.config.obp_base_url.clone(),
        defaults: PopulateDefaults {
            num_banks: DEFAULT_NUM_BANKS,
            num_accounts_per_bank: DEFAULT_NUM_ACCOUNTS_PER_BANK,
            country: DEFAULT_COUNTRY.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            bank_id_prefix,
        },
        existing,
    })
}

/// Survey everything the prefix owns: its banks, their accounts and FX
/// rates, and the first account's counterparties and recent transactions.
async fn collect_existing(client: &ObpClient, prefix: &str) -> ExistingData {
    let mut existing = ExistingData::default();

    let banks = match client.banks().await {
        Ok(banks) => banks,
        Err(e) => {
            tracing::error!("Failed to load existing data: {}", e);
            return existing;
        }
    };

    let fx_table = FxRateTable::default();
    let pattern = format!("{}.", prefix);
    for bank in banks.into_iter().filter(|b| b.bank_id.starts_with(&pattern)) {
        existing.banks.push(ExistingBank {
            bank_id: bank.bank_id.clone(),
            bank_code: bank.short_name.clone(),
            full_name: bank.full_name.clone(),
        });

        match client.accounts_at_bank(&bank.bank_id).await {
            Ok(accounts) => {
                for account in accounts {
                    existing.accounts.push(ExistingAccount {
                        account_id: account.id,
                        bank_id: bank.bank_id.clone(),
                        label: account.label,
                        currency: account.currency,
                    });
                }
            }
            Err(e) => tracing::warn!("Could not fetch accounts for {}: {}", bank.bank_id, e),
        }

        for entry in fx_table.entries() {
            if let Some(rate) = client
                .fx_rate(&bank.bank_id, DEFAULT_CURRENCY, &entry.currency)
                .await
            {
                existing.fx_rates.push(ExistingFxRate {
                    bank_id: bank.bank_id.clone(),
                    from_currency: DEFAULT_CURRENCY.to_string(),
                    to_currency: entry.currency.clone(),
                    rate: rate.conversion_value,
                });
            }
            if let Some(rate) = client
                .fx_rate(&bank.bank_id, &entry.currency, DEFAULT_CURRENCY)
                .await
            {
                existing.fx_rates.push(ExistingFxRate {
                    bank_id: bank.bank_id.clone(),
                    from_currency: entry.currency.clone(),
                    to_currency: DEFAULT_CURRENCY.to_string(),
                    rate: rate.conversion_value,
                });
            }
        }
    }

    let first = match existing.accounts.first() {
        Some(first) => first.clone(),
        None => return existing,
    };

    match client
        .counterparties(&first.bank_id, &first.account_id, OWNER_VIEW)
        .await
    {
        Ok(counterparties) => {
            for cp in counterparties {
                existing.counterparties.push(ExistingCounterparty {
                    counterparty_id: cp.counterparty_id,
                    name: cp.name,
                    bank_id: first.bank_id.clone(),
                    account_id: first.account_id.clone(),
                });
            }
        }
        Err(e) => tracing::warn!("Could not fetch counterparties: {}", e),
    }

    match client
        .transactions_for_account(&first.bank_id, &first.account_id, OWNER_VIEW)
        .await
    {
        Ok(transactions) => {
            for txn in transactions.into_iter().take(SURVEY_TRANSACTION_LIMIT) {
                let value = txn.details.value;
                let amount = if value.amount.is_empty() {
                    "0".to_string()
                } else {
                    value.amount
                };
                existing.transactions.push(ExistingTransaction {
                    transaction_id: txn.transaction_id,
                    bank_id: first.bank_id.clone(),
                    from_account_id: first.account_id.clone(),
                    to_account_id: txn.other_account.map(|a| a.id).unwrap_or_default(),
                    amount: format!("{} {}", amount, value.currency),
                });
            }
        }
        Err(e) => tracing::warn!("Could not fetch transactions: {}", e),
    }

    existing
}

/// POST /api/populate - Run the population pipeline for the caller
///
/// Always answers with `success` and a full report; per-item failures live
/// inside the report's error list. Only an unresolvable user aborts before
/// any stage runs.
async fn populate_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Form(form): Form<PopulateForm>,
) -> impl IntoResponse {
    let client = state.obp_client(&token);

    let user = match client.current_user().await {
        Ok(user) => UserIdentity::from(&user),
        Err(e) => {
            tracing::error!("Population aborted, could not resolve current user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": format!("Could not resolve current user: {}", e),
                    "results": sandbox_populator::PopulateReport::default(),
                })),
            );
        }
    };

    let request = form.into_request();
    let populator = SandboxPopulator::new(client, PopulatorConfig::default());
    let report = populator.run(&user, &request).await;

    (
        StatusCode::OK,
        Json(json!({ "success": true, "results": report })),
    )
}
