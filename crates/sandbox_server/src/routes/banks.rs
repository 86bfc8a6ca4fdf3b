//! Bank browsing endpoints.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use obp_client::types::{Bank, FxRate};
use sandbox_populator::config::DEFAULT_CURRENCY;
use sandbox_populator::FxRateTable;

use super::AppState;
use crate::auth::AuthToken;
use crate::error::ApiError;

/// Response of GET /api/banks
#[derive(Debug, Serialize)]
pub struct BankListResponse {
    pub banks: Vec<Bank>,
}

/// Response of GET /api/banks/:bank_id
#[derive(Debug, Serialize)]
pub struct BankDetailResponse {
    pub bank: Bank,
    /// Currencies in use at the bank: the registered set merged with every
    /// currency seen on a probed FX rate, sorted
    pub currencies: Vec<String>,
    #[serde(rename = "fxRates")]
    pub fx_rates: Vec<FxRate>,
}

/// Build the bank routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/banks", get(list_banks_handler))
        .route("/api/banks/:bank_id", get(bank_detail_handler))
}

/// GET /api/banks - All banks visible to the caller
async fn list_banks_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
) -> Result<Json<BankListResponse>, ApiError> {
    let banks = state.obp_client(&token).banks().await?;
    Ok(Json(BankListResponse { banks }))
}

/// GET /api/banks/:bank_id - One bank with its currencies and FX rates
///
/// The registered-currency fetch and the FX probes degrade gracefully: a
/// missing currency endpoint yields an empty set, and absent rates are
/// simply skipped. Only the bank fetch itself can fail the request.
async fn bank_detail_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Path(bank_id): Path<String>,
) -> Result<Json<BankDetailResponse>, ApiError> {
    let client = state.obp_client(&token);
    let bank = client.bank(&bank_id).await?;

    let currencies = match client.currencies_at_bank(&bank_id).await {
        Ok(currencies) => currencies,
        Err(e) => {
            tracing::warn!("Failed to fetch currencies for {}: {}", bank_id, e);
            Vec::new()
        }
    };

    // Probe the seeded currency pairs in both directions; any currency seen
    // on a rate counts as present at the bank even when unregistered.
    let mut fx_rates = Vec::new();
    let mut found = BTreeSet::new();
    for entry in FxRateTable::default().entries() {
        if let Some(rate) = client
            .fx_rate(&bank_id, DEFAULT_CURRENCY, &entry.currency)
            .await
        {
            fx_rates.push(rate);
            found.insert(DEFAULT_CURRENCY.to_string());
            found.insert(entry.currency.clone());
        }
        if let Some(rate) = client
            .fx_rate(&bank_id, &entry.currency, DEFAULT_CURRENCY)
            .await
        {
            fx_rates.push(rate);
            found.insert(DEFAULT_CURRENCY.to_string());
            found.insert(entry.currency.clone());
        }
    }

    let currencies = merge_currencies(currencies, found);

    Ok(Json(BankDetailResponse {
        bank,
        currencies,
        fx_rates,
    }))
}

/// Merge probe-discovered currencies into the registered set. When nothing
/// was discovered the registered list passes through untouched (including
/// its order); otherwise the union is deduplicated and sorted.
fn merge_currencies(registered: Vec<String>, found: BTreeSet<String>) -> Vec<String> {
    if found.is_empty() {
        return registered;
    }
    let mut merged = found;
    merged.extend(registered);
    merged.into_iter().collect()
}
