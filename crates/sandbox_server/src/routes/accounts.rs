//! Account, transaction and counterparty browsing endpoints.

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};

use obp_client::types::{Account, Counterparty, NewTransactionRequest, Transaction, TransactionRequest};
use obp_client::OWNER_VIEW;

use super::AppState;
use crate::auth::AuthToken;
use crate::error::ApiError;

/// Response of GET /api/accounts
#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub accounts: Vec<Account>,
}

/// Response of GET .../transactions
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

/// Response of GET .../counterparties
#[derive(Debug, Serialize)]
pub struct CounterpartyListResponse {
    pub counterparties: Vec<Counterparty>,
}

/// Response of GET .../transaction-requests
#[derive(Debug, Serialize)]
pub struct TransactionRequestListResponse {
    pub transaction_requests: Vec<TransactionRequest>,
}

/// Build the account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/accounts", get(my_accounts_handler))
        .route(
            "/api/banks/:bank_id/accounts/:account_id/transactions",
            get(transactions_handler),
        )
        .route(
            "/api/banks/:bank_id/accounts/:account_id/counterparties",
            get(counterparties_handler),
        )
        .route(
            "/api/banks/:bank_id/accounts/:account_id/transaction-requests",
            get(transaction_requests_handler).post(create_transaction_request_handler),
        )
}

/// GET /api/accounts - Accounts owned by the caller across all banks
async fn my_accounts_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
) -> Result<Json<AccountListResponse>, ApiError> {
    let accounts = state.obp_client(&token).my_accounts().await?;
    Ok(Json(AccountListResponse { accounts }))
}

/// GET /api/banks/:bank_id/accounts/:account_id/transactions
async fn transactions_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Path((bank_id, account_id)): Path<(String, String)>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    let transactions = state
        .obp_client(&token)
        .transactions_for_account(&bank_id, &account_id, OWNER_VIEW)
        .await?;
    Ok(Json(TransactionListResponse { transactions }))
}

/// GET /api/banks/:bank_id/accounts/:account_id/counterparties
async fn counterparties_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Path((bank_id, account_id)): Path<(String, String)>,
) -> Result<Json<CounterpartyListResponse>, ApiError> {
    let counterparties = state
        .obp_client(&token)
        .counterparties(&bank_id, &account_id, OWNER_VIEW)
        .await?;
    Ok(Json(CounterpartyListResponse { counterparties }))
}

/// GET /api/banks/:bank_id/accounts/:account_id/transaction-requests
async fn transaction_requests_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Path((bank_id, account_id)): Path<(String, String)>,
) -> Result<Json<TransactionRequestListResponse>, ApiError> {
    let transaction_requests = state
        .obp_client(&token)
        .transaction_requests_for_account(&bank_id, &account_id, OWNER_VIEW)
        .await?;
    Ok(Json(TransactionRequestListResponse {
        transaction_requests,
    }))
}

/// POST /api/banks/:bank_id/accounts/:account_id/transaction-requests
///
/// Initiates an ACCOUNT-type transfer from the given account to the `to`
/// account in the body.
async fn create_transaction_request_handler(
    State(state): State<AppState>,
    AuthToken(token): AuthToken,
    Path((bank_id, account_id)): Path<(String, String)>,
    Json(request): Json<NewTransactionRequest>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!(
        "Creating transaction request from {}/{} to {}/{}",
        bank_id,
        account_id,
        request.to.bank_id,
        request.to.account_id
    );
    let created = state
        .obp_client(&token)
        .create_transaction_request(&bank_id, &account_id, &request, OWNER_VIEW)
        .await?;
    Ok(Json(json!({
        "success": true,
        "transaction_request": created,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The transfer body accepted here is exactly the payload the OBP API
    /// expects, so a front-end can post it through unchanged.
    #[test]
    fn test_transfer_body_shape() {
        let request: NewTransactionRequest = serde_json::from_str(
            r#"{
                "to": { "bank_id": "lc.bnk.1", "account_id": "acc-2" },
                "value": { "currency": "BWP", "amount": "25.00" },
                "description": "Lunch split"
            }"#,
        )
        .unwrap();
        assert_eq!(request.to.bank_id, "lc.bnk.1");
        assert_eq!(request.value.amount, "25.00");
        assert_eq!(request.description, "Lunch split");
    }
}
