//! End-to-end tests for the populate endpoints through a running server
//! and an in-process stateful mock OBP sandbox. The browser-facing
//! contract is the point here: urlencoded form in, `success`/`results`
//! JSON out, caller token forwarded upstream as-is.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use sandbox_server::config::ServerConfig;
use sandbox_server::server::Server;

/// Stateful stand-in for an OBP sandbox
#[derive(Default)]
struct MockObp {
    banks: Mutex<Vec<Value>>,
    /// bank id to account list entries, served with the `id` key
    accounts: Mutex<HashMap<String, Vec<Value>>>,
    /// "bank:account" to counterparty objects
    counterparties: Mutex<HashMap<String, Vec<Value>>>,
    /// "bank:from:to" to the stored FX body
    fx_rates: Mutex<HashMap<String, Value>>,
    /// bank id to booked transactions
    transactions: Mutex<HashMap<String, Vec<Value>>>,
    /// Authorization headers seen on /users/current
    auth_headers: Mutex<Vec<String>>,
    /// ordered log of operations, e.g. "bank_create:lc.bnk.1"
    calls: Mutex<Vec<String>>,
    next: AtomicUsize,
    /// when set, /users/current answers with a 500
    fail_current_user: bool,
}

impl MockObp {
    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

async fn current_user(
    State(state): State<Arc<MockObp>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.auth_headers.lock().unwrap().push(auth);
    if state.fail_current_user {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "OBP-50000: Unknown Error." })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "user_id": "user-1",
            "email": "alice@example.com",
            "username": "Alice"
        })),
    )
}

async fn list_banks(State(state): State<Arc<MockObp>>) -> Json<Value> {
    state.log("bank_list".to_string());
    let banks = state.banks.lock().unwrap();
    Json(json!({ "banks": &*banks }))
}

async fn get_bank(
    State(state): State<Arc<MockObp>>,
    Path(bank_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.log(format!("bank_check:{}", bank_id));
    let banks = state.banks.lock().unwrap();
    match banks.iter().find(|b| b["bank_id"] == bank_id.as_str()) {
        Some(bank) => (StatusCode::OK, Json(bank.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "OBP-30001: Bank not found." })),
        ),
    }
}

async fn create_bank(
    State(state): State<Arc<MockObp>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let bank_id = body["bank_id"].as_str().unwrap_or_default().to_string();
    state.log(format!("bank_create:{}", bank_id));
    state.banks.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn list_accounts(
    State(state): State<Arc<MockObp>>,
    Path(bank_id): Path<String>,
) -> Json<Value> {
    state.log(format!("account_list:{}", bank_id));
    let accounts = state.accounts.lock().unwrap();
    let entries = accounts.get(&bank_id).cloned().unwrap_or_default();
    Json(json!({ "accounts": entries }))
}

async fn create_account(
    State(state): State<Arc<MockObp>>,
    Path(bank_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.log(format!("account_create:{}", bank_id));
    let id = state.next_id("acc");
    let label = body["label"].clone();
    let currency = body["currency"].clone();
    state
        .accounts
        .lock()
        .unwrap()
        .entry(bank_id.clone())
        .or_default()
        .push(json!({ "id": id, "label": label, "currency": currency }));
    (
        StatusCode::CREATED,
        Json(json!({
            "account_id": id,
            "bank_id": bank_id,
            "label": label,
            "currency": currency,
            "balance": body["balance"],
        })),
    )
}

async fn list_counterparties(
    State(state): State<Arc<MockObp>>,
    Path((bank_id, account_id)): Path<(String, String)>,
) -> Json<Value> {
    state.log(format!("cp_list:{}:{}", bank_id, account_id));
    let map = state.counterparties.lock().unwrap();
    let entries = map
        .get(&format!("{}:{}", bank_id, account_id))
        .cloned()
        .unwrap_or_default();
    Json(json!({ "counterparties": entries }))
}

async fn create_counterparty(
    State(state): State<Arc<MockObp>>,
    Path((bank_id, account_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.log(format!(
        "cp_create:{}",
        body["name"].as_str().unwrap_or_default()
    ));
    let mut counterparty = body;
    counterparty["counterparty_id"] = json!(state.next_id("cp"));
    state
        .counterparties
        .lock()
        .unwrap()
        .entry(format!("{}:{}", bank_id, account_id))
        .or_default()
        .push(counterparty.clone());
    (StatusCode::CREATED, Json(counterparty))
}

async fn get_fx_rate(
    State(state): State<Arc<MockObp>>,
    Path((bank_id, from, to)): Path<(String, String, String)>,
) -> (StatusCode, Json<Value>) {
    state.log(format!("fx_get:{}:{}:{}", bank_id, from, to));
    let rates = state.fx_rates.lock().unwrap();
    match rates.get(&format!("{}:{}:{}", bank_id, from, to)) {
        Some(rate) => (StatusCode::OK, Json(rate.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "OBP-10404: FX rate not found" })),
        ),
    }
}

async fn put_fx_rate(
    State(state): State<Arc<MockObp>>,
    Path(bank_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let from = body["from_currency_code"].as_str().unwrap_or_default();
    let to = body["to_currency_code"].as_str().unwrap_or_default();
    state.log(format!("fx_put:{}:{}:{}", bank_id, from, to));
    state
        .fx_rates
        .lock()
        .unwrap()
        .insert(format!("{}:{}:{}", bank_id, from, to), body.clone());
    (StatusCode::OK, Json(body))
}

async fn create_transaction(
    State(state): State<Arc<MockObp>>,
    Path(bank_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.log(format!("txn_create:{}", bank_id));
    let txn = json!({
        "transaction_id": state.next_id("txn"),
        "details": {
            "type": body["type"],
            "description": body["description"],
            "posted": body["posted"],
            "completed": body["completed"],
            "value": body["value"],
        }
    });
    state
        .transactions
        .lock()
        .unwrap()
        .entry(bank_id)
        .or_default()
        .push(txn.clone());
    (StatusCode::CREATED, Json(txn))
}

async fn list_transactions(
    State(state): State<Arc<MockObp>>,
    Path((bank_id, account_id)): Path<(String, String)>,
) -> Json<Value> {
    state.log(format!("txn_list:{}:{}", bank_id, account_id));
    let map = state.transactions.lock().unwrap();
    let entries = map.get(&bank_id).cloned().unwrap_or_default();
    Json(json!({ "transactions": entries }))
}

fn mock_router(state: Arc<MockObp>) -> Router {
    Router::new()
        .route("/obp/v6.0.0/users/current", get(current_user))
        .route("/obp/v6.0.0/banks", get(list_banks).post(create_bank))
        .route("/obp/v6.0.0/banks/:bank_id", get(get_bank))
        .route(
            "/obp/v6.0.0/banks/:bank_id/accounts",
            get(list_accounts).post(create_account),
        )
        .route(
            "/obp/v6.0.0/banks/:bank_id/accounts/:account_id/owner/counterparties",
            get(list_counterparties).post(create_counterparty),
        )
        .route("/obp/v6.0.0/banks/:bank_id/fx/:from/:to", get(get_fx_rate))
        .route("/obp/v6.0.0/banks/:bank_id/fx", put(put_fx_rate))
        .route(
            "/obp/v6.0.0/banks/:bank_id/management/historical/transactions",
            post(create_transaction),
        )
        .route(
            "/obp/v6.0.0/banks/:bank_id/accounts/:account_id/owner/transactions",
            get(list_transactions),
        )
        .with_state(state)
}

/// Serve the mock on an ephemeral port and return its base URL
async fn serve_mock(state: Arc<MockObp>) -> String {
    let app = mock_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Boot the real server against the mock and return its base URL
async fn spawn_server(obp_base_url: String) -> String {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        obp_base_url,
        ..Default::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(config);
    tokio::spawn(async move {
        server.run_with_listener(listener).await.ok();
    });
    format!("http://{}", addr)
}

async fn post_form(base: &str, fields: &[(&str, &str)]) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/api/populate", base))
        .header("Authorization", "Bearer test-token")
        .form(fields)
        .send()
        .await
        .unwrap();
    let status = response.status();
    let json = response.json().await.unwrap();
    (status, json)
}

/// A form post against a clean sandbox creates exactly what it asked for
#[tokio::test]
async fn test_form_post_populates_fresh_sandbox() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;

    let (status, json) =
        post_form(&base, &[("numBanks", "1"), ("numAccountsPerBank", "2")]).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(json["success"], true);
    let results = &json["results"];
    assert_eq!(results["errors"], json!([]));

    let banks = results["banks"].as_array().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0]["bank_id"], "lc.bnk.1");
    assert_eq!(banks[0]["full_name"], "Alice Test Bank 1");
    assert_eq!(banks[0]["existed"], false);

    let accounts = results["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["label"], "Account 1");
    assert_eq!(accounts[1]["label"], "Account 2");
    assert_eq!(accounts[0]["currency"], "BWP");

    // optional stages stay off without their checkboxes
    assert_eq!(results["counterparties"], json!([]));
    assert_eq!(results["fxRates"], json!([]));
    assert_eq!(results["transactions"], json!([]));

    assert_eq!(state.banks.lock().unwrap().len(), 1);
    assert_eq!(state.accounts.lock().unwrap()["lc.bnk.1"].len(), 2);
}

/// Posting the same form twice finds everything and creates nothing new
#[tokio::test]
async fn test_second_post_reports_existing() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;
    let form = [("numBanks", "1"), ("numAccountsPerBank", "2")];

    let (_, first) = post_form(&base, &form).await;
    let (status, second) = post_form(&base, &form).await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(second["success"], true);
    let results = &second["results"];
    assert_eq!(results["errors"], json!([]));
    assert_eq!(results["banks"][0]["existed"], true);
    let accounts = results["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.iter().all(|a| a["existed"] == true));

    // ids resolve to the ones minted on the first run
    assert_eq!(
        results["accounts"][0]["account_id"],
        first["results"]["accounts"][0]["account_id"]
    );

    assert_eq!(state.call_count("bank_create"), 1);
    assert_eq!(state.call_count("account_create"), 2);
}

/// Checkbox fields switch the optional stages on
#[tokio::test]
async fn test_checkboxes_drive_optional_stages() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;

    let (status, json) = post_form(
        &base,
        &[
            ("numBanks", "1"),
            ("numAccountsPerBank", "2"),
            ("createCounterparties", "on"),
            ("createFxRates", "on"),
            ("createTransactions", "on"),
        ],
    )
    .await;

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(json["success"], true);
    let results = &json["results"];
    assert_eq!(results["errors"], json!([]));

    let counterparties = results["counterparties"].as_array().unwrap();
    assert_eq!(counterparties.len(), 10);
    assert_eq!(counterparties[0]["name"], "Mokolodi Crafts");

    // 13 configured currencies, both directions each
    let fx = results["fxRates"].as_array().unwrap();
    assert_eq!(fx.len(), 26);
    assert_eq!(fx[0]["from_currency"], "BWP");
    assert_eq!(fx[0]["to_currency"], "EUR");
    assert_eq!(fx[0]["rate"], 0.068);
    assert_eq!(fx[1]["from_currency"], "EUR");
    assert_eq!(fx[1]["rate"], 14.705882);

    let transactions = results["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 12);
    for txn in transactions {
        assert_eq!(txn["bank_id"], "lc.bnk.1");
        assert_eq!(txn["existed"], false);
        let amount = txn["amount"].as_str().unwrap();
        assert!(amount.ends_with(" BWP"), "amount {}", amount);
    }
}

/// The survey mirrors whatever a previous post put in place
#[tokio::test]
async fn test_survey_reflects_populated_sandbox() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp.clone()).await;

    post_form(&base, &[("numBanks", "1"), ("numAccountsPerBank", "2")]).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/populate", base))
        .header("Authorization", "Bearer test-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let json: Value = response.json().await.unwrap();

    assert_eq!(json["username"], "Alice");
    assert_eq!(json["obpBaseUrl"], obp);
    assert_eq!(json["defaults"]["bankIdPrefix"], "lc");

    let existing = &json["existing"];
    assert_eq!(existing["banks"].as_array().unwrap().len(), 1);
    assert_eq!(existing["banks"][0]["bank_id"], "lc.bnk.1");
    // the survey reports the short name as the code
    assert_eq!(existing["banks"][0]["bank_code"], "TB1");

    let accounts = existing["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["label"], "Account 1");
    assert_eq!(accounts[0]["bank_id"], "lc.bnk.1");

    assert_eq!(existing["counterparties"], json!([]));
    assert_eq!(existing["fxRates"], json!([]));
    assert_eq!(existing["transactions"], json!([]));
}

/// No bearer token, no population
#[tokio::test]
async fn test_populate_requires_auth() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/populate", base))
        .form(&[("numBanks", "1")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Not authenticated");
    assert!(state.banks.lock().unwrap().is_empty());
}

/// An unresolvable user aborts before any stage runs
#[tokio::test]
async fn test_unresolvable_user_aborts_with_500() {
    let state = Arc::new(MockObp {
        fail_current_user: true,
        ..Default::default()
    });
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;

    let (status, json) =
        post_form(&base, &[("numBanks", "1"), ("numAccountsPerBank", "1")]).await;

    assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Could not resolve current user"));
    assert_eq!(json["results"]["banks"], json!([]));
    assert!(state.banks.lock().unwrap().is_empty());
}

/// The caller's own token travels upstream unchanged
#[tokio::test]
async fn test_caller_token_is_forwarded() {
    let state = Arc::new(MockObp::default());
    let obp = serve_mock(state.clone()).await;
    let base = spawn_server(obp).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/populate", base))
        .header("Authorization", "Bearer sesame-42")
        .form(&[("numBanks", "1"), ("numAccountsPerBank", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let seen = state.auth_headers.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|h| h == "Bearer sesame-42"));
}
