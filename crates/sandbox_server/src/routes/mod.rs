//! Route modules for the sandbox server
//!
//! This module contains endpoint group-specific routers:
//! - health: health check and readiness endpoints
//! - banks: bank browsing endpoints
//! - accounts: account, transaction and counterparty browsing endpoints
//! - populate: sandbox population survey and action

pub mod accounts;
pub mod banks;
pub mod health;
pub mod populate;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use obp_client::ObpClient;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Shared connection pool for calls to the OBP API
    pub http: reqwest::Client,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            start_time: std::time::Instant::now(),
        }
    }

    /// OBP client scoped to one caller's token, on the shared pool
    pub fn obp_client(&self, access_token: &str) -> ObpClient {
        ObpClient::with_http_client(
            self.http.clone(),
            &self.config.obp_base_url,
            &self.config.obp_api_version,
            access_token,
        )
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .merge(banks::routes())
        .merge(accounts::routes())
        .merge(populate::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
