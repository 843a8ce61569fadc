//! Paper Exchange - Simulated Stock Trading Core
//!
//! Main entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ Gateway  │───▶│  Engine  │───▶│ Accounts │───▶│  Ledger  │
//! │ (axum)   │    │ (checks) │    │ (balance)│    │ (append) │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! The engine validates, mutates the balance and appends to the ledger
//! under a per-account lock; notifications fan out from engine events.

use std::sync::Arc;

use paper_exchange::account::AccountStore;
use paper_exchange::engine::ExecutionEngine;
use paper_exchange::fx::FixedRate;
use paper_exchange::gateway::{self, state::AppState};
use paper_exchange::ledger::LedgerStore;
use paper_exchange::market::Market;
use paper_exchange::notification::NotificationStore;
use paper_exchange::user_auth::UserAuthService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = paper_exchange::config::AppConfig::load(&env);
    let _log_guard = paper_exchange::logging::init_logging(&app_config);

    tracing::info!("Starting Paper Exchange in {} mode", env);

    let engine_config = &app_config.engine;

    // Storage and market state
    let accounts = Arc::new(AccountStore::new(engine_config.opening_balance));
    let ledger = match &engine_config.ledger_audit_path {
        Some(path) => {
            if let Some(dir) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(dir)?;
            }
            Arc::new(LedgerStore::with_audit(path)?)
        }
        None => Arc::new(LedgerStore::new()),
    };
    let market = Arc::new(Market::new());
    let notifications = Arc::new(NotificationStore::new());

    // Execution path
    let engine = Arc::new(ExecutionEngine::new(
        accounts.clone(),
        ledger.clone(),
        market.clone(),
        Arc::new(FixedRate::new(engine_config.conversion_rate)),
        notifications.clone(),
        engine_config.domestic_exchanges.clone(),
    ));

    // Auth
    let user_auth = Arc::new(UserAuthService::new(
        accounts.clone(),
        app_config.jwt_secret.clone(),
    ));

    // Bootstrap admin account (idempotent across clean restarts; the
    // store is in-memory so a fresh process always starts empty)
    if let Some(admin) = &app_config.bootstrap_admin {
        match user_auth.register_admin(&admin.username, &admin.email, &admin.password) {
            Ok(user_id) => tracing::info!(user_id, "bootstrap admin created"),
            Err(e) => tracing::warn!("bootstrap admin not created: {}", e),
        }
    }

    let state = Arc::new(AppState::new(
        engine,
        accounts,
        ledger,
        market,
        notifications,
        user_auth,
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
