use std::sync::Arc;

use crate::account::AccountStore;
use crate::engine::ExecutionEngine;
use crate::ledger::LedgerStore;
use crate::market::Market;
use crate::notification::NotificationStore;
use crate::user_auth::UserAuthService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Order execution and deposit path
    pub engine: Arc<ExecutionEngine>,
    /// Account registry (read side)
    pub accounts: Arc<AccountStore>,
    /// Append-only order ledger (read side)
    pub ledger: Arc<LedgerStore>,
    /// Stock directory and halt gates
    pub market: Arc<Market>,
    /// Per-user notification log
    pub notifications: Arc<NotificationStore>,
    /// Registration, login and JWT verification
    pub user_auth: Arc<UserAuthService>,
}

impl AppState {
    pub fn new(
        engine: Arc<ExecutionEngine>,
        accounts: Arc<AccountStore>,
        ledger: Arc<LedgerStore>,
        market: Arc<Market>,
        notifications: Arc<NotificationStore>,
        user_auth: Arc<UserAuthService>,
    ) -> Self {
        Self {
            engine,
            accounts,
            ledger,
            market,
            notifications,
            user_auth,
        }
    }
}
