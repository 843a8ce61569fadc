//! Paper Exchange - Simulated Stock Trading Core
//!
//! Virtual cash, paper orders, an auditable append-only ledger.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, OrderId, etc.)
//! - [`models`] - Order row and wire enums
//! - [`balance`] - Enforced balance type
//! - [`account`] - Account registry and balance mutation
//! - [`ledger`] - Append-only order ledger with CSV audit mirror
//! - [`holdings`] - Holdings folded from ledger rows
//! - [`market`] - Stock directory and halt gates
//! - [`fx`] - Currency conversion seam
//! - [`engine`] - Order execution and deposits
//! - [`notification`] - Domain events rendered for the user
//! - [`user_auth`] - Registration, login, JWT verification
//! - [`gateway`] - HTTP API

// Core types - must be first!
pub mod core_types;

// Trading components
pub mod account;
pub mod balance;
pub mod engine;
pub mod fx;
pub mod holdings;
pub mod ledger;
pub mod market;
pub mod models;
pub mod notification;

// Service surface
pub mod config;
pub mod gateway;
pub mod logging;
pub mod user_auth;

// Convenient re-exports at crate root
pub use account::{Account, AccountError, AccountStatus, AccountStore};
pub use balance::Balance;
pub use core_types::{NotificationId, OrderId, UserId};
pub use engine::{Execution, ExecutionEngine, ExecutionError, OrderRequest};
pub use fx::{FixedRate, RateProvider};
pub use ledger::{LedgerError, LedgerStore, NewOrder};
pub use market::{Market, StockInfo};
pub use models::{Order, OrderStatus, Side, StockType};
pub use notification::{AccountEvent, EventSink, Notification, NotificationStore};
pub use user_auth::UserAuthService;
