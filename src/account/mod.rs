//! Account management module
//!
//! In-memory storage for user accounts: cash balance, suspension
//! status and login credentials.

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::{Account, AccountStatus};
pub use store::{AccountError, AccountStore};
