//! Data models for account management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::balance::Balance;
use crate::core_types::UserId;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    /// Admin-frozen: login and trading are both refused
    Suspended,
}

/// User account
///
/// The balance is the enforced [`Balance`] type; all mutation goes
/// through the store so the non-negative invariant holds everywhere.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub balance: Balance,
    pub status: AccountStatus,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_suspended(&self) -> bool {
        self.status == AccountStatus::Suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_suspension_flag() {
        let mut account = Account {
            user_id: 1,
            username: "test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: String::new(),
            balance: Balance::new(Decimal::from(10_000)),
            status: AccountStatus::Active,
            is_admin: false,
            created_at: Utc::now(),
        };
        assert!(!account.is_suspended());
        account.status = AccountStatus::Suspended;
        assert!(account.is_suspended());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&AccountStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
        assert_eq!(
            serde_json::from_str::<AccountStatus>("\"SUSPENDED\"").unwrap(),
            AccountStatus::Suspended
        );
    }
}
