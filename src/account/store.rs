//! In-memory account store
//!
//! Keyed by user id with an email index for login. Balance mutation is
//! entry-atomic; cross-step atomicity (check then mutate) is the
//! engine's job via its per-account lock.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use thiserror::Error;

use super::models::{Account, AccountStatus};
use crate::balance::Balance;
use crate::core_types::UserId;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Balance operation failed: {0}")]
    Balance(&'static str),
}

pub struct AccountStore {
    accounts: DashMap<UserId, Account>,
    by_email: DashMap<String, UserId>,
    next_user_id: AtomicI64,
    opening_balance: Decimal,
}

impl AccountStore {
    /// `opening_balance` seeds every newly created account
    pub fn new(opening_balance: Decimal) -> Self {
        AccountStore {
            accounts: DashMap::new(),
            by_email: DashMap::new(),
            next_user_id: AtomicI64::new(1),
            opening_balance,
        }
    }

    /// Create an account with the configured opening balance.
    /// The email index entry is reserved first, so concurrent
    /// registrations of the same email cannot both succeed.
    pub fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<Account, AccountError> {
        let user_id = match self.by_email.entry(email.to_string()) {
            Entry::Occupied(_) => return Err(AccountError::EmailTaken(email.to_string())),
            Entry::Vacant(slot) => {
                let user_id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(user_id);
                user_id
            }
        };

        let account = Account {
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            balance: Balance::new(self.opening_balance),
            status: AccountStatus::Active,
            is_admin,
            created_at: Utc::now(),
        };
        self.accounts.insert(user_id, account.clone());
        tracing::info!(user_id, username, "account created");
        Ok(account)
    }

    pub fn get(&self, user_id: UserId) -> Option<Account> {
        self.accounts.get(&user_id).map(|a| a.clone())
    }

    pub fn get_by_email(&self, email: &str) -> Option<Account> {
        let user_id = *self.by_email.get(email)?;
        self.get(user_id)
    }

    /// Credit cash; returns the new available balance
    pub fn credit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, AccountError> {
        let mut account = self.accounts.get_mut(&user_id).ok_or(AccountError::NotFound)?;
        account.balance.credit(amount).map_err(AccountError::Balance)?;
        Ok(account.balance.avail())
    }

    /// Debit cash; returns the new available balance
    pub fn debit(&self, user_id: UserId, amount: Decimal) -> Result<Decimal, AccountError> {
        let mut account = self.accounts.get_mut(&user_id).ok_or(AccountError::NotFound)?;
        account.balance.debit(amount).map_err(AccountError::Balance)?;
        Ok(account.balance.avail())
    }

    pub fn set_suspended(&self, user_id: UserId, suspended: bool) -> Result<(), AccountError> {
        let mut account = self.accounts.get_mut(&user_id).ok_or(AccountError::NotFound)?;
        account.status = if suspended {
            AccountStatus::Suspended
        } else {
            AccountStatus::Active
        };
        tracing::warn!(user_id, suspended, "account suspension changed");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.accounts.len()
    }

    /// All accounts, sorted by user id for stable telemetry output
    pub fn list(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|e| e.value().clone()).collect();
        accounts.sort_by_key(|a| a.user_id);
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AccountStore {
        AccountStore::new(Decimal::from(10_000))
    }

    #[test]
    fn test_create_seeds_opening_balance() {
        let accounts = store();
        let a = accounts.create("alice", "alice@example.com", "hash", false).unwrap();
        assert_eq!(a.user_id, 1);
        assert_eq!(a.balance.avail(), Decimal::from(10_000));
        assert_eq!(a.status, AccountStatus::Active);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let accounts = store();
        accounts.create("alice", "alice@example.com", "h1", false).unwrap();
        let err = accounts.create("alice2", "alice@example.com", "h2", false);
        assert!(matches!(err, Err(AccountError::EmailTaken(_))));
        assert_eq!(accounts.count(), 1);
    }

    #[test]
    fn test_lookup_by_email() {
        let accounts = store();
        let a = accounts.create("bob", "bob@example.com", "hash", false).unwrap();
        let found = accounts.get_by_email("bob@example.com").unwrap();
        assert_eq!(found.user_id, a.user_id);
        assert!(accounts.get_by_email("nobody@example.com").is_none());
    }

    #[test]
    fn test_credit_debit_round_trip() {
        let accounts = store();
        let a = accounts.create("carol", "carol@example.com", "hash", false).unwrap();
        let after = accounts.credit(a.user_id, Decimal::from(500)).unwrap();
        assert_eq!(after, Decimal::from(10_500));
        let after = accounts.debit(a.user_id, Decimal::from(1_500)).unwrap();
        assert_eq!(after, Decimal::from(9_000));
    }

    #[test]
    fn test_debit_beyond_balance_fails_cleanly() {
        let accounts = store();
        let a = accounts.create("dave", "dave@example.com", "hash", false).unwrap();
        let err = accounts.debit(a.user_id, Decimal::from(10_001));
        assert!(matches!(err, Err(AccountError::Balance("Insufficient funds"))));
        assert_eq!(
            accounts.get(a.user_id).unwrap().balance.avail(),
            Decimal::from(10_000)
        );
    }

    #[test]
    fn test_mutations_on_missing_account() {
        let accounts = store();
        assert!(matches!(
            accounts.credit(99, Decimal::ONE),
            Err(AccountError::NotFound)
        ));
        assert!(matches!(
            accounts.set_suspended(99, true),
            Err(AccountError::NotFound)
        ));
    }

    #[test]
    fn test_suspend_and_reinstate() {
        let accounts = store();
        let a = accounts.create("erin", "erin@example.com", "hash", false).unwrap();
        accounts.set_suspended(a.user_id, true).unwrap();
        assert!(accounts.get(a.user_id).unwrap().is_suspended());
        accounts.set_suspended(a.user_id, false).unwrap();
        assert!(!accounts.get(a.user_id).unwrap().is_suspended());
    }
}
