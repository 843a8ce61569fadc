/// ENFORCED CASH BALANCE TYPE - Used by the Account Store
///
/// This is the SINGLE source of truth for balance operations.
/// ALL balance mutations MUST go through these methods.
///
/// # Enforcement Strategy:
/// 1. Field is PRIVATE - no direct access
/// 2. All mutations return Result - errors are explicit
/// 3. Version auto-increments - audit trail
/// 4. checked arithmetic - corruption protection
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Virtual cash balance for one account
///
/// # Invariants (ENFORCED by the private field):
/// - Never negative
/// - Version increments on every successful mutation
/// - All state changes return Result
///
/// # Usage:
/// ```ignore
/// let mut balance = Balance::new(Decimal::from(10_000));
/// balance.credit(Decimal::from(500))?;   // avail = 10500, version++
/// balance.debit(Decimal::from(1_000))?;  // avail = 9500, version++
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    avail: Decimal, // PRIVATE - ONLY modified through credit/debit
    version: u64,   // PRIVATE - incremented on every mutation
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            avail: Decimal::ZERO,
            version: 0,
        }
    }
}

impl Balance {
    /// Create a balance with an opening amount (new-account seed)
    pub fn new(opening: Decimal) -> Self {
        Self {
            avail: opening,
            version: 0,
        }
    }

    // ============================================================
    // READ-ONLY GETTERS (safe to expose)
    // ============================================================

    /// Get available cash (read-only)
    #[inline(always)]
    pub const fn avail(&self) -> Decimal {
        self.avail
    }

    /// Get mutation version (read-only)
    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ============================================================
    // VALIDATED MUTATIONS (ENFORCED operations)
    // ============================================================

    /// Credit cash to the balance
    ///
    /// # Errors
    /// - "Credit must be positive" for zero/negative amounts
    /// - "Credit overflow" on arithmetic error
    pub fn credit(&mut self, amount: Decimal) -> Result<(), &'static str> {
        if amount <= Decimal::ZERO {
            return Err("Credit must be positive");
        }
        self.avail = self.avail.checked_add(amount).ok_or("Credit overflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Debit cash from the balance
    ///
    /// # Errors
    /// - "Debit must be positive" for zero/negative amounts
    /// - "Insufficient funds" if avail < amount
    pub fn debit(&mut self, amount: Decimal) -> Result<(), &'static str> {
        if amount <= Decimal::ZERO {
            return Err("Debit must be positive");
        }
        if self.avail < amount {
            return Err("Insufficient funds");
        }
        self.avail = self.avail.checked_sub(amount).ok_or("Debit underflow")?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_balance() {
        let b = Balance::new(dec("10000"));
        assert_eq!(b.avail(), dec("10000"));
        assert_eq!(b.version(), 0);
    }

    #[test]
    fn test_credit_increases_avail_and_version() {
        let mut b = Balance::default();
        b.credit(dec("250.50")).unwrap();
        assert_eq!(b.avail(), dec("250.50"));
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn test_credit_rejects_non_positive() {
        let mut b = Balance::new(dec("100"));
        assert!(b.credit(Decimal::ZERO).is_err());
        assert!(b.credit(dec("-5")).is_err());
        // failed mutation leaves state untouched
        assert_eq!(b.avail(), dec("100"));
        assert_eq!(b.version(), 0);
    }

    #[test]
    fn test_debit_decreases_avail() {
        let mut b = Balance::new(dec("1000"));
        b.debit(dec("999.99")).unwrap();
        assert_eq!(b.avail(), dec("0.01"));
        assert_eq!(b.version(), 1);
    }

    #[test]
    fn test_debit_insufficient_funds() {
        let mut b = Balance::new(dec("10"));
        let err = b.debit(dec("10.01")).unwrap_err();
        assert_eq!(err, "Insufficient funds");
        assert_eq!(b.avail(), dec("10"));
    }

    #[test]
    fn test_debit_exact_amount_to_zero() {
        let mut b = Balance::new(dec("42"));
        b.debit(dec("42")).unwrap();
        assert_eq!(b.avail(), Decimal::ZERO);
    }

    #[test]
    fn test_debit_rejects_non_positive() {
        let mut b = Balance::new(dec("100"));
        assert!(b.debit(Decimal::ZERO).is_err());
        assert!(b.debit(dec("-1")).is_err());
        assert_eq!(b.version(), 0);
    }
}
