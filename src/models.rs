// models.rs - Core order and ledger row types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{OrderId, UserId};

/// Sentinel symbol for cash top-up ledger rows
pub const DEPOSIT_SYMBOL: &str = "DEPOSIT";

/// Order side: Buy or Sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Position category carried on every ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockType {
    Intraday, // Same-day position
    Delivery, // Carried position
    Cash,     // Wallet movement (deposits)
}

/// Order status - terminal states for a persisted row
///
/// Execution here is immediate (no resting book), so a row is written
/// already terminal: Executed for trades, Settled for cash movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Executed, // Trade applied to balance and holdings
    Settled,  // Cash movement applied to balance
}

// ============================================================
// ORDER (the ledger row type used throughout the system)
// ============================================================

/// A fulfilled order, immutable once appended to the ledger.
///
/// `total_price` is recorded as submitted (pre-conversion); the
/// balance delta uses the converted value computed at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Trading symbol, or [`DEPOSIT_SYMBOL`] for cash top-ups
    pub symbol: String,
    /// Display name of the instrument
    pub name: String,
    /// Unit price as submitted
    pub price: Decimal,
    /// Share count, truncated toward zero at persistence
    pub count: i64,
    /// Total as submitted (pre-conversion)
    pub total_price: Decimal,
    pub stock_type: StockType,
    pub side: Side,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Signed share delta this row contributes to a holding
    pub fn signed_count(&self) -> i64 {
        match self.side {
            Side::Buy => self.count,
            Side::Sell => -self.count,
        }
    }

    /// True for cash-movement rows (excluded from the portfolio view)
    pub fn is_cash_row(&self) -> bool {
        self.symbol == DEPOSIT_SYMBOL
    }
}
