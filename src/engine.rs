//! Engine - Order execution core
//!
//! Validates and executes buy/sell orders and wallet deposits. Every
//! request runs start to finish under that user's lock, so the balance
//! read-modify-write and the holdings-check/append pair can never
//! interleave with another request for the same account. Validation
//! failures are terminal and side-effect-free.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::account::{AccountError, AccountStore};
use crate::core_types::UserId;
use crate::fx::RateProvider;
use crate::holdings;
use crate::ledger::{LedgerError, LedgerStore, NewOrder};
use crate::market::Market;
use crate::models::{DEPOSIT_SYMBOL, Order, OrderStatus, Side, StockType};
use crate::notification::{AccountEvent, EventSink};

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Trading is currently halted")]
    TradingHalted,

    #[error("Trading in {0} is currently halted")]
    SymbolHalted(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Account is suspended")]
    UserSuspended,

    #[error("Count must be a positive whole number")]
    InvalidQuantity,

    #[error("Insufficient holdings: only {held} shares held")]
    InsufficientHoldings { held: i64 },

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<LedgerError> for ExecutionError {
    fn from(e: LedgerError) -> Self {
        ExecutionError::Storage(e.to_string())
    }
}

impl From<AccountError> for ExecutionError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::NotFound => ExecutionError::UserNotFound,
            AccountError::Balance("Insufficient funds") => ExecutionError::InsufficientFunds,
            other => ExecutionError::Storage(other.to_string()),
        }
    }
}

/// Trade request as submitted by an authenticated user
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub symbol: String,
    pub name: String,
    /// Unit price as quoted to the user
    pub price: Decimal,
    /// Requested share count; must be a positive whole number
    pub count: Decimal,
    /// Total as quoted, pre-conversion
    pub total_price: Decimal,
    pub stock_type: StockType,
    pub side: Side,
    /// Exchange code the instrument trades on
    pub exchange: String,
}

/// Outcome of a fulfilled order or deposit
#[derive(Debug, Clone)]
pub struct Execution {
    pub order: Order,
    pub balance_after: Decimal,
}

pub struct ExecutionEngine {
    accounts: Arc<AccountStore>,
    ledger: Arc<LedgerStore>,
    market: Arc<Market>,
    rates: Arc<dyn RateProvider>,
    events: Arc<dyn EventSink>,
    /// Exchange codes whose totals settle at face value
    domestic_exchanges: Vec<String>,
    /// Per-account critical-section locks, created lazily
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl ExecutionEngine {
    pub fn new(
        accounts: Arc<AccountStore>,
        ledger: Arc<LedgerStore>,
        market: Arc<Market>,
        rates: Arc<dyn RateProvider>,
        events: Arc<dyn EventSink>,
        domestic_exchanges: Vec<String>,
    ) -> Self {
        ExecutionEngine {
            accounts,
            ledger,
            market,
            rates,
            events,
            domestic_exchanges,
            locks: DashMap::new(),
        }
    }

    fn account_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Normalize a submitted total into the base currency.
    /// Domestic exchanges pass through; anything else is multiplied
    /// by the provider rate.
    fn converted_total(&self, exchange: &str, total: Decimal) -> Decimal {
        if self.domestic_exchanges.iter().any(|d| d == exchange) {
            total
        } else {
            total * self.rates.conversion_rate()
        }
    }

    /// Validate and execute one trade.
    ///
    /// Validation order, first failure wins: system halt, symbol halt,
    /// unknown user, suspension, count, then the side-specific
    /// holdings/funds check against the converted total.
    pub async fn execute_order(&self, req: OrderRequest) -> Result<Execution, ExecutionError> {
        let lock = self.account_lock(req.user_id);
        let _guard = lock.lock().await;

        if self.market.is_system_halted() {
            return Err(ExecutionError::TradingHalted);
        }
        if self.market.is_symbol_halted(&req.symbol) {
            return Err(ExecutionError::SymbolHalted(req.symbol.clone()));
        }

        let account = self
            .accounts
            .get(req.user_id)
            .ok_or(ExecutionError::UserNotFound)?;
        if account.is_suspended() {
            return Err(ExecutionError::UserSuspended);
        }

        // Whole-share validation happens on the value as submitted;
        // the persisted row carries the truncated count, identical for
        // any accepted request.
        if req.count <= Decimal::ZERO || !req.count.fract().is_zero() {
            return Err(ExecutionError::InvalidQuantity);
        }
        let count = req
            .count
            .trunc()
            .to_i64()
            .ok_or(ExecutionError::InvalidQuantity)?;

        let converted = self.converted_total(&req.exchange, req.total_price);

        match req.side {
            Side::Sell => {
                let orders = self.ledger.orders_for(req.user_id)?;
                let held = holdings::holding_for(&orders, &req.symbol);
                if count > held {
                    return Err(ExecutionError::InsufficientHoldings { held });
                }
            }
            Side::Buy => {
                if converted > account.balance.avail() {
                    return Err(ExecutionError::InsufficientFunds);
                }
            }
        }

        // Execute: balance first, then the ledger row. If the append
        // fails the balance change is compensated, keeping the pair
        // atomic under the account lock.
        let balance_after = match req.side {
            Side::Buy => self.accounts.debit(req.user_id, converted)?,
            Side::Sell => self.accounts.credit(req.user_id, converted)?,
        };

        let appended = self.ledger.append(NewOrder {
            user_id: req.user_id,
            symbol: req.symbol.clone(),
            name: req.name.clone(),
            price: req.price,
            count,
            total_price: req.total_price,
            stock_type: req.stock_type,
            side: req.side,
            status: OrderStatus::Executed,
        });
        let order = match appended {
            Ok(order) => order,
            Err(e) => {
                let compensation = match req.side {
                    Side::Buy => self.accounts.credit(req.user_id, converted),
                    Side::Sell => self.accounts.debit(req.user_id, converted),
                };
                if let Err(comp_err) = compensation {
                    tracing::error!(
                        user_id = req.user_id,
                        "balance compensation failed after ledger error: {}",
                        comp_err
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            user_id = req.user_id,
            order_id = order.order_id,
            symbol = %order.symbol,
            side = ?order.side,
            count,
            %converted,
            "order fulfilled"
        );

        self.events.publish(AccountEvent::OrderFulfilled {
            user_id: req.user_id,
            side: req.side,
            symbol: req.symbol,
            count,
            total_price: req.total_price,
        });

        Ok(Execution {
            order,
            balance_after,
        })
    }

    /// Credit virtual funds to the wallet and record the movement as a
    /// settled cash row.
    pub async fn deposit(
        &self,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<Execution, ExecutionError> {
        if amount <= Decimal::ZERO {
            return Err(ExecutionError::InvalidAmount);
        }

        let lock = self.account_lock(user_id);
        let _guard = lock.lock().await;

        if self.accounts.get(user_id).is_none() {
            return Err(ExecutionError::UserNotFound);
        }

        let balance_after = self.accounts.credit(user_id, amount)?;

        let appended = self.ledger.append(NewOrder {
            user_id,
            symbol: DEPOSIT_SYMBOL.to_string(),
            name: "Wallet Top-up".to_string(),
            price: amount,
            count: 1,
            total_price: amount,
            stock_type: StockType::Cash,
            side: Side::Buy,
            status: OrderStatus::Settled,
        });
        let order = match appended {
            Ok(order) => order,
            Err(e) => {
                if let Err(comp_err) = self.accounts.debit(user_id, amount) {
                    tracing::error!(
                        user_id,
                        "balance compensation failed after ledger error: {}",
                        comp_err
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(user_id, %amount, "deposit settled");

        self.events
            .publish(AccountEvent::DepositMade { user_id, amount });

        Ok(Execution {
            order,
            balance_after,
        })
    }
}
