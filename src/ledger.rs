//! Ledger - Append-only order log
//!
//! Records every fulfilled order and cash movement for complete
//! auditability. Holdings and order history are derived from this log;
//! rows are never updated or deleted.

use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core_types::{OrderId, UserId};
use crate::models::Order;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger storage error: {0}")]
    Storage(String),

    #[error("Audit file error: {0}")]
    Audit(#[from] std::io::Error),
}

/// Fields of an order the caller supplies; the ledger assigns
/// `order_id` and `created_at` on append.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub symbol: String,
    pub name: String,
    pub price: rust_decimal::Decimal,
    pub count: i64,
    pub total_price: rust_decimal::Decimal,
    pub stock_type: crate::models::StockType,
    pub side: crate::models::Side,
    pub status: crate::models::OrderStatus,
}

/// Writes appended rows to a CSV audit file
///
/// Audit output is advisory: a failed write is logged and counted,
/// never surfaced to the caller, so the in-memory log stays the
/// single source of truth.
struct AuditWriter {
    file: File,
    entry_count: u64,
}

impl AuditWriter {
    fn new(path: &str) -> Result<Self, std::io::Error> {
        let mut file = File::create(path)?;
        // Header: order_id,user_id,symbol,side,count,total_price,status,created_at
        writeln!(
            file,
            "order_id,user_id,symbol,side,count,total_price,status,created_at"
        )?;
        Ok(AuditWriter {
            file,
            entry_count: 0,
        })
    }

    fn write_row(&mut self, order: &Order) -> Result<(), std::io::Error> {
        writeln!(
            self.file,
            "{},{},{},{:?},{},{},{:?},{}",
            order.order_id,
            order.user_id,
            order.symbol,
            order.side,
            order.count,
            order.total_price,
            order.status,
            order.created_at.to_rfc3339()
        )?;
        self.entry_count += 1;
        Ok(())
    }
}

/// In-memory append-only order log with a per-user index
pub struct LedgerStore {
    rows: RwLock<Vec<Order>>,
    // row indices per user, so user scans are O(user's orders)
    by_user: RwLock<FxHashMap<UserId, Vec<usize>>>,
    next_order_id: AtomicU64,
    audit: Option<Mutex<AuditWriter>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        LedgerStore {
            rows: RwLock::new(Vec::new()),
            by_user: RwLock::new(FxHashMap::default()),
            next_order_id: AtomicU64::new(1),
            audit: None,
        }
    }

    /// Create a ledger that mirrors every appended row to a CSV file
    pub fn with_audit(path: &str) -> Result<Self, LedgerError> {
        let writer = AuditWriter::new(path)?;
        let mut ledger = LedgerStore::new();
        ledger.audit = Some(Mutex::new(writer));
        Ok(ledger)
    }

    /// Append one row. Assigns the next order id and timestamp.
    pub fn append(&self, new: NewOrder) -> Result<Order, LedgerError> {
        let order_id: OrderId = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            order_id,
            user_id: new.user_id,
            symbol: new.symbol,
            name: new.name,
            price: new.price,
            count: new.count,
            total_price: new.total_price,
            stock_type: new.stock_type,
            side: new.side,
            status: new.status,
            created_at: chrono::Utc::now(),
        };

        {
            let mut rows = self
                .rows
                .write()
                .map_err(|e| LedgerError::Storage(e.to_string()))?;
            let mut by_user = self
                .by_user
                .write()
                .map_err(|e| LedgerError::Storage(e.to_string()))?;
            by_user.entry(order.user_id).or_default().push(rows.len());
            rows.push(order.clone());
        }

        if let Some(audit) = &self.audit {
            match audit.lock() {
                Ok(mut w) => {
                    if let Err(e) = w.write_row(&order) {
                        tracing::error!(order_id, "audit write failed: {}", e);
                    }
                }
                Err(e) => tracing::error!(order_id, "audit writer poisoned: {}", e),
            }
        }

        Ok(order)
    }

    /// All rows for one user, oldest first
    pub fn orders_for(&self, user_id: UserId) -> Result<Vec<Order>, LedgerError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let by_user = self
            .by_user
            .read()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(by_user
            .get(&user_id)
            .map(|idxs| idxs.iter().map(|&i| rows[i].clone()).collect())
            .unwrap_or_default())
    }

    /// Last `limit` rows across all users, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Order>, LedgerError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }

    /// Total number of rows appended
    pub fn len(&self) -> usize {
        self.rows.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, Side, StockType};
    use rust_decimal::Decimal;

    fn draft(user_id: UserId, symbol: &str, side: Side, count: i64) -> NewOrder {
        NewOrder {
            user_id,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            price: Decimal::from(10),
            count,
            total_price: Decimal::from(10 * count),
            stock_type: StockType::Delivery,
            side,
            status: OrderStatus::Executed,
        }
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let ledger = LedgerStore::new();
        let a = ledger.append(draft(1, "TCS", Side::Buy, 5)).unwrap();
        let b = ledger.append(draft(1, "TCS", Side::Buy, 5)).unwrap();
        assert_eq!(a.order_id, 1);
        assert_eq!(b.order_id, 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_orders_for_isolates_users() {
        let ledger = LedgerStore::new();
        ledger.append(draft(1, "TCS", Side::Buy, 5)).unwrap();
        ledger.append(draft(2, "INFY", Side::Buy, 3)).unwrap();
        ledger.append(draft(1, "INFY", Side::Sell, 1)).unwrap();

        let mine = ledger.orders_for(1).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == 1));
        assert!(ledger.orders_for(99).unwrap().is_empty());
    }

    #[test]
    fn test_orders_for_preserves_append_order() {
        let ledger = LedgerStore::new();
        ledger.append(draft(1, "TCS", Side::Buy, 5)).unwrap();
        ledger.append(draft(1, "INFY", Side::Buy, 3)).unwrap();
        let mine = ledger.orders_for(1).unwrap();
        assert_eq!(mine[0].symbol, "TCS");
        assert_eq!(mine[1].symbol, "INFY");
    }

    #[test]
    fn test_recent_is_newest_first() {
        let ledger = LedgerStore::new();
        for i in 0..5 {
            ledger.append(draft(1, "TCS", Side::Buy, i + 1)).unwrap();
        }
        let last = ledger.recent(2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].count, 5);
        assert_eq!(last[1].count, 4);
    }

    #[test]
    fn test_audit_file_written() {
        let dir = std::env::temp_dir().join("paper_exchange_ledger_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("audit.csv");
        let path_str = path.to_str().unwrap();

        let ledger = LedgerStore::with_audit(path_str).unwrap();
        ledger.append(draft(1, "TCS", Side::Buy, 5)).unwrap();

        let content = std::fs::read_to_string(path_str).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("order_id,"));
        assert!(lines.next().unwrap().contains("TCS"));
    }
}
