//! Holdings - Derived share positions
//!
//! A holding is never stored. It is recomputed on demand by folding a
//! user's ledger rows: buys add the row count, sells subtract it. The
//! ledger's per-user index keeps the fold O(user's orders).

use rustc_hash::FxHashMap;

use crate::models::Order;

/// Fold a user's ledger rows into symbol -> net share count.
///
/// Cash-movement rows are skipped, so the result is the portfolio
/// view. Symbols that net to zero are kept out of the map.
pub fn compute_holdings(orders: &[Order]) -> FxHashMap<String, i64> {
    let mut holdings: FxHashMap<String, i64> = FxHashMap::default();
    for order in orders {
        if order.is_cash_row() {
            continue;
        }
        *holdings.entry(order.symbol.clone()).or_insert(0) += order.signed_count();
    }
    holdings.retain(|_, qty| *qty != 0);
    holdings
}

/// Net share count for one symbol
pub fn holding_for(orders: &[Order], symbol: &str) -> i64 {
    orders
        .iter()
        .filter(|o| !o.is_cash_row() && o.symbol == symbol)
        .map(|o| o.signed_count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEPOSIT_SYMBOL, OrderStatus, Side, StockType};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn row(symbol: &str, side: Side, count: i64) -> Order {
        Order {
            order_id: 0,
            user_id: 1,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            price: Decimal::from(10),
            count,
            total_price: Decimal::from(10 * count),
            stock_type: StockType::Delivery,
            side,
            status: OrderStatus::Executed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_buys_and_sells_net_out() {
        let orders = vec![
            row("TCS", Side::Buy, 10),
            row("TCS", Side::Sell, 4),
            row("INFY", Side::Buy, 2),
        ];
        let holdings = compute_holdings(&orders);
        assert_eq!(holdings.get("TCS"), Some(&6));
        assert_eq!(holdings.get("INFY"), Some(&2));
    }

    #[test]
    fn test_zero_positions_dropped() {
        let orders = vec![row("TCS", Side::Buy, 5), row("TCS", Side::Sell, 5)];
        let holdings = compute_holdings(&orders);
        assert!(!holdings.contains_key("TCS"));
    }

    #[test]
    fn test_deposit_rows_excluded() {
        let mut cash = row(DEPOSIT_SYMBOL, Side::Buy, 1);
        cash.stock_type = StockType::Cash;
        let orders = vec![cash, row("TCS", Side::Buy, 3)];
        let holdings = compute_holdings(&orders);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings.get("TCS"), Some(&3));
    }

    #[test]
    fn test_holding_for_single_symbol() {
        let orders = vec![
            row("TCS", Side::Buy, 10),
            row("INFY", Side::Buy, 7),
            row("TCS", Side::Sell, 3),
        ];
        assert_eq!(holding_for(&orders, "TCS"), 7);
        assert_eq!(holding_for(&orders, "INFY"), 7);
        assert_eq!(holding_for(&orders, "WIPRO"), 0);
    }

    #[test]
    fn test_empty_ledger_is_empty_portfolio() {
        assert!(compute_holdings(&[]).is_empty());
        assert_eq!(holding_for(&[], "TCS"), 0);
    }
}
