//! End-to-end order flow scenarios against the assembled trading core:
//! auth service, execution engine, ledger, holdings fold and
//! notifications wired together the same way the binary wires them.

use std::sync::Arc;

use rust_decimal::Decimal;

use paper_exchange::account::AccountStore;
use paper_exchange::engine::{ExecutionEngine, ExecutionError, OrderRequest};
use paper_exchange::fx::FixedRate;
use paper_exchange::holdings::compute_holdings;
use paper_exchange::ledger::LedgerStore;
use paper_exchange::market::Market;
use paper_exchange::models::{Side, StockType};
use paper_exchange::notification::{DEFAULT_PAGE, NotificationStore};
use paper_exchange::user_auth::{RegisterRequest, UserAuthService};

struct Stack {
    accounts: Arc<AccountStore>,
    ledger: Arc<LedgerStore>,
    market: Arc<Market>,
    notifications: Arc<NotificationStore>,
    engine: Arc<ExecutionEngine>,
    auth: UserAuthService,
}

/// Assemble the stack the way main.rs does: opening balance 10000,
/// conversion rate 90, NSE/BSE domestic.
fn build_stack() -> Stack {
    let accounts = Arc::new(AccountStore::new(Decimal::from(10_000)));
    let ledger = Arc::new(LedgerStore::new());
    let market = Arc::new(Market::new());
    let notifications = Arc::new(NotificationStore::new());

    let engine = Arc::new(ExecutionEngine::new(
        accounts.clone(),
        ledger.clone(),
        market.clone(),
        Arc::new(FixedRate::new(Decimal::from(90))),
        notifications.clone(),
        vec!["NSE".to_string(), "BSE".to_string()],
    ));

    let auth = UserAuthService::new(accounts.clone(), "qa-secret".to_string());

    Stack {
        accounts,
        ledger,
        market,
        notifications,
        engine,
        auth,
    }
}

fn register(stack: &Stack, name: &str) -> i64 {
    stack
        .auth
        .register(RegisterRequest {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
        })
        .expect("registration should succeed")
}

fn order(
    user_id: i64,
    symbol: &str,
    side: Side,
    count: i64,
    total: i64,
    exchange: &str,
) -> OrderRequest {
    OrderRequest {
        user_id,
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        price: Decimal::from(total) / Decimal::from(count),
        count: Decimal::from(count),
        total_price: Decimal::from(total),
        stock_type: StockType::Delivery,
        side,
        exchange: exchange.to_string(),
    }
}

#[tokio::test]
async fn qa_full_trading_session() {
    let stack = build_stack();
    let user = register(&stack, "trader1");

    // Buy 10 TCS on NSE for 1000: domestic, settles at face value
    let exec = stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 10, 1_000, "NSE"))
        .await
        .expect("domestic buy within funds should fulfil");
    assert_eq!(exec.balance_after, Decimal::from(9_000));
    assert_eq!(exec.order.count, 10);
    assert_eq!(exec.order.total_price, Decimal::from(1_000));

    // Sell 4 back
    let exec = stack
        .engine
        .execute_order(order(user, "TCS", Side::Sell, 4, 400, "NSE"))
        .await
        .expect("sell within holdings should fulfil");
    assert_eq!(exec.balance_after, Decimal::from(9_400));

    // Holdings fold over the ledger: 10 - 4 = 6
    let rows = stack.ledger.orders_for(user).unwrap();
    let holdings = compute_holdings(&rows);
    assert_eq!(holdings.get("TCS"), Some(&6));

    // Two fulfilled orders, two notifications, newest first
    assert_eq!(rows.len(), 2);
    let notes = stack.notifications.list_recent(user, DEFAULT_PAGE);
    assert_eq!(notes.len(), 2);
    assert!(notes[0].message.starts_with("Sold 4"));
    assert!(notes[1].message.starts_with("Bought 10"));
}

#[tokio::test]
async fn qa_foreign_total_is_converted_before_funds_check() {
    let stack = build_stack();
    let user = register(&stack, "trader2");

    // NYSE total 1000 converts to 90000, far above the opening 10000
    let err = stack
        .engine
        .execute_order(order(user, "AAPL", Side::Buy, 10, 1_000, "NYSE"))
        .await
        .expect_err("converted total must exceed opening balance");
    assert!(matches!(err, ExecutionError::InsufficientFunds));

    // Rejection leaves no trace: balance, ledger and notifications untouched
    let account = stack.accounts.get(user).unwrap();
    assert_eq!(account.balance.avail(), Decimal::from(10_000));
    assert!(stack.ledger.orders_for(user).unwrap().is_empty());
    assert!(stack.notifications.list_recent(user, DEFAULT_PAGE).is_empty());

    // A foreign total that fits after conversion goes through: 100 * 90 = 9000
    let exec = stack
        .engine
        .execute_order(order(user, "AAPL", Side::Buy, 10, 100, "NYSE"))
        .await
        .expect("converted total within funds should fulfil");
    assert_eq!(exec.balance_after, Decimal::from(1_000));
    // Ledger keeps the client quote, not the converted total
    assert_eq!(exec.order.total_price, Decimal::from(100));
}

#[tokio::test]
async fn qa_halt_gates_precede_account_checks() {
    let stack = build_stack();
    let user = register(&stack, "trader3");

    // System halt rejects everyone, even unknown users
    stack.market.set_system_halted(true);
    let err = stack
        .engine
        .execute_order(order(9_999, "TCS", Side::Buy, 1, 100, "NSE"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ExecutionError::TradingHalted),
        "system halt must win over unknown-user"
    );
    stack.market.set_system_halted(false);

    // Symbol halt is checked before user lookup
    stack.market.set_symbol_halted("TCS", true);
    let err = stack
        .engine
        .execute_order(order(9_999, "TCS", Side::Buy, 1, 100, "NSE"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::SymbolHalted(s) if s == "TCS"));

    // Other symbols keep trading while TCS is halted
    stack
        .engine
        .execute_order(order(user, "INFY", Side::Buy, 1, 100, "NSE"))
        .await
        .expect("unhalted symbol should trade");

    // Lifting the halt restores the symbol
    stack.market.set_symbol_halted("TCS", false);
    stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 1, 100, "NSE"))
        .await
        .expect("halt lift should restore trading");
}

#[tokio::test]
async fn qa_suspension_blocks_trading_and_login() {
    let stack = build_stack();
    let user = register(&stack, "trader4");

    stack.accounts.set_suspended(user, true).unwrap();

    let err = stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 1, 100, "NSE"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::UserSuspended));

    // Valid credentials still refused while suspended
    let login = stack.auth.login(paper_exchange::user_auth::LoginRequest {
        email: "trader4@example.com".to_string(),
        password: "password123".to_string(),
    });
    assert!(login.is_err(), "suspended account must not log in");

    // Reinstating restores both paths
    stack.accounts.set_suspended(user, false).unwrap();
    stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 1, 100, "NSE"))
        .await
        .expect("reinstated account should trade");
    stack
        .auth
        .login(paper_exchange::user_auth::LoginRequest {
            email: "trader4@example.com".to_string(),
            password: "password123".to_string(),
        })
        .expect("reinstated account should log in");
}

#[tokio::test]
async fn qa_oversell_reports_held_count() {
    let stack = build_stack();
    let user = register(&stack, "trader5");

    stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 5, 500, "NSE"))
        .await
        .unwrap();

    let err = stack
        .engine
        .execute_order(order(user, "TCS", Side::Sell, 6, 600, "NSE"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ExecutionError::InsufficientHoldings { held: 5 }),
        "oversell rejection must report the held count"
    );

    // The failed sell is repeatable and leaves holdings intact
    let rows = stack.ledger.orders_for(user).unwrap();
    assert_eq!(compute_holdings(&rows).get("TCS"), Some(&5));
}

#[tokio::test]
async fn qa_deposit_extends_buying_power() {
    let stack = build_stack();
    let user = register(&stack, "trader6");

    // 12000 total is beyond the opening balance
    let err = stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 12, 12_000, "NSE"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::InsufficientFunds));

    let exec = stack
        .engine
        .deposit(user, Decimal::from(5_000))
        .await
        .expect("positive deposit should settle");
    assert_eq!(exec.balance_after, Decimal::from(15_000));
    assert!(exec.order.is_cash_row());

    stack
        .engine
        .execute_order(order(user, "TCS", Side::Buy, 12, 12_000, "NSE"))
        .await
        .expect("topped-up wallet should cover the buy");

    // Cash row is excluded from holdings
    let rows = stack.ledger.orders_for(user).unwrap();
    let holdings = compute_holdings(&rows);
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings.get("TCS"), Some(&12));
}

#[tokio::test]
async fn qa_concurrent_buys_cannot_overspend() {
    let stack = build_stack();
    let user = register(&stack, "trader7");

    // Three concurrent 4000 buys against a 10000 balance: exactly two fit
    let mut handles = Vec::new();
    for _ in 0..3 {
        let engine = stack.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .execute_order(order(user, "TCS", Side::Buy, 4, 4_000, "NSE"))
                .await
        }));
    }

    let mut fulfilled = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => fulfilled += 1,
            Err(ExecutionError::InsufficientFunds) => rejected += 1,
            Err(e) => panic!("unexpected rejection: {}", e),
        }
    }
    assert_eq!((fulfilled, rejected), (2, 1));

    let account = stack.accounts.get(user).unwrap();
    assert_eq!(account.balance.avail(), Decimal::from(2_000));
    assert_eq!(stack.ledger.orders_for(user).unwrap().len(), 2);
}

#[tokio::test]
async fn qa_fractional_and_nonpositive_counts_rejected() {
    let stack = build_stack();
    let user = register(&stack, "trader8");

    let mut req = order(user, "TCS", Side::Buy, 1, 100, "NSE");
    req.count = "2.5".parse().unwrap();
    let err = stack.engine.execute_order(req).await.unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidQuantity));

    let mut req = order(user, "TCS", Side::Buy, 1, 100, "NSE");
    req.count = Decimal::ZERO;
    let err = stack.engine.execute_order(req).await.unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidQuantity));

    assert!(stack.ledger.orders_for(user).unwrap().is_empty());
}
