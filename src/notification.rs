//! Notifications - Domain events rendered for the user
//!
//! The engine publishes [`AccountEvent`]s through the [`EventSink`]
//! trait and never learns what happens to them. The store renders
//! events to human-readable notifications. Delivery is advisory and
//! at-least-once: ledger/balance atomicity never depends on the sink.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{NotificationId, UserId};
use crate::models::Side;

/// Balance-changing events the engine publishes
#[derive(Debug, Clone)]
pub enum AccountEvent {
    OrderFulfilled {
        user_id: UserId,
        side: Side,
        symbol: String,
        count: i64,
        total_price: Decimal,
    },
    DepositMade {
        user_id: UserId,
        amount: Decimal,
    },
}

/// Consumer seam for engine events
pub trait EventSink: Send + Sync {
    /// Fire-and-forget; must not block execution on failure
    fn publish(&self, event: AccountEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Buy,
    Sell,
    Deposit,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    #[schema(example = "Bought 10 shares of TCS for 1000")]
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user notification log, newest entries appended last
pub struct NotificationStore {
    by_user: DashMap<UserId, Vec<Notification>>,
    next_id: AtomicU64,
}

/// Default page size for notification listings
pub const DEFAULT_PAGE: usize = 20;

impl NotificationStore {
    pub fn new() -> Self {
        NotificationStore {
            by_user: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn push(&self, user_id: UserId, kind: NotificationKind, message: String) {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            kind,
            message,
            read: false,
            created_at: Utc::now(),
        };
        self.by_user.entry(user_id).or_default().push(notification);
    }

    /// Up to `limit` notifications, newest first
    pub fn list_recent(&self, user_id: UserId, limit: usize) -> Vec<Notification> {
        self.by_user
            .get(&user_id)
            .map(|all| all.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Mark every notification read; returns how many flipped
    pub fn mark_all_read(&self, user_id: UserId) -> usize {
        let mut flipped = 0;
        if let Some(mut all) = self.by_user.get_mut(&user_id) {
            for n in all.iter_mut().filter(|n| !n.read) {
                n.read = true;
                flipped += 1;
            }
        }
        flipped
    }

    pub fn unread_count(&self, user_id: UserId) -> usize {
        self.by_user
            .get(&user_id)
            .map(|all| all.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for NotificationStore {
    fn publish(&self, event: AccountEvent) {
        match event {
            AccountEvent::OrderFulfilled {
                user_id,
                side,
                symbol,
                count,
                total_price,
            } => {
                let (kind, verb) = match side {
                    Side::Buy => (NotificationKind::Buy, "Bought"),
                    Side::Sell => (NotificationKind::Sell, "Sold"),
                };
                let message = format!("{} {} shares of {} for {}", verb, count, symbol, total_price);
                self.push(user_id, kind, message);
            }
            AccountEvent::DepositMade { user_id, amount } => {
                let message = format!("Deposited {} to wallet", amount);
                self.push(user_id, NotificationKind::Deposit, message);
            }
        }
    }
}
