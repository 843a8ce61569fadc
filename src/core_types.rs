//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - globally unique, immutable after assignment.
///
/// # Usage:
/// - Primary key for accounts
/// - Used in keyed maps for O(1) account lookup
/// - Signed to match the JWT `sub` claim parsing path
pub type UserId = i64;

/// Order ID - unique within the ledger, assigned sequentially on append
pub type OrderId = u64;

/// Notification ID - unique within the notification store
pub type NotificationId = u64;
