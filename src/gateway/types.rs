use rust_decimal::Decimal;
use rust_decimal::prelude::FromStr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{OrderId, UserId};
use crate::models::{Side, StockType};

// ============================================================================
// StrictDecimal: Format-Validated Decimal at Serde Layer
// ============================================================================

/// Strict format Decimal - validates format during deserialization
///
/// - Rejects `.5` (must be `0.5`)
/// - Rejects `5.` (must be `5.0` or `5`)
/// - Rejects negative numbers
/// - Rejects empty strings
///
/// Business validation (integer counts, funds) happens later in the engine.
#[derive(Debug, Clone, Copy)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }

    #[cfg(test)]
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Support both JSON number and JSON string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        let d = match DecimalOrString::deserialize(deserializer)? {
            DecimalOrString::String(s) => {
                if s.is_empty() {
                    return Err(D::Error::custom("Amount cannot be empty"));
                }
                if s.starts_with('.') {
                    return Err(D::Error::custom("Invalid format: use 0.5 not .5"));
                }
                if s.ends_with('.') {
                    return Err(D::Error::custom("Invalid format: use 5.0 not 5."));
                }
                Decimal::from_str(&s)
                    .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?
            }
            DecimalOrString::Number(d) => d,
        };

        if d.is_sign_negative() {
            return Err(D::Error::custom("Amount cannot be negative"));
        }
        Ok(StrictDecimal(d))
    }
}

impl Serialize for StrictDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Client order (HTTP request deserialization)
///
/// Format validation (negative, `.5`, `5.`) is handled by StrictDecimal;
/// halt gates, quantity and funds checks happen in the engine.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(example = "TCS")]
    pub symbol: String,
    #[schema(example = "Tata Consultancy Services")]
    pub name: String,
    /// Per-share price as quoted by the client
    #[schema(value_type = String, example = "100")]
    pub price: StrictDecimal,
    /// Share count; must be a whole number
    #[schema(value_type = String, example = "10")]
    pub count: StrictDecimal,
    /// Total price as quoted by the client, before currency conversion
    #[schema(value_type = String, example = "1000")]
    pub total_price: StrictDecimal,
    pub stock_type: StockType,
    pub side: Side,
    /// Exchange code the order was placed on
    #[schema(example = "NSE")]
    pub exchange: String,
}

/// Order placement response data
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponseData {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub count: i64,
    /// Total recorded on the ledger (client quote, not converted)
    #[schema(value_type = String)]
    pub total_price: Decimal,
    /// Cash balance after execution
    #[schema(value_type = String)]
    pub balance_after: Decimal,
}

/// Wallet deposit request
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    #[schema(value_type = String, example = "500")]
    pub amount: StrictDecimal,
}

/// Wallet deposit response data
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositResponseData {
    pub order_id: OrderId,
    #[schema(value_type = String)]
    pub balance_after: Decimal,
}

/// Account summary response data
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponseData {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[schema(value_type = String)]
    pub balance: Decimal,
    pub suspended: bool,
    pub unread_notifications: usize,
}

/// One aggregated holding row
#[derive(Debug, Serialize, ToSchema)]
pub struct HoldingEntry {
    #[schema(example = "TCS")]
    pub symbol: String,
    /// Net shares held (buys minus sells)
    pub count: i64,
}

/// Admin: system-wide trading halt toggle
#[derive(Debug, Deserialize, ToSchema)]
pub struct SystemHaltRequest {
    pub halted: bool,
}

/// Admin: per-symbol trading halt toggle
#[derive(Debug, Deserialize, ToSchema)]
pub struct SymbolHaltRequest {
    #[schema(example = "TCS")]
    pub symbol: String,
    pub halted: bool,
}

/// Admin: suspend or reinstate a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct SuspendUserRequest {
    pub user_id: UserId,
    pub suspended: bool,
}

/// Admin: create or update a listed stock
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertStockRequest {
    #[schema(example = "TCS")]
    pub symbol: String,
    #[schema(example = "Tata Consultancy Services")]
    pub name: String,
    #[schema(example = "NSE")]
    pub exchange: String,
    #[schema(value_type = String, example = "3500")]
    pub last_price: StrictDecimal,
}

/// Admin telemetry snapshot
#[derive(Debug, Serialize, ToSchema)]
pub struct TelemetryData {
    pub users: usize,
    pub orders: usize,
    pub stocks: usize,
    pub system_halted: bool,
}

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;
    pub const INSUFFICIENT_HOLDINGS: i32 = 1003;
    pub const INVALID_QUANTITY: i32 = 1004;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource / state errors (4xxx)
    pub const USER_NOT_FOUND: i32 = 4001;
    pub const TRADING_HALTED: i32 = 4002;
    pub const SYMBOL_HALTED: i32 = 4003;
    pub const USER_SUSPENDED: i32 = 4004;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_decimal_accepts_string_and_number() {
        let d: StrictDecimal = serde_json::from_str("\"10.5\"").unwrap();
        assert_eq!(d.inner(), Decimal::from_str("10.5").unwrap());
        let d: StrictDecimal = serde_json::from_str("42").unwrap();
        assert_eq!(d.inner(), Decimal::from(42));
    }

    #[test]
    fn test_strict_decimal_rejects_bad_formats() {
        assert!(serde_json::from_str::<StrictDecimal>("\"\"").is_err());
        assert!(serde_json::from_str::<StrictDecimal>("\".5\"").is_err());
        assert!(serde_json::from_str::<StrictDecimal>("\"5.\"").is_err());
        assert!(serde_json::from_str::<StrictDecimal>("\"-3\"").is_err());
        assert!(serde_json::from_str::<StrictDecimal>("-3").is_err());
    }

    #[test]
    fn test_api_response_success_shape() {
        let resp = ApiResponse::success(7_i64);
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"code":0,"msg":"ok","data":7}"#);
    }

    #[test]
    fn test_api_response_error_omits_data() {
        let resp = ApiResponse::<()>::error(error_codes::TRADING_HALTED, "Trading is halted");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("data"));
        assert!(json.contains("4002"));
    }

    #[test]
    fn test_create_order_request_parses() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{
                "symbol": "TCS",
                "name": "Tata Consultancy Services",
                "price": "100",
                "count": 10,
                "total_price": "1000",
                "stock_type": "DELIVERY",
                "side": "BUY",
                "exchange": "NSE"
            }"#,
        )
        .unwrap();
        assert_eq!(req.symbol, "TCS");
        assert_eq!(req.count.inner(), Decimal::from(10));
        assert_eq!(req.side, Side::Buy);
    }
}
