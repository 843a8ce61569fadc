use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::engine::{ExecutionError, OrderRequest};
use crate::holdings::compute_holdings;
use crate::market::StockInfo;
use crate::models::Order;
use crate::notification::{DEFAULT_PAGE, Notification};
use crate::user_auth::Claims;

use super::state::AppState;
use super::types::{
    AccountResponseData, ApiResponse, CreateOrderRequest, DepositRequest, DepositResponseData,
    HoldingEntry, OrderResponseData, SuspendUserRequest, SymbolHaltRequest, SystemHaltRequest,
    TelemetryData, UpsertStockRequest, error_codes,
};

type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Map an engine rejection to HTTP status + error code
fn execution_error_response(e: ExecutionError) -> ApiError {
    let (status, code) = match &e {
        ExecutionError::TradingHalted => (StatusCode::FORBIDDEN, error_codes::TRADING_HALTED),
        ExecutionError::SymbolHalted(_) => (StatusCode::FORBIDDEN, error_codes::SYMBOL_HALTED),
        ExecutionError::UserSuspended => (StatusCode::FORBIDDEN, error_codes::USER_SUSPENDED),
        ExecutionError::UserNotFound => (StatusCode::NOT_FOUND, error_codes::USER_NOT_FOUND),
        ExecutionError::InvalidQuantity => (StatusCode::BAD_REQUEST, error_codes::INVALID_QUANTITY),
        ExecutionError::InsufficientHoldings { .. } => {
            (StatusCode::BAD_REQUEST, error_codes::INSUFFICIENT_HOLDINGS)
        }
        ExecutionError::InsufficientFunds => {
            (StatusCode::BAD_REQUEST, error_codes::INSUFFICIENT_FUNDS)
        }
        ExecutionError::InvalidAmount => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        ExecutionError::Storage(_) => {
            tracing::error!("execution storage failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            )
        }
    };
    (status, Json(ApiResponse::<()>::error(code, e.to_string())))
}

fn claims_user_id(claims: &Claims) -> Result<crate::core_types::UserId, ApiError> {
    claims.user_id().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Malformed token subject",
            )),
        )
    })
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Health check
///
/// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Public
// ============================================================================

/// List all tradable stocks
///
/// GET /api/v1/public/stocks
#[utoipa::path(
    get,
    path = "/api/v1/public/stocks",
    responses(
        (status = 200, description = "Stock directory", body = ApiResponse<Vec<StockInfo>>)
    ),
    tag = "Market Data"
)]
pub async fn get_stocks(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<Vec<StockInfo>>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(state.market.list_stocks())),
    )
}

// ============================================================================
// Private (JWT required)
// ============================================================================

/// Place a buy/sell order
///
/// POST /api/v1/private/order
#[utoipa::path(
    post,
    path = "/api/v1/private/order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order fulfilled", body = ApiResponse<OrderResponseData>),
        (status = 400, description = "Invalid quantity, insufficient funds or holdings"),
        (status = 403, description = "Trading halted or account suspended"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Trading"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponseData>>), ApiError> {
    let user_id = claims_user_id(&claims)?;

    if req.symbol.is_empty() || req.exchange.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "Symbol and exchange must not be empty",
            )),
        ));
    }

    let execution = state
        .engine
        .execute_order(OrderRequest {
            user_id,
            symbol: req.symbol,
            name: req.name,
            price: req.price.inner(),
            count: req.count.inner(),
            total_price: req.total_price.inner(),
            stock_type: req.stock_type,
            side: req.side,
            exchange: req.exchange,
        })
        .await
        .map_err(execution_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderResponseData {
            order_id: execution.order.order_id,
            symbol: execution.order.symbol,
            side: execution.order.side,
            count: execution.order.count,
            total_price: execution.order.total_price,
            balance_after: execution.balance_after,
        })),
    ))
}

/// List the caller's order history, oldest first
///
/// GET /api/v1/private/orders
#[utoipa::path(
    get,
    path = "/api/v1/private/orders",
    responses(
        (status = 200, description = "Order history", body = ApiResponse<Vec<Order>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Trading"
)]
pub async fn get_orders(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Order>>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let orders = state.ledger.orders_for(user_id).map_err(|e| {
        tracing::error!("ledger read failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(
                error_codes::INTERNAL_ERROR,
                "Failed to read order history",
            )),
        )
    })?;
    Ok((StatusCode::OK, Json(ApiResponse::success(orders))))
}

/// Account summary: identity, balance, unread notification count
///
/// GET /api/v1/private/account
#[utoipa::path(
    get,
    path = "/api/v1/private/account",
    responses(
        (status = 200, description = "Account summary", body = ApiResponse<AccountResponseData>),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponseData>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let account = state.accounts.get(user_id).ok_or((
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            error_codes::USER_NOT_FOUND,
            "User not found",
        )),
    ))?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(AccountResponseData {
            user_id: account.user_id,
            balance: account.balance.avail(),
            suspended: account.is_suspended(),
            unread_notifications: state.notifications.unread_count(user_id),
            username: account.username,
            email: account.email,
        })),
    ))
}

/// Current holdings folded from the order ledger
///
/// GET /api/v1/private/holdings
#[utoipa::path(
    get,
    path = "/api/v1/private/holdings",
    responses(
        (status = 200, description = "Aggregated holdings", body = ApiResponse<Vec<HoldingEntry>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Account"
)]
pub async fn get_holdings(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<HoldingEntry>>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let orders = state.ledger.orders_for(user_id).map_err(|e| {
        tracing::error!("ledger read failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(
                error_codes::INTERNAL_ERROR,
                "Failed to read order history",
            )),
        )
    })?;

    let mut entries: Vec<HoldingEntry> = compute_holdings(&orders)
        .into_iter()
        .map(|(symbol, count)| HoldingEntry { symbol, count })
        .collect();
    entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    Ok((StatusCode::OK, Json(ApiResponse::success(entries))))
}

/// Top up the virtual wallet
///
/// POST /api/v1/private/deposit
#[utoipa::path(
    post,
    path = "/api/v1/private/deposit",
    request_body = DepositRequest,
    responses(
        (status = 201, description = "Deposit settled", body = ApiResponse<DepositResponseData>),
        (status = 400, description = "Amount must be positive"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Account"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DepositRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DepositResponseData>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let execution = state
        .engine
        .deposit(user_id, req.amount.inner())
        .await
        .map_err(execution_error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(DepositResponseData {
            order_id: execution.order.order_id,
            balance_after: execution.balance_after,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<usize>,
}

/// Recent notifications, newest first
///
/// GET /api/v1/private/notifications
#[utoipa::path(
    get,
    path = "/api/v1/private/notifications",
    params(
        ("limit" = Option<usize>, Query, description = "Max entries to return (default 20)")
    ),
    responses(
        (status = 200, description = "Recent notifications", body = ApiResponse<Vec<Notification>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Account"
)]
pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NotificationQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Notification>>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE);
    let list = state.notifications.list_recent(user_id, limit);
    Ok((StatusCode::OK, Json(ApiResponse::success(list))))
}

/// Mark all notifications read; returns how many flipped
///
/// POST /api/v1/private/notifications/read
#[utoipa::path(
    post,
    path = "/api/v1/private/notifications/read",
    responses(
        (status = 200, description = "Notifications marked read", body = ApiResponse<usize>),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt_token" = [])),
    tag = "Account"
)]
pub async fn mark_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<(StatusCode, Json<ApiResponse<usize>>), ApiError> {
    let user_id = claims_user_id(&claims)?;
    let flipped = state.notifications.mark_all_read(user_id);
    Ok((StatusCode::OK, Json(ApiResponse::success(flipped))))
}

// ============================================================================
// Admin (JWT + admin claim required)
// ============================================================================

/// Telemetry snapshot: entity counts and halt state
///
/// GET /api/v1/admin/telemetry
#[utoipa::path(
    get,
    path = "/api/v1/admin/telemetry",
    responses(
        (status = 200, description = "Telemetry snapshot", body = ApiResponse<TelemetryData>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    security(("jwt_token" = [])),
    tag = "Admin"
)]
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<TelemetryData>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(TelemetryData {
            users: state.accounts.count(),
            orders: state.ledger.len(),
            stocks: state.market.stock_count(),
            system_halted: state.market.is_system_halted(),
        })),
    )
}

/// Toggle the system-wide trading halt
///
/// POST /api/v1/admin/halt
#[utoipa::path(
    post,
    path = "/api/v1/admin/halt",
    request_body = SystemHaltRequest,
    responses(
        (status = 200, description = "Halt flag updated", body = ApiResponse<bool>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    security(("jwt_token" = [])),
    tag = "Admin"
)]
pub async fn set_system_halt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SystemHaltRequest>,
) -> (StatusCode, Json<ApiResponse<bool>>) {
    state.market.set_system_halted(req.halted);
    tracing::warn!(halted = req.halted, "system trading halt toggled");
    (StatusCode::OK, Json(ApiResponse::success(req.halted)))
}

/// Toggle a per-symbol trading halt
///
/// POST /api/v1/admin/stock/halt
#[utoipa::path(
    post,
    path = "/api/v1/admin/stock/halt",
    request_body = SymbolHaltRequest,
    responses(
        (status = 200, description = "Halt flag updated", body = ApiResponse<bool>),
        (status = 400, description = "Symbol must not be empty"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    security(("jwt_token" = [])),
    tag = "Admin"
)]
pub async fn set_symbol_halt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SymbolHaltRequest>,
) -> Result<(StatusCode, Json<ApiResponse<bool>>), ApiError> {
    if req.symbol.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "Symbol must not be empty",
            )),
        ));
    }
    state.market.set_symbol_halted(&req.symbol, req.halted);
    tracing::warn!(symbol = %req.symbol, halted = req.halted, "symbol halt toggled");
    Ok((StatusCode::OK, Json(ApiResponse::success(req.halted))))
}

/// Suspend or reinstate a user account
///
/// POST /api/v1/admin/user/suspend
#[utoipa::path(
    post,
    path = "/api/v1/admin/user/suspend",
    request_body = SuspendUserRequest,
    responses(
        (status = 200, description = "Suspension flag updated", body = ApiResponse<bool>),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    security(("jwt_token" = [])),
    tag = "Admin"
)]
pub async fn suspend_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuspendUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<bool>>), ApiError> {
    state
        .accounts
        .set_suspended(req.user_id, req.suspended)
        .map_err(|_| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(
                    error_codes::USER_NOT_FOUND,
                    "User not found",
                )),
            )
        })?;
    tracing::warn!(
        user_id = req.user_id,
        suspended = req.suspended,
        "user suspension toggled"
    );
    Ok((StatusCode::OK, Json(ApiResponse::success(req.suspended))))
}

/// Create or update a listed stock
///
/// POST /api/v1/admin/stock
#[utoipa::path(
    post,
    path = "/api/v1/admin/stock",
    request_body = UpsertStockRequest,
    responses(
        (status = 200, description = "Stock upserted", body = ApiResponse<StockInfo>),
        (status = 400, description = "Invalid stock definition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    security(("jwt_token" = [])),
    tag = "Admin"
)]
pub async fn upsert_stock(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpsertStockRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StockInfo>>), ApiError> {
    if req.symbol.is_empty() || req.exchange.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                "Symbol and exchange must not be empty",
            )),
        ));
    }

    let info = StockInfo {
        symbol: req.symbol.clone(),
        name: req.name,
        exchange: req.exchange,
        last_price: req.last_price.inner(),
        halted: false,
    };
    state.market.upsert_stock(info);

    // Re-read so the response reflects a preserved halt flag
    let stored = state.market.get_stock(&req.symbol).ok_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            error_codes::INTERNAL_ERROR,
            "Stock not stored",
        )),
    ))?;

    Ok((StatusCode::OK, Json(ApiResponse::success(stored))))
}
