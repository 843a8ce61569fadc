//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountResponseData, CreateOrderRequest, DepositRequest, DepositResponseData, HoldingEntry,
    OrderResponseData, SuspendUserRequest, SymbolHaltRequest, SystemHaltRequest, TelemetryData,
    UpsertStockRequest,
};
use crate::market::StockInfo;
use crate::models::Order;
use crate::notification::Notification;
use crate::user_auth::service::{AuthResponse, LoginRequest, RegisterRequest};

/// Bearer JWT security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /api/v1/auth/login, 24h expiry"))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Paper Exchange API",
        version = "0.1.0",
        description = "Simulated stock-trading exchange: virtual cash, paper orders, auditable ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        // System
        crate::gateway::handlers::health_check,
        // Auth
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        // Public
        crate::gateway::handlers::get_stocks,
        // Private
        crate::gateway::handlers::create_order,
        crate::gateway::handlers::get_orders,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::get_holdings,
        crate::gateway::handlers::deposit,
        crate::gateway::handlers::get_notifications,
        crate::gateway::handlers::mark_notifications_read,
        // Admin
        crate::gateway::handlers::get_telemetry,
        crate::gateway::handlers::set_system_halt,
        crate::gateway::handlers::set_symbol_halt,
        crate::gateway::handlers::suspend_user,
        crate::gateway::handlers::upsert_stock,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            StockInfo,
            Order,
            Notification,
            CreateOrderRequest,
            OrderResponseData,
            DepositRequest,
            DepositResponseData,
            AccountResponseData,
            HoldingEntry,
            SystemHaltRequest,
            SymbolHaltRequest,
            SuspendUserRequest,
            UpsertStockRequest,
            TelemetryData,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health checks and system info"),
        (name = "Auth", description = "Registration and login"),
        (name = "Market Data", description = "Public stock directory (no auth required)"),
        (name = "Trading", description = "Order placement and history (JWT required)"),
        (name = "Account", description = "Balance, holdings, deposits, notifications (JWT required)"),
        (name = "Admin", description = "Halt gates, suspensions, stock listing (admin JWT required)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Paper Exchange API");
        assert_eq!(spec.info.version, "0.1.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let spec = ApiDoc::openapi();
        let json = spec.to_json();
        assert!(json.is_ok());
        let json_str = json.unwrap();
        assert!(json_str.contains("Paper Exchange API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths;
        assert!(paths.paths.contains_key("/api/v1/health"));
        assert!(paths.paths.contains_key("/api/v1/auth/register"));
        assert!(paths.paths.contains_key("/api/v1/public/stocks"));
        assert!(paths.paths.contains_key("/api/v1/private/order"));
        assert!(paths.paths.contains_key("/api/v1/admin/halt"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("jwt_token"));
    }
}
