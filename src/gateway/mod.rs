pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth;
use state::AppState;

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    // ==========================================================================
    // Auth Routes (no token required)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(user_auth::handlers::register))
        .route("/login", post(user_auth::handlers::login));

    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new().route("/stocks", get(handlers::get_stocks));

    // ==========================================================================
    // Private Routes (JWT required)
    // ==========================================================================
    let private_routes = Router::new()
        .route("/order", post(handlers::create_order))
        .route("/orders", get(handlers::get_orders))
        .route("/account", get(handlers::get_account))
        .route("/holdings", get(handlers::get_holdings))
        .route("/deposit", post(handlers::deposit))
        .route("/notifications", get(handlers::get_notifications))
        .route(
            "/notifications/read",
            post(handlers::mark_notifications_read),
        )
        .layer(from_fn_with_state(
            state.clone(),
            user_auth::middleware::jwt_auth_middleware,
        ));

    // ==========================================================================
    // Admin Routes (JWT + admin claim required)
    // ==========================================================================
    let admin_routes = Router::new()
        .route("/telemetry", get(handlers::get_telemetry))
        .route("/halt", post(handlers::set_system_halt))
        .route("/stock/halt", post(handlers::set_symbol_halt))
        .route("/stock", post(handlers::upsert_stock))
        .route("/user/suspend", post(handlers::suspend_user))
        .layer(axum::middleware::from_fn(
            user_auth::middleware::admin_guard_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            user_auth::middleware::jwt_auth_middleware,
        ));

    // Build complete router
    let app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/public", public_routes)
        .nest("/api/v1/private", private_routes)
        .nest("/api/v1/admin", admin_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()));

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
