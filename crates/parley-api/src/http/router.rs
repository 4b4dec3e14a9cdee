//! Axum router configuration with middleware.
//!
//! All REST routes are under `/api/v1/`; the WebSocket endpoint is
//! `/ws`. Middleware: permissive CORS (the original backend allowed any
//! origin) and request tracing.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Users
        .route("/users", get(handlers::user::list_users))
        // Chats
        .route("/chats/{user_id}", get(handlers::chat::list_chats))
        // Messages (static segment takes priority over {chat_id})
        .route("/messages", get(handlers::message::list_all_messages))
        .route(
            "/messages/by-sender",
            get(handlers::message::list_messages_by_sender),
        )
        .route("/messages/{chat_id}", get(handlers::message::list_messages))
        // Leads
        .route(
            "/leads",
            get(handlers::lead::list_leads).post(handlers::lead::create_leads),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe.
async fn health_check() -> &'static str {
    "ok"
}
