// lib.rs - HTTP service and client-side state machines for the Aura dashboard
pub mod config;
pub mod db;
pub mod error;
pub mod gemini_client;
pub mod handlers;
pub mod meditation;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod voice;

use axum::{http::HeaderValue, Extension, Router};
use serde_json::json;
use services::auth::AuthService;
use services::chat::ChatProvider;
use services::conversation_log::ConversationLog;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// AppState holds the database pool, the auth service, the chat provider (if
// an API key was configured) and the location of the conversation log
pub struct AppState {
    pub db_pool: db::DbPool,
    pub auth: AuthService,
    pub chat_provider: Option<Arc<dyn ChatProvider>>,
    pub conversation_log: ConversationLog,
    pub analytics_window: usize,
}

/// Builds the application router with all routes and shared state.
pub fn app(state: Arc<AppState>, cors_origin: Option<&str>) -> Router {
    Router::new()
        .merge(handlers::auth::auth_routes())
        .merge(handlers::chat::chat_routes())
        .merge(handlers::analytics::analytics_routes())
        .merge(handlers::meditation::meditation_routes())
        .route("/api/status", axum::routing::get(api_status))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(cors_layer(cors_origin))
        .layer(Extension(state))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::very_permissive().allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid CORS_ORIGIN ({}); allowing any origin", e);
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

// API Status endpoint
async fn api_status(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Json<serde_json::Value> {
    let db_status = match sqlx::query("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let chat_status = if state.chat_provider.is_some() { "configured" } else { "not_configured" };
    let log_status = if state.conversation_log.path().exists() { "present" } else { "missing" };

    axum::response::Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "chat_provider": chat_status,
            "conversation_log": log_status
        },
        "endpoints": {
            "auth": "/api/auth/*",
            "chat": "/chat",
            "analytics": "/api/analyzeConversation",
            "meditation": "/api/meditation/patterns",
            "status": "/api/status"
        }
    }))
}
