use crate::error::AppError;
use crate::middleware::auth::auth_middleware;
use crate::models::auth::*;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Json,
    routing::{get, post, Router},
};
use serde_json::json;
use std::sync::Arc;

pub fn auth_routes() -> Router {
    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected_routes = Router::new()
        .route("/api/auth/verify", get(verify_token))
        .layer(axum::middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}

async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    let session = state
        .auth
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            &payload.password_confirm,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            status: "success".to_string(),
            message: "User registered successfully".to_string(),
            token: session.token,
            user: session.user,
        }),
    ))
}

async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    let session = state.auth.login(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse {
        status: "success".to_string(),
        message: "User logged in successfully".to_string(),
        token: session.token,
        user: session.user,
    }))
}

async fn verify_token(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let user = state
        .auth
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "user": UserResponse::from(user),
    })))
}
