use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Structured access log: one line when a request arrives, one when it
/// completes, tied together by a generated request id.
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_owned())
        .unwrap_or_else(|| "unknown".to_owned());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        uri = %uri,
        user_agent = %user_agent,
        "incoming request"
    );

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "request completed (server error)"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "request completed (client error)"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "request completed"
        );
    }

    response
}
