use crate::meditation::{BreathingPattern, PATTERNS};
use axum::{response::Json, routing::get, Router};

pub fn meditation_routes() -> Router {
    Router::new().route("/api/meditation/patterns", get(list_patterns))
}

async fn list_patterns() -> Json<Vec<BreathingPattern>> {
    Json(PATTERNS.to_vec())
}
